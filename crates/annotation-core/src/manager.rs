//! Annotation manager
//!
//! Owns the live annotation list for one editing session and keeps it in
//! lockstep with the primitives on a [`Surface`]. Records only ever enter the
//! list through the surface's `Added` event, and leave it through `Removed`,
//! so the record set and the primitive set cannot drift apart.

use crate::config::ManagerConfig;
use crate::error::ManagerError;
use crate::primitive::Primitive;
use crate::surface::{InputMode, Surface, SurfaceEvent};
use crate::tools::{classify, input_mode_for, primitive_for_pointer};
use annotation_types::{
    Annotation, AnnotationId, AnnotationPatch, AnnotationType, DrawingSettings,
    DrawingSettingsPatch, NavigatorHandler, NavigatorState, Point, PrimitiveId, SavedAnnotation,
    ShapeKind, ToolType, ToolbarHandler, ToolbarState,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&[Annotation])>;

/// Raw input delivered by the host UI
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed on empty surface; interpreted by the active tool
    PointerDown(Point),
    /// Drag-resize of a primitive being created
    Drag { target: PrimitiveId, to: Point },
    Move { target: PrimitiveId, dx: f64, dy: f64 },
    EditText { target: PrimitiveId, text: String },
    /// Completed freehand stroke in draw or eraser mode
    Stroke(Vec<Point>),
    Delete(PrimitiveId),
}

pub struct AnnotationManager<S: Surface> {
    surface: S,
    config: ManagerConfig,
    tool: ToolType,
    shape: ShapeKind,
    settings: DrawingSettings,
    zoom: f32,
    navigator: NavigatorState,
    annotations: Vec<Annotation>,
    // Timestamps to restore for records re-added by load/add_annotation
    restored: HashMap<AnnotationId, (DateTime<Utc>, DateTime<Utc>)>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
    dirty: bool,
}

impl<S: Surface> AnnotationManager<S> {
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, ManagerConfig::default())
    }

    /// Bind a manager to `surface`; primitives already on it are adopted
    pub fn with_config(surface: S, config: ManagerConfig) -> Self {
        let mut manager = Self {
            surface,
            settings: config.drawing.clone(),
            config,
            tool: ToolType::Select,
            shape: ShapeKind::Rect,
            zoom: 1.0,
            navigator: NavigatorState::default(),
            annotations: Vec::new(),
            restored: HashMap::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            dirty: false,
        };
        manager.surface.set_input_mode(InputMode::Select);
        for id in manager.surface.ids() {
            manager.on_added(id);
        }
        manager.pump();
        manager.dirty = false;
        manager
    }

    // ---- tool state ----

    pub fn set_tool(&mut self, tool: ToolType) {
        self.tool = tool;
        self.surface
            .set_input_mode(input_mode_for(tool, &self.settings, &self.config));
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    /// Subtype created by the next pointer-down with the shape tool
    pub fn set_shape_kind(&mut self, shape: ShapeKind) {
        self.shape = shape;
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape
    }

    pub fn update_drawing_settings(&mut self, patch: DrawingSettingsPatch) {
        self.settings.merge(patch);
        // Strokes already drawn keep the style captured in their snapshot
        if self.tool == ToolType::Draw {
            self.surface
                .set_input_mode(input_mode_for(self.tool, &self.settings, &self.config));
        }
    }

    pub fn drawing_settings(&self) -> &DrawingSettings {
        &self.settings
    }

    pub fn toolbar_state(&self) -> ToolbarState {
        ToolbarState {
            tool: self.tool,
            zoom: self.zoom,
        }
    }

    // ---- page context ----

    pub fn set_page_count(&mut self, total_pages: u32) {
        self.navigator.set_total_pages(total_pages);
    }

    /// Page that new annotations are recorded on; clamped into range
    pub fn set_page(&mut self, page: u32) -> u32 {
        self.navigator.go_to(page)
    }

    pub fn navigator(&self) -> &NavigatorState {
        &self.navigator
    }

    // ---- input ----

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(at) => self.on_pointer_down(at),
            InputEvent::Drag { target, to } => {
                self.modify_primitive(target, &mut |p| p.drag_to(to));
            }
            InputEvent::Move { target, dx, dy } => {
                self.modify_primitive(target, &mut |p| p.translate(dx, dy));
            }
            InputEvent::EditText { target, text } => {
                self.modify_primitive(target, &mut |p| p.props.text = Some(text.clone()));
            }
            InputEvent::Stroke(points) => self.on_stroke(points),
            InputEvent::Delete(target) => {
                if self.surface.remove(target).is_none() {
                    debug!(primitive = target.raw(), "delete of unknown primitive ignored");
                }
            }
        }
        self.flush();
    }

    fn on_pointer_down(&mut self, at: Point) {
        let Some(primitive) =
            primitive_for_pointer(self.tool, at, self.shape, &self.settings, &self.config)
        else {
            return;
        };
        let id = self.surface.add(primitive);
        if self.tool == ToolType::Text {
            self.surface.begin_text_editing(id);
        }
    }

    fn on_stroke(&mut self, points: Vec<Point>) {
        if !self.tool.is_freehand() {
            debug!(tool = ?self.tool, "stroke ignored outside freehand tools");
            return;
        }
        if points.is_empty() {
            return;
        }
        if self.tool == ToolType::Eraser {
            self.erase(&points);
        } else {
            let stroke = Primitive::stroke(points, &self.settings.color, self.settings.stroke_width)
                .tagged(AnnotationType::Drawing);
            self.surface.add(stroke);
        }
    }

    /// Remove every drawing on the current page that the eraser path touches
    fn erase(&mut self, points: &[Point]) {
        let page = self.navigator.current_page();
        let radius = self.config.eraser_radius;
        let hit: Vec<PrimitiveId> = self
            .annotations
            .iter()
            .filter(|a| a.kind == AnnotationType::Drawing && a.page == page)
            .filter(|a| {
                self.surface
                    .get(a.object)
                    .is_some_and(|p| points.iter().any(|pt| p.hit_test(pt, radius)))
            })
            .map(|a| a.object)
            .collect();
        for id in hit {
            self.surface.remove(id);
        }
    }

    fn modify_primitive(&mut self, target: PrimitiveId, f: &mut dyn FnMut(&mut Primitive)) {
        if !self.surface.modify(target, f) {
            debug!(primitive = target.raw(), "modify of unknown primitive ignored");
        }
    }

    // ---- surface events ----

    fn pump(&mut self) {
        for event in self.surface.drain_events() {
            match event {
                SurfaceEvent::Added(id) => self.on_added(id),
                SurfaceEvent::Modified(id) => self.on_modified(id),
                SurfaceEvent::Removed(id) => self.on_removed(id),
            }
        }
    }

    fn flush(&mut self) {
        self.pump();
        if self.dirty {
            self.dirty = false;
            self.notify();
        }
    }

    fn on_added(&mut self, object: PrimitiveId) {
        if self.annotations.iter().any(|a| a.object == object) {
            return;
        }
        let Some(primitive) = self.surface.get(object) else {
            debug!(primitive = object.raw(), "added primitive already gone");
            return;
        };
        let kind = classify(primitive, &self.config);
        let id = match primitive.meta.annotation_id {
            Some(id) if self.annotations.iter().any(|a| a.id == id) => {
                debug!(id = %id, primitive = object.raw(), "annotation id already bound, reassigned");
                AnnotationId::new()
            }
            Some(id) => id,
            None => AnnotationId::new(),
        };
        let page = primitive
            .meta
            .page
            .unwrap_or_else(|| self.navigator.current_page());
        let data = primitive.snapshot();
        let now = Utc::now();
        let (created_at, modified_at) = self.restored.remove(&id).unwrap_or((now, now));

        self.annotations.push(Annotation {
            id,
            kind,
            object,
            page,
            data,
            created_at,
            modified_at,
        });
        self.dirty = true;
    }

    fn on_modified(&mut self, object: PrimitiveId) {
        let Some(primitive) = self.surface.get(object) else {
            return;
        };
        match self.annotations.iter_mut().find(|a| a.object == object) {
            Some(annotation) => {
                annotation.data = primitive.snapshot();
                annotation.modified_at = Utc::now();
                self.dirty = true;
            }
            None => debug!(primitive = object.raw(), "modify event for untracked primitive"),
        }
    }

    fn on_removed(&mut self, object: PrimitiveId) {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.object != object);
        if self.annotations.len() != before {
            self.dirty = true;
        }
    }

    // ---- record access ----

    /// Snapshot of every annotation in creation order
    pub fn annotations(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    pub fn annotations_by_page(&self, page: u32) -> Vec<Annotation> {
        self.annotations
            .iter()
            .filter(|a| a.page == page)
            .cloned()
            .collect()
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    // ---- programmatic mutation ----

    /// Re-create an annotation from its persisted form (undo/redo, remote edits)
    pub fn add_annotation(&mut self, record: SavedAnnotation) {
        if self.annotation(record.id).is_some() {
            debug!(id = %record.id, "annotation already present");
            return;
        }
        self.place(record);
        self.flush();
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) {
        let Some(object) = self.annotation(id).map(|a| a.object) else {
            debug!(id = %id, "remove of unknown annotation ignored");
            return;
        };
        // The Removed event drops the record; nothing else touches the list
        self.surface.remove(object);
        self.flush();
    }

    pub fn update_annotation(&mut self, id: AnnotationId, patch: AnnotationPatch) {
        let Some(annotation) = self.annotations.iter_mut().find(|a| a.id == id) else {
            debug!(id = %id, "update of unknown annotation ignored");
            return;
        };
        if let Some(page) = patch.page {
            annotation.page = page;
            annotation.modified_at = Utc::now();
            self.dirty = true;
        }
        let object = annotation.object;
        if let Some(data) = patch.data {
            self.surface.modify(object, &mut |p| p.props = data.clone());
        }
        self.flush();
    }

    pub fn clear_annotations(&mut self) {
        self.surface.clear();
        self.pump();
        self.annotations.clear();
        self.dirty = true;
        self.flush();
    }

    /// Replace the whole set; prior surface state is discarded, not merged
    pub fn load_annotations(&mut self, records: Vec<SavedAnnotation>) {
        self.surface.clear();
        self.surface.drain_events();
        self.annotations.clear();
        self.restored.clear();

        let count = records.len();
        let mut seen = HashSet::with_capacity(count);
        for record in records {
            if !seen.insert(record.id) {
                debug!(id = %record.id, "duplicate id in loaded set skipped");
                continue;
            }
            self.place(record);
        }
        info!(count, loaded = self.annotations.len(), "annotations loaded");
        self.dirty = true;
        self.flush();
    }

    pub fn load_annotations_json(&mut self, json: &str) -> Result<(), ManagerError> {
        let records: Vec<SavedAnnotation> = serde_json::from_str(json)?;
        self.load_annotations(records);
        Ok(())
    }

    /// Serialize every annotation without its surface handle
    pub fn save_annotations(&self) -> Result<String, ManagerError> {
        let saved: Vec<SavedAnnotation> = self.annotations.iter().map(Annotation::to_saved).collect();
        Ok(serde_json::to_string(&saved)?)
    }

    fn place(&mut self, record: SavedAnnotation) {
        let mut primitive = Primitive::from_data(record.kind, &record.data);
        primitive.meta.annotation_id = Some(record.id);
        primitive.meta.page = Some(record.page);
        self.restored
            .insert(record.id, (record.created_at, record.modified_at));
        self.surface.add(primitive);
        self.pump();
    }

    // ---- change notification ----

    /// Register a callback receiving the full list after every change
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[Annotation]) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.annotations);
        }
    }

    /// Tear down the session and hand the surface back
    pub fn destroy(mut self) -> S {
        self.listeners.clear();
        self.surface.set_input_mode(InputMode::Select);
        self.surface.drain_events();
        self.surface
    }
}

impl<S: Surface> ToolbarHandler for AnnotationManager<S> {
    fn on_tool_change(&mut self, tool: ToolType) {
        self.set_tool(tool);
    }

    fn on_zoom_change(&mut self, zoom: f32) {
        self.zoom = ToolbarState::clamp_zoom(zoom);
        self.surface.set_zoom(self.zoom);
    }

    fn on_clear(&mut self) {
        self.clear_annotations();
    }
}

impl<S: Surface> NavigatorHandler for AnnotationManager<S> {
    fn on_page_change(&mut self, page: u32) {
        self.set_page(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySurface;
    use annotation_types::AnnotationData;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn manager() -> AnnotationManager<MemorySurface> {
        AnnotationManager::new(MemorySurface::new())
    }

    fn place(m: &mut AnnotationManager<MemorySurface>, tool: ToolType, x: f64, y: f64) -> Annotation {
        m.set_tool(tool);
        m.handle_input(InputEvent::PointerDown(Point::new(x, y)));
        m.annotations().last().cloned().unwrap()
    }

    fn draw(m: &mut AnnotationManager<MemorySurface>, points: &[(f64, f64)]) -> Annotation {
        m.set_tool(ToolType::Draw);
        m.handle_input(InputEvent::Stroke(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        ));
        m.annotations().last().cloned().unwrap()
    }

    #[test]
    fn test_every_primitive_has_exactly_one_record() {
        let mut m = manager();
        let text = place(&mut m, ToolType::Text, 10.0, 10.0);
        let highlight = place(&mut m, ToolType::Highlight, 20.0, 20.0);
        let stamp = place(&mut m, ToolType::Stamp, 30.0, 30.0);

        assert_eq!(m.surface().len(), 3);
        for id in m.surface().ids() {
            assert_eq!(m.annotations().iter().filter(|a| a.object == id).count(), 1);
        }
        assert_eq!(text.kind, AnnotationType::Text);
        assert_eq!(highlight.kind, AnnotationType::Highlight);
        assert_eq!(stamp.kind, AnnotationType::Stamp);

        m.handle_input(InputEvent::Delete(highlight.object));
        assert!(m.annotations().iter().all(|a| a.object != highlight.object));
        assert_eq!(m.annotations().len(), 2);
    }

    #[test]
    fn test_text_tool_starts_editing() {
        let mut m = manager();
        let text = place(&mut m, ToolType::Text, 5.0, 5.0);
        assert_eq!(m.surface().editing(), Some(text.object));
    }

    #[test]
    fn test_select_and_eraser_pointer_down_create_nothing() {
        let mut m = manager();
        for tool in [ToolType::Select, ToolType::Eraser, ToolType::Draw] {
            m.set_tool(tool);
            m.handle_input(InputEvent::PointerDown(Point::new(1.0, 1.0)));
        }
        assert!(m.annotations().is_empty());
    }

    #[test]
    fn test_id_stable_across_modifications() {
        let mut m = manager();
        let rect = place(&mut m, ToolType::Shape, 10.0, 10.0);
        m.handle_input(InputEvent::Drag {
            target: rect.object,
            to: Point::new(60.0, 40.0),
        });
        m.handle_input(InputEvent::Move {
            target: rect.object,
            dx: 5.0,
            dy: 5.0,
        });

        let after = m.annotation(rect.id).unwrap();
        assert_eq!(after.id, rect.id);
        assert_eq!(after.data.bounds().width, 50.0);
        assert_eq!(after.data.left, 15.0);
        assert!(after.modified_at >= rect.modified_at);
        assert_eq!(after.created_at, rect.created_at);
    }

    #[test]
    fn test_edit_text_refreshes_snapshot() {
        let mut m = manager();
        let text = place(&mut m, ToolType::Text, 0.0, 0.0);
        m.handle_input(InputEvent::EditText {
            target: text.object,
            text: "Hello".to_string(),
        });
        assert_eq!(m.annotation(text.id).unwrap().data.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_set_tool_is_idempotent() {
        let mut once = manager();
        once.set_tool(ToolType::Draw);
        let mut twice = manager();
        twice.set_tool(ToolType::Draw);
        twice.set_tool(ToolType::Draw);

        assert_eq!(once.surface().input_mode(), twice.surface().input_mode());
        assert_eq!(once.drawing_settings(), twice.drawing_settings());
        assert_eq!(once.tool(), twice.tool());
    }

    #[test]
    fn test_drawing_settings_apply_to_next_stroke_only() {
        let mut m = manager();
        let first = draw(&mut m, &[(0.0, 0.0), (10.0, 10.0)]);
        m.update_drawing_settings(DrawingSettingsPatch {
            color: Some("#0000ff".to_string()),
            stroke_width: Some(6.0),
            ..Default::default()
        });
        match m.surface().input_mode() {
            InputMode::Freehand(brush) => {
                assert_eq!(brush.color, "#0000ff");
                assert_eq!(brush.width, 6.0);
            }
            other => panic!("unexpected mode {:?}", other),
        }
        let second = draw(&mut m, &[(0.0, 50.0), (10.0, 60.0)]);

        let first = m.annotation(first.id).unwrap();
        assert_eq!(first.data.paths[0].stroke.as_deref(), Some("#ff0000"));
        assert_eq!(second.data.paths[0].stroke_width, Some(6.0));
    }

    #[test]
    fn test_shape_subtype_selection() {
        let mut m = manager();
        m.set_shape_kind(ShapeKind::Arrow);
        let arrow = place(&mut m, ToolType::Shape, 0.0, 0.0);
        assert_eq!(arrow.kind, AnnotationType::Shape);
        assert_eq!(arrow.data.shape, Some(ShapeKind::Arrow));
    }

    #[test]
    fn test_eraser_removes_touched_drawings_on_current_page() {
        let mut m = manager();
        m.set_page_count(2);
        let hit = draw(&mut m, &[(0.0, 0.0), (100.0, 0.0)]);
        let missed = draw(&mut m, &[(0.0, 200.0), (100.0, 200.0)]);
        let highlight = place(&mut m, ToolType::Highlight, 40.0, 0.0);
        m.set_page(2);
        let other_page = draw(&mut m, &[(0.0, 0.0), (100.0, 0.0)]);

        m.set_page(1);
        m.set_tool(ToolType::Eraser);
        m.handle_input(InputEvent::Stroke(vec![Point::new(50.0, 3.0)]));

        let ids: Vec<_> = m.annotations().iter().map(|a| a.id).collect();
        assert!(!ids.contains(&hit.id));
        assert!(ids.contains(&missed.id));
        assert!(ids.contains(&highlight.id));
        assert!(ids.contains(&other_page.id));
        assert!(m.surface().get(hit.object).is_none());
    }

    #[test]
    fn test_remove_then_save_keeps_survivor() {
        let mut m = manager();
        let a = place(&mut m, ToolType::Highlight, 0.0, 0.0);
        let b = place(&mut m, ToolType::Text, 50.0, 50.0);
        m.remove_annotation(a.id);

        let json = m.save_annotations().unwrap();
        let saved: Vec<SavedAnnotation> = serde_json::from_str(&json).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, b.id);
        assert!(m.surface().get(a.object).is_none());
    }

    #[test]
    fn test_save_load_round_trip_on_fresh_manager() {
        let mut m = manager();
        m.set_page_count(3);
        place(&mut m, ToolType::Text, 100.0, 50.0);
        place(&mut m, ToolType::Highlight, 10.0, 10.0);
        m.set_page(3);
        place(&mut m, ToolType::Stamp, 200.0, 300.0);
        draw(&mut m, &[(1.0, 1.0), (2.0, 5.0), (9.0, 3.0)]);
        m.set_shape_kind(ShapeKind::Circle);
        place(&mut m, ToolType::Shape, 70.0, 70.0);

        let json = m.save_annotations().unwrap();
        let mut fresh = manager();
        fresh.load_annotations_json(&json).unwrap();

        let key = |list: Vec<Annotation>| {
            list.into_iter()
                .map(|a| (a.id, a.kind, a.page, a.data, a.created_at, a.modified_at))
                .collect::<Vec<_>>()
        };
        assert_eq!(key(fresh.annotations()), key(m.annotations()));
        assert_eq!(fresh.surface().len(), 5);
    }

    #[test]
    fn test_loaded_records_resolve_later_events() {
        let mut m = manager();
        let rect = place(&mut m, ToolType::Shape, 0.0, 0.0);
        let json = m.save_annotations().unwrap();

        let mut fresh = manager();
        fresh.load_annotations_json(&json).unwrap();
        let object = fresh.annotation(rect.id).unwrap().object;
        fresh.handle_input(InputEvent::Move {
            target: object,
            dx: 3.0,
            dy: 0.0,
        });
        assert_eq!(fresh.annotation(rect.id).unwrap().data.left, 3.0);
        fresh.handle_input(InputEvent::Delete(object));
        assert!(fresh.annotation(rect.id).is_none());
    }

    #[test]
    fn test_load_replaces_prior_state() {
        let mut m = manager();
        place(&mut m, ToolType::Text, 0.0, 0.0);
        place(&mut m, ToolType::Text, 0.0, 40.0);
        m.load_annotations(Vec::new());
        assert!(m.annotations().is_empty());
        assert!(m.surface().is_empty());
    }

    #[test]
    fn test_load_skips_repeated_ids() {
        let mut m = manager();
        let first = place(&mut m, ToolType::Highlight, 0.0, 0.0).to_saved();
        let mut repeat = first.clone();
        repeat.data = AnnotationData::at(90.0, 90.0, 10.0, 10.0);

        m.load_annotations(vec![first.clone(), repeat]);
        let list = m.annotations();
        assert_eq!(list.iter().filter(|a| a.id == first.id).count(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].data, first.data);
        assert_eq!(m.surface().len(), 1);
    }

    #[test]
    fn test_cloned_primitive_gets_fresh_id() {
        let mut m = manager();
        let saved = place(&mut m, ToolType::Stamp, 10.0, 10.0).to_saved();
        m.load_annotations(vec![saved]);
        let original = m.annotations()[0].clone();
        let mut copy = m.surface().get(original.object).cloned().unwrap();
        assert_eq!(copy.meta.annotation_id, Some(original.id));
        copy.translate(20.0, 20.0);
        m.surface.add(copy);
        m.flush();

        let list = m.annotations();
        assert_eq!(list.len(), 2);
        assert_ne!(list[0].id, list[1].id);
        assert_eq!(list[0].id, original.id);

        m.remove_annotation(list[1].id);
        assert_eq!(m.annotations().len(), 1);
        assert_eq!(m.annotation(original.id).unwrap().object, original.object);
    }

    #[test]
    fn test_stroke_outside_freehand_tools_is_ignored() {
        let mut m = manager();
        m.set_tool(ToolType::Highlight);
        m.handle_input(InputEvent::Stroke(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]));
        assert!(m.annotations().is_empty());
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let mut m = manager();
        assert!(m.load_annotations_json("{not json").is_err());
    }

    #[test]
    fn test_update_pushes_data_to_primitive() {
        let mut m = manager();
        let a = place(&mut m, ToolType::Highlight, 0.0, 0.0);
        let data = AnnotationData::at(5.0, 6.0, 7.0, 8.0);
        m.update_annotation(
            a.id,
            AnnotationPatch {
                page: Some(2),
                data: Some(data.clone()),
            },
        );
        let updated = m.annotation(a.id).unwrap();
        assert_eq!(updated.data, data);
        assert_eq!(updated.page, 2);
        assert_eq!(m.surface().get(a.object).unwrap().props, data);
    }

    #[test]
    fn test_unknown_ids_are_silent_noops() {
        let mut m = manager();
        let seen = Rc::new(RefCell::new(0));
        let counter = seen.clone();
        m.subscribe(move |_| *counter.borrow_mut() += 1);

        let ghost = AnnotationId::new();
        m.remove_annotation(ghost);
        m.update_annotation(ghost, AnnotationPatch::default());
        m.handle_input(InputEvent::Delete(PrimitiveId::new(42)));
        m.handle_input(InputEvent::Move {
            target: PrimitiveId::new(42),
            dx: 1.0,
            dy: 1.0,
        });
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn test_one_notification_per_operation() {
        let mut m = manager();
        let lengths = Rc::new(RefCell::new(Vec::new()));
        let sink = lengths.clone();
        let sub = m.subscribe(move |list| sink.borrow_mut().push(list.len()));

        let a = place(&mut m, ToolType::Highlight, 0.0, 0.0);
        place(&mut m, ToolType::Stamp, 100.0, 100.0);
        m.remove_annotation(a.id);
        m.clear_annotations();
        assert_eq!(*lengths.borrow(), vec![1, 2, 1, 0]);

        assert!(m.unsubscribe(sub));
        place(&mut m, ToolType::Text, 0.0, 0.0);
        assert_eq!(lengths.borrow().len(), 4);
    }

    #[test]
    fn test_add_annotation_restores_record() {
        let mut m = manager();
        let a = place(&mut m, ToolType::Text, 0.0, 0.0);
        let saved = a.to_saved();
        m.remove_annotation(a.id);
        m.add_annotation(saved.clone());
        m.add_annotation(saved);

        assert_eq!(m.annotations().len(), 1);
        let restored = m.annotation(a.id).unwrap();
        assert_eq!(restored.data, a.data);
        assert_eq!(restored.created_at, a.created_at);
        assert_ne!(restored.object, a.object);
    }

    #[test]
    fn test_clear_empties_surface_and_list() {
        let mut m = manager();
        place(&mut m, ToolType::Text, 0.0, 0.0);
        draw(&mut m, &[(0.0, 0.0), (5.0, 5.0)]);
        m.clear_annotations();
        assert!(m.annotations().is_empty());
        assert!(m.surface().is_empty());
    }

    #[test]
    fn test_adopts_existing_primitives() {
        let mut surface = MemorySurface::new();
        surface.add(Primitive::stroke(vec![Point::new(0.0, 0.0)], "#000000", 1.0));
        let m = AnnotationManager::new(surface);
        assert_eq!(m.annotations().len(), 1);
        assert_eq!(m.annotations()[0].kind, AnnotationType::Drawing);
    }

    #[test]
    fn test_toolbar_and_navigator_handlers() {
        let mut m = manager();
        m.set_page_count(4);
        m.on_page_change(9);
        assert_eq!(m.navigator().current_page(), 4);
        m.on_tool_change(ToolType::Highlight);
        assert_eq!(m.toolbar_state().tool, ToolType::Highlight);
        m.on_zoom_change(2.0);
        assert_eq!(m.surface().zoom(), 2.0);

        let h = place(&mut m, ToolType::Highlight, 0.0, 0.0);
        assert_eq!(h.page, 4);
        m.on_clear();
        assert!(m.annotations().is_empty());
    }

    #[test]
    fn test_destroy_returns_idle_surface() {
        let mut m = manager();
        m.set_tool(ToolType::Draw);
        place(&mut m, ToolType::Text, 0.0, 0.0);
        let surface = m.destroy();
        assert_eq!(surface.input_mode(), &InputMode::Select);
        assert_eq!(surface.len(), 1);
    }
}
