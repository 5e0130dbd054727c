//! In-memory surface for headless hosts and tests

use crate::primitive::Primitive;
use crate::surface::{InputMode, Surface, SurfaceEvent};
use annotation_types::PrimitiveId;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug)]
pub struct MemorySurface {
    next_id: u64,
    primitives: BTreeMap<PrimitiveId, Primitive>,
    events: VecDeque<SurfaceEvent>,
    mode: InputMode,
    zoom: f32,
    editing: Option<PrimitiveId>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self {
            next_id: 1,
            primitives: BTreeMap::new(),
            events: VecDeque::new(),
            mode: InputMode::Select,
            zoom: 1.0,
            editing: None,
        }
    }
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Primitive currently being edited in place, if any
    pub fn editing(&self) -> Option<PrimitiveId> {
        self.editing
    }
}

impl Surface for MemorySurface {
    fn add(&mut self, primitive: Primitive) -> PrimitiveId {
        // Ids are monotonic, so BTreeMap order is insertion order
        let id = PrimitiveId::new(self.next_id);
        self.next_id += 1;
        self.primitives.insert(id, primitive);
        self.events.push_back(SurfaceEvent::Added(id));
        id
    }

    fn modify(&mut self, id: PrimitiveId, f: &mut dyn FnMut(&mut Primitive)) -> bool {
        match self.primitives.get_mut(&id) {
            Some(primitive) => {
                f(primitive);
                self.events.push_back(SurfaceEvent::Modified(id));
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: PrimitiveId) -> Option<Primitive> {
        let removed = self.primitives.remove(&id)?;
        if self.editing == Some(id) {
            self.editing = None;
        }
        self.events.push_back(SurfaceEvent::Removed(id));
        Some(removed)
    }

    fn clear(&mut self) {
        let removed = std::mem::take(&mut self.primitives);
        self.editing = None;
        for id in removed.into_keys() {
            self.events.push_back(SurfaceEvent::Removed(id));
        }
    }

    fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    fn ids(&self) -> Vec<PrimitiveId> {
        self.primitives.keys().copied().collect()
    }

    fn set_input_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    fn input_mode(&self) -> &InputMode {
        &self.mode
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn begin_text_editing(&mut self, id: PrimitiveId) {
        if self.primitives.contains_key(&id) {
            self.editing = Some(id);
        }
    }

    fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        self.events.drain(..).collect()
    }
}
