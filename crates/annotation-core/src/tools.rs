//! Tool dispatch: what each tool puts on the surface and how primitives are classified

use crate::config::ManagerConfig;
use crate::primitive::{Primitive, PrimitiveKind};
use crate::surface::{Brush, InputMode};
use annotation_types::{AnnotationData, AnnotationType, DrawingSettings, Point, ShapeKind, ToolType};

/// Line height factor applied to text primitives
const TEXT_LINE_HEIGHT: f64 = 1.16;

/// Surface input mode for a tool under the current style
pub fn input_mode_for(tool: ToolType, settings: &DrawingSettings, config: &ManagerConfig) -> InputMode {
    match tool {
        ToolType::Select => InputMode::Select,
        ToolType::Draw => InputMode::Freehand(Brush {
            color: settings.color.clone(),
            width: settings.stroke_width,
            erase: false,
        }),
        ToolType::Eraser => InputMode::Freehand(Brush {
            color: "#ffffff".to_string(),
            width: config.eraser_radius * 2.0,
            erase: true,
        }),
        ToolType::Text => InputMode::TextCursor,
        ToolType::Highlight | ToolType::Stamp | ToolType::Shape => InputMode::Crosshair,
    }
}

/// Primitive created by a pointer-down with `tool` at `at`.
///
/// `None` for tools that do not create on pointer-down (select, draw, eraser);
/// freehand ink arrives as a completed stroke instead.
pub fn primitive_for_pointer(
    tool: ToolType,
    at: Point,
    shape: ShapeKind,
    settings: &DrawingSettings,
    config: &ManagerConfig,
) -> Option<Primitive> {
    let primitive = match tool {
        ToolType::Select | ToolType::Draw | ToolType::Eraser => return None,
        ToolType::Text => {
            let text = config.text_placeholder.clone();
            let width = text.chars().count() as f64 * settings.font_size * 0.5;
            let props = AnnotationData {
                fill: Some(settings.color.clone()),
                font_size: Some(settings.font_size),
                font_family: Some(settings.font_family.clone()),
                text: Some(text),
                ..AnnotationData::at(at.x, at.y, width, settings.font_size * TEXT_LINE_HEIGHT)
            };
            Primitive::new(PrimitiveKind::Text, props).tagged(AnnotationType::Text)
        }
        ToolType::Highlight => {
            let props = AnnotationData {
                fill: Some(config.highlight_fill.clone()),
                opacity: Some(config.highlight_opacity),
                ..AnnotationData::at(at.x, at.y, 0.0, 0.0)
            };
            Primitive::new(PrimitiveKind::Rect, props).tagged(AnnotationType::Highlight)
        }
        ToolType::Stamp => {
            let stamp = &config.stamp;
            let props = AnnotationData {
                stroke: Some(stamp.color.clone()),
                stroke_width: Some(2.0),
                text: Some(stamp.label.clone()),
                font_size: Some(stamp.height * 0.45),
                font_family: Some(settings.font_family.clone()),
                ..AnnotationData::at(
                    at.x - stamp.width / 2.0,
                    at.y - stamp.height / 2.0,
                    stamp.width,
                    stamp.height,
                )
            };
            Primitive::new(PrimitiveKind::Group, props).tagged(AnnotationType::Stamp)
        }
        ToolType::Shape => {
            let mut props = AnnotationData {
                stroke: Some(settings.color.clone()),
                stroke_width: Some(settings.stroke_width),
                shape: Some(shape),
                ..AnnotationData::at(at.x, at.y, 0.0, 0.0)
            };
            let kind = match shape {
                ShapeKind::Rect => PrimitiveKind::Rect,
                ShapeKind::Circle => {
                    props.radius = Some(0.0);
                    PrimitiveKind::Ellipse
                }
                ShapeKind::Line | ShapeKind::Arrow => {
                    props.x1 = Some(at.x);
                    props.y1 = Some(at.y);
                    props.x2 = Some(at.x);
                    props.y2 = Some(at.y);
                    PrimitiveKind::Line
                }
            };
            Primitive::new(kind, props).tagged(AnnotationType::Shape)
        }
    };
    Some(primitive)
}

/// Classify a primitive that was just added to the surface.
///
/// The creating tool's tag wins. Untagged primitives (added by the surface
/// itself) fall back to structural inspection.
pub fn classify(primitive: &Primitive, config: &ManagerConfig) -> AnnotationType {
    if let Some(tag) = primitive.meta.tag {
        return tag;
    }
    match primitive.kind {
        PrimitiveKind::Text => AnnotationType::Text,
        PrimitiveKind::Rect if is_highlight_fill(&primitive.props, config) => AnnotationType::Highlight,
        PrimitiveKind::Group => AnnotationType::Stamp,
        PrimitiveKind::Rect | PrimitiveKind::Ellipse | PrimitiveKind::Line => AnnotationType::Shape,
        PrimitiveKind::Path => AnnotationType::Drawing,
    }
}

fn is_highlight_fill(props: &AnnotationData, config: &ManagerConfig) -> bool {
    props
        .fill
        .as_deref()
        .is_some_and(|fill| fill.eq_ignore_ascii_case(&config.highlight_fill))
        && props.stroke.is_none()
}
