//! Shared annotation data model
//!
//! Records, classifications, tool modes and UI contracts consumed by both the
//! annotation manager and the PDF export pipeline.

pub mod annotation;
pub mod color;
pub mod data;
pub mod search;
pub mod tool;
pub mod ui;

pub use annotation::{
    Annotation, AnnotationId, AnnotationPatch, AnnotationRecord, AnnotationType, PrimitiveId,
    SavedAnnotation,
};
pub use color::Color;
pub use data::{AnnotationData, Bounds, PathData, Point, ShapeKind};
pub use search::{SearchResult, SearchState};
pub use tool::{DrawingSettings, DrawingSettingsPatch, ToolType};
pub use ui::{NavigatorHandler, NavigatorState, SearchHandler, ToolbarHandler, ToolbarState};
