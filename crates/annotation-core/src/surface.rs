//! Interactive drawing surface abstraction
//!
//! A surface owns primitives and reports every mutation as a queued
//! [`SurfaceEvent`]. The annotation manager drains that queue after each
//! operation, so a removal it initiates is observed exactly once and never
//! re-enters the manager.

use crate::primitive::Primitive;
use annotation_types::PrimitiveId;

/// Brush used while the surface is in freehand mode
#[derive(Debug, Clone, PartialEq)]
pub struct Brush {
    pub color: String,
    pub width: f64,
    /// Strokes erase existing ink instead of adding new ink
    pub erase: bool,
}

/// How the surface interprets pointer input
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InputMode {
    #[default]
    Select,
    Freehand(Brush),
    Crosshair,
    TextCursor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Added(PrimitiveId),
    Modified(PrimitiveId),
    Removed(PrimitiveId),
}

pub trait Surface {
    /// Add a primitive; queues `Added`
    fn add(&mut self, primitive: Primitive) -> PrimitiveId;

    /// Mutate a primitive in place; queues `Modified`. Returns false for unknown ids.
    fn modify(&mut self, id: PrimitiveId, f: &mut dyn FnMut(&mut Primitive)) -> bool;

    /// Remove a primitive; queues `Removed`
    fn remove(&mut self, id: PrimitiveId) -> Option<Primitive>;

    /// Remove every primitive; queues one `Removed` per primitive
    fn clear(&mut self);

    fn get(&self, id: PrimitiveId) -> Option<&Primitive>;

    /// Live primitive ids in insertion order
    fn ids(&self) -> Vec<PrimitiveId>;

    fn set_input_mode(&mut self, mode: InputMode);

    fn input_mode(&self) -> &InputMode;

    fn set_zoom(&mut self, zoom: f32);

    fn zoom(&self) -> f32;

    /// Select a text primitive and place the caret in it
    fn begin_text_editing(&mut self, id: PrimitiveId);

    fn drain_events(&mut self) -> Vec<SurfaceEvent>;
}
