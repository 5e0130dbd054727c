//! Interactive annotation editing
//!
//! Binds an [`AnnotationManager`] to a [`Surface`] and turns tool selection
//! and pointer gestures into annotation records.

pub mod config;
pub mod error;
pub mod manager;
pub mod memory;
pub mod primitive;
pub mod surface;
pub mod tools;

pub use config::{ManagerConfig, StampConfig};
pub use error::ManagerError;
pub use manager::{AnnotationManager, InputEvent, SubscriptionId};
pub use memory::MemorySurface;
pub use primitive::{Primitive, PrimitiveKind, PrimitiveMeta};
pub use surface::{Brush, InputMode, Surface, SurfaceEvent};
