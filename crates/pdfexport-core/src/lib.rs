//! PDF export for annotation sets
//!
//! Loads an original document, burns annotations into its pages as native
//! content (text, vector paths, images) and serializes the result. Also
//! provides text search over the loaded document.
//!
//! ```ignore
//! let mut service = PdfExportService::new();
//! service.load_pdf(&original_bytes)?;
//! let exported = service.export_with_annotations(&manager.annotations())?;
//! ```

pub mod config;
pub mod coords;
pub mod error;
pub mod fonts;
pub mod image;
pub mod render;
pub mod resources;
pub mod search;
pub mod service;

pub use config::ExportConfig;
pub use coords::{PageFrame, PdfRect};
pub use error::ExportError;
pub use image::{ImageLoader, LocalImageLoader};
pub use search::{SearchSession, TextIndex};
pub use service::{group_by_page, PdfExportService};
