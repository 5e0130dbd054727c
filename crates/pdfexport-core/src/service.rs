//! Burning annotations into a document as native page content

use crate::config::ExportConfig;
use crate::coords::PageFrame;
use crate::error::ExportError;
use crate::image::{embed_image, ImageLoader, LocalImageLoader};
use crate::render::PageCanvas;
use crate::resources::{install, SharedResources};
use crate::search::TextIndex;
use annotation_types::{AnnotationRecord, AnnotationType, SearchResult};
use lopdf::{Document, ObjectId};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Group annotations by their 1-based page, keeping list order within a page
pub fn group_by_page<A: AnnotationRecord>(annotations: &[A]) -> BTreeMap<u32, Vec<&A>> {
    let mut groups: BTreeMap<u32, Vec<&A>> = BTreeMap::new();
    for annotation in annotations {
        groups.entry(annotation.page()).or_default().push(annotation);
    }
    groups
}

/// Holds a loaded document plus its pristine bytes and renders annotation
/// lists onto it
pub struct PdfExportService {
    config: ExportConfig,
    loader: Box<dyn ImageLoader>,
    original: Option<Vec<u8>>,
    document: Option<Document>,
}

impl Default for PdfExportService {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExportService {
    pub fn new() -> Self {
        Self::with_config(ExportConfig::default())
    }

    pub fn with_config(config: ExportConfig) -> Self {
        Self {
            config,
            loader: Box::new(LocalImageLoader::new()),
            original: None,
            document: None,
        }
    }

    /// Replace the loader used to resolve stamp `imageUrl`s
    pub fn with_image_loader<L: ImageLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Parse `bytes` and keep both the parsed document and the raw buffer
    pub fn load_pdf(&mut self, bytes: &[u8]) -> Result<(), ExportError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExportError::ParseError(e.to_string()))?;
        info!(pages = doc.get_pages().len(), bytes = bytes.len(), "document loaded");
        self.document = Some(doc);
        self.original = Some(bytes.to_vec());
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// The loaded document, including anything already drawn onto it
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    fn loaded(&self) -> Result<&Document, ExportError> {
        self.document.as_ref().ok_or(ExportError::NotLoaded)
    }

    pub fn page_count(&self) -> Result<u32, ExportError> {
        Ok(self.loaded()?.get_pages().len() as u32)
    }

    /// Width and height of a 1-based page, in page units
    pub fn page_size(&self, page: u32) -> Result<(f64, f64), ExportError> {
        let doc = self.loaded()?;
        let page_id = doc
            .get_pages()
            .get(&page)
            .copied()
            .ok_or_else(|| ExportError::OperationError(format!("page {} out of range", page)))?;
        let frame = PageFrame::for_page(doc, page_id, self.config.surface_scale);
        Ok((frame.width(), frame.height()))
    }

    /// Draw each annotation onto its page of the loaded document, in list
    /// order, and serialize the result.
    ///
    /// Annotations draw onto the currently loaded document; calling this
    /// twice stamps twice. Use [`export_with_annotations`](Self::export_with_annotations)
    /// to start from the original bytes every time.
    pub fn add_annotations<A: AnnotationRecord>(
        &mut self,
        annotations: &[A],
    ) -> Result<Vec<u8>, ExportError> {
        let Self {
            config,
            loader,
            document,
            ..
        } = self;
        let doc = document.as_mut().ok_or(ExportError::NotLoaded)?;

        let pages = doc.get_pages();
        let mut shared = SharedResources::new();
        let mut images: BTreeMap<String, Option<ObjectId>> = BTreeMap::new();
        let mut drawn = 0;

        for (page_num, items) in group_by_page(annotations) {
            let Some(&page_id) = pages.get(&page_num) else {
                warn!(
                    page = page_num,
                    count = items.len(),
                    page_count = pages.len(),
                    "annotations reference a page outside the document; skipped"
                );
                continue;
            };

            let frame = PageFrame::for_page(doc, page_id, config.surface_scale);
            let mut canvas = PageCanvas::new(frame, config);
            for annotation in items {
                draw(doc, &mut canvas, annotation, &**loader, &mut images);
            }
            debug!(page = page_num, drawn = canvas.group_count(), "page rendered");
            drawn += canvas.group_count();
            install(doc, page_id, canvas, &mut shared)?;
        }

        let mut output = Vec::new();
        doc.save_to(&mut output)
            .map_err(|e| ExportError::SerializationError(e.to_string()))?;
        info!(
            annotations = annotations.len(),
            drawn,
            bytes = output.len(),
            "annotations burned in"
        );
        Ok(output)
    }

    /// Reload from the original bytes, then [`add_annotations`](Self::add_annotations)
    pub fn export_with_annotations<A: AnnotationRecord>(
        &mut self,
        annotations: &[A],
    ) -> Result<Vec<u8>, ExportError> {
        let original = self.original.clone().ok_or(ExportError::NotLoaded)?;
        self.load_pdf(&original)?;
        if annotations.is_empty() {
            return Ok(original);
        }
        self.add_annotations(annotations)
    }

    /// Positioned text of the loaded document for repeated searching
    pub fn text_index(&self) -> Result<TextIndex, ExportError> {
        Ok(TextIndex::build(self.loaded()?, self.config.surface_scale))
    }

    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, ExportError> {
        Ok(self.text_index()?.find(query))
    }
}

fn draw<A: AnnotationRecord>(
    doc: &mut Document,
    canvas: &mut PageCanvas<'_>,
    annotation: &A,
    loader: &dyn ImageLoader,
    images: &mut BTreeMap<String, Option<ObjectId>>,
) {
    let data = annotation.data();
    match annotation.kind() {
        AnnotationType::Text => canvas.draw_text(data),
        AnnotationType::Highlight => canvas.draw_highlight(data),
        AnnotationType::Drawing => canvas.draw_freehand(data),
        AnnotationType::Shape => canvas.draw_shape(data),
        AnnotationType::Stamp => match data.image_url.as_deref().filter(|u| !u.is_empty()) {
            None => canvas.draw_stamp_label(data),
            Some(url) => {
                let embedded = *images.entry(url.to_string()).or_insert_with(|| {
                    match loader.load(url).and_then(|bytes| embed_image(doc, &bytes)) {
                        Ok(id) => Some(id),
                        Err(e) => {
                            warn!(error = %e, "stamp image unavailable, drawing placeholder");
                            None
                        }
                    }
                });
                match embedded {
                    Some(id) => canvas.draw_stamp_image(data, id),
                    None => canvas.draw_stamp_placeholder(data),
                }
            }
        },
    }
}
