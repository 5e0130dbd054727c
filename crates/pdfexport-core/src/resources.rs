//! Installing rendered annotation content and its resources on a page

use crate::error::ExportError;
use crate::render::PageCanvas;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::BTreeMap;

/// Objects shared by every page of one export, so each font or opacity
/// state is written once
#[derive(Debug, Default)]
pub struct SharedResources {
    fonts: BTreeMap<&'static str, ObjectId>,
    opacity_states: BTreeMap<u32, ObjectId>,
}

impl SharedResources {
    pub fn new() -> Self {
        Self::default()
    }

    fn font(&mut self, doc: &mut Document, base: &'static str) -> ObjectId {
        *self.fonts.entry(base).or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base,
                "Encoding" => "WinAnsiEncoding",
            })
        })
    }

    fn opacity(&mut self, doc: &mut Document, alpha: f32) -> ObjectId {
        let key = (alpha * 100.0).round() as u32;
        *self.opacity_states.entry(key).or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "ExtGState",
                "ca" => Object::Real(alpha),
                "CA" => Object::Real(alpha),
            })
        })
    }
}

/// Append a canvas' operators to a page and register what they reference.
///
/// The existing content is wrapped in `q`/`Q` so any graphics state it leaves
/// behind (a transform, a clip) does not leak into the annotations.
pub fn install(
    doc: &mut Document,
    page_id: ObjectId,
    canvas: PageCanvas<'_>,
    shared: &mut SharedResources,
) -> Result<(), ExportError> {
    if canvas.is_empty() {
        return Ok(());
    }

    let mut fonts = Vec::new();
    for (name, base) in &canvas.fonts {
        fonts.push((name.clone(), shared.font(doc, *base)));
    }
    let mut states = Vec::new();
    for (name, alpha) in &canvas.opacity_states {
        states.push((name.clone(), shared.opacity(doc, *alpha)));
    }
    let images: Vec<(String, ObjectId)> = canvas
        .images
        .iter()
        .map(|(name, id)| (name.clone(), *id))
        .collect();

    let mut resources = own_resources(doc, page_id)?;
    register(doc, &mut resources, b"Font", fonts)?;
    register(doc, &mut resources, b"ExtGState", states)?;
    register(doc, &mut resources, b"XObject", images)?;

    let mut body = Content {
        operations: canvas.into_operations(),
    }
    .encode()?;
    let mut wrapped = b"Q\n".to_vec();
    wrapped.append(&mut body);

    let prefix = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let suffix = doc.add_object(Stream::new(Dictionary::new(), wrapped));

    let existing = existing_contents(doc, page_id)?;
    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(prefix));
    contents.extend(existing);
    contents.push(Object::Reference(suffix));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// The page's effective resources as an inline dictionary, copying inherited
/// or shared dictionaries so edits stay local to this page
fn own_resources(doc: &Document, page_id: ObjectId) -> Result<Dictionary, ExportError> {
    match crate::coords::inherited(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => Ok(dict.clone()),
        Some(_) => Err(ExportError::OperationError(
            "page resources are not a dictionary".to_string(),
        )),
        None => Ok(Dictionary::new()),
    }
}

fn register(
    doc: &Document,
    resources: &mut Dictionary,
    category: &[u8],
    entries: Vec<(String, ObjectId)>,
) -> Result<(), ExportError> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut sub = match resources.get(category) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?.clone(),
        _ => Dictionary::new(),
    };
    for (name, id) in entries {
        sub.set(name, Object::Reference(id));
    }
    resources.set(category.to_vec(), Object::Dictionary(sub));
    Ok(())
}

fn existing_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, ExportError> {
    let page = doc.get_dictionary(page_id)?;
    Ok(match page.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            // Indirect array of streams
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    })
}
