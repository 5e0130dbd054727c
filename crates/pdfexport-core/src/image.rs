//! Stamp image loading and embedding as image XObjects

use crate::error::ExportError;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Resolves a stamp's `imageUrl` to encoded image bytes
pub trait ImageLoader {
    fn load(&self, url: &str) -> Result<Vec<u8>, ExportError>;
}

/// Loads `data:` URLs and local files. Remote URLs are refused so an export
/// never blocks on the network; their stamps fall back to a placeholder.
#[derive(Debug, Clone, Default)]
pub struct LocalImageLoader {
    base_dir: Option<PathBuf>,
}

impl LocalImageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `dir`
    pub fn with_base_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ImageLoader for LocalImageLoader {
    fn load(&self, url: &str) -> Result<Vec<u8>, ExportError> {
        if let Some(rest) = url.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| ExportError::Image("malformed data URL".to_string()))?;
            if !meta.ends_with(";base64") {
                return Err(ExportError::Image(
                    "only base64 data URLs are supported".to_string(),
                ));
            }
            return base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| ExportError::Image(format!("invalid base64 payload: {}", e)));
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return Err(ExportError::Image(format!("remote image not fetched: {}", url)));
        }
        let path = self.resolve(url.strip_prefix("file://").unwrap_or(url));
        fs::read(&path)
            .map_err(|e| ExportError::Image(format!("{}: {}", path.display(), e)))
    }
}

/// Decoded raster ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// 8-bit RGB samples
    pub rgb: Vec<u8>,
    /// 8-bit alpha samples, when the source had transparency
    pub alpha: Option<Vec<u8>>,
}

/// Decode a PNG of any color type into 8-bit RGB plus optional alpha
pub fn decode_png(bytes: &[u8]) -> Result<RasterImage, ExportError> {
    let mut decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder
        .read_info()
        .map_err(|e| ExportError::Image(format!("PNG header: {}", e)))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ExportError::Image(format!("PNG data: {}", e)))?;
    let samples = &buf[..info.buffer_size()];

    let pixels = (info.width * info.height) as usize;
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = None;
    match info.color_type {
        png::ColorType::Rgb => rgb.extend_from_slice(samples),
        png::ColorType::Rgba => {
            let mut a = Vec::with_capacity(pixels);
            for px in samples.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                a.push(px[3]);
            }
            alpha = Some(a);
        }
        png::ColorType::Grayscale => {
            for &v in samples {
                rgb.extend_from_slice(&[v, v, v]);
            }
        }
        png::ColorType::GrayscaleAlpha => {
            let mut a = Vec::with_capacity(pixels);
            for px in samples.chunks_exact(2) {
                rgb.extend_from_slice(&[px[0], px[0], px[0]]);
                a.push(px[1]);
            }
            alpha = Some(a);
        }
        png::ColorType::Indexed => {
            return Err(ExportError::Image("unexpanded palette image".to_string()));
        }
    }

    // Fully opaque alpha adds nothing
    if alpha.as_ref().is_some_and(|a| a.iter().all(|&v| v == 255)) {
        alpha = None;
    }

    Ok(RasterImage {
        width: info.width,
        height: info.height,
        rgb,
        alpha,
    })
}

/// Width, height and component count from a JPEG's start-of-frame marker
pub fn jpeg_dimensions(bytes: &[u8]) -> Option<(u32, u32, u8)> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        let len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        // SOF0..SOF15 excluding DHT, JPG and DAC
        if (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            let seg = bytes.get(i + 4..i + 2 + len)?;
            if seg.len() < 6 {
                return None;
            }
            let height = u16::from_be_bytes([seg[1], seg[2]]) as u32;
            let width = u16::from_be_bytes([seg[3], seg[4]]) as u32;
            return Some((width, height, seg[5]));
        }
        i += 2 + len;
    }
    None
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ExportError::Image(format!("compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ExportError::Image(format!("compression failed: {}", e)))
}

/// Add an image XObject for PNG or JPEG bytes and return its object id
pub fn embed_image(doc: &mut Document, bytes: &[u8]) -> Result<ObjectId, ExportError> {
    if let Some((width, height, components)) = jpeg_dimensions(bytes) {
        let color_space = match components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        };
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        return Ok(doc.add_object(Stream::new(dict, bytes.to_vec()).with_compression(false)));
    }

    let raster = decode_png(bytes)?;
    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => raster.width as i64,
        "Height" => raster.height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    if let Some(alpha) = &raster.alpha {
        let mask = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width as i64,
                "Height" => raster.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(alpha)?,
        )
        .with_compression(false);
        let mask_id = doc.add_object(mask);
        dict.set("SMask", Object::Reference(mask_id));
    }
    let stream = Stream::new(dict, deflate(&raster.rgb)?).with_compression(false);
    Ok(doc.add_object(stream))
}
