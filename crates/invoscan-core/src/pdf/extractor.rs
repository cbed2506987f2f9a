//! PDF text and page image extraction using lopdf and pdf-extract.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Outcome of inspecting a loaded PDF.
#[derive(Debug, Clone)]
pub struct PdfAnalysis {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Embedded text (empty when extraction failed).
    pub text: String,
    /// Why embedded text extraction failed, if it did.
    pub text_error: Option<String>,
    /// Number of raster images in the document.
    pub image_count: usize,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Count raster images across the whole document.
    fn count_all_images(&self) -> usize {
        let doc = match self.document.as_ref() {
            Some(d) => d,
            None => return 0,
        };

        let mut seen_objects: HashSet<ObjectId> = HashSet::new();
        let mut count = 0;

        for (id, object) in doc.objects.iter() {
            if !seen_objects.insert(*id) {
                continue;
            }
            if is_image_object(object) {
                count += 1;
            }
        }

        debug!("Found {} images in document", count);
        count
    }

    fn try_extract_image_from_object(&self, doc: &Document, obj: &Object) -> Option<DynamicImage> {
        if let Object::Stream(stream) = obj {
            if !is_image_object(obj) {
                return None;
            }
            let dict = &stream.dict;

            let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
            let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;

            trace!("Found image object: {}x{}", width, height);

            let data = match stream.decompressed_content() {
                Ok(d) => d,
                Err(_) => stream.content.clone(),
            };

            if let Ok(filter) = dict.get(b"Filter") {
                let filter_name = match filter {
                    Object::Name(name) => Some(name.as_slice()),
                    Object::Array(arr) if !arr.is_empty() => {
                        arr.first().and_then(|o| o.as_name().ok())
                    }
                    _ => None,
                };

                match filter_name {
                    Some(b"DCTDecode") => {
                        // JPEG bytes are used as stored
                        return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
                    }
                    Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                        trace!("Unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                        return None;
                    }
                    _ => {}
                }
            }

            let color_space = dict
                .get(b"ColorSpace")
                .ok()
                .and_then(|o| match o {
                    Object::Name(name) => Some(name.as_slice()),
                    Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                    Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                    _ => None,
                })
                .unwrap_or(b"DeviceRGB");

            let bits = dict
                .get(b"BitsPerComponent")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(8) as u8;

            return create_image_from_raw(&data, width, height, color_space, bits);
        }
        None
    }

    /// Get resources dictionary for a page, handling inheritance.
    fn get_page_resources(&self, doc: &Document, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let node = doc.get_object(node_id).ok()?;
        if let Object::Dictionary(dict) = node {
            if let Ok(resources) = dict.get(b"Resources") {
                if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                    return Some(res_dict.clone());
                }
            }

            if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
                return self.get_page_resources(doc, *parent_id);
            }
        }
        None
    }

    /// Images referenced from a page's XObject resources.
    fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self.document()?;

        let pages = doc.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        if let Some(resources) = self.get_page_resources(doc, *page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = doc.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(doc, obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // PDFs "encrypted" with an empty user password open without one
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfAnalysis {
        let (text, text_error) = match self.extract_text() {
            Ok(text) => (text, None),
            Err(e) => (String::new(), Some(e.to_string())),
        };
        let has_text = !text.trim().is_empty();

        let image_count = self.count_all_images();
        let has_images = image_count > 0;

        let pdf_type = match (has_text, has_images) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        };

        debug!("PDF analysis: has_text={}, has_images={} -> {:?}", has_text, has_images, pdf_type);
        PdfAnalysis {
            pdf_type,
            text,
            text_error,
            image_count,
        }
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        // pdf-extract panics on some malformed content streams
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&self.raw_data)
        }));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(PdfError::TextExtraction(e.to_string())),
            Err(_) => Err(PdfError::TextExtraction("PDF text extractor panicked".to_string())),
        }
    }

    fn page_image(&self, page: u32) -> Result<DynamicImage> {
        self.page_images(page)?
            .into_iter()
            .next()
            .ok_or_else(|| PdfError::ImageExtraction(format!("no image content on page {}", page)))
    }
}

fn is_image_object(obj: &Object) -> bool {
    match obj {
        Object::Stream(stream) => stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|s| s.as_name().ok())
            .map(|name| name == b"Image")
            .unwrap_or(false),
        _ => false,
    }
}

fn create_image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: u8,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let Some(expected_gray) = usize::try_from(width)
        .ok()
        .zip(usize::try_from(height).ok())
        .and_then(|(w, h)| w.checked_mul(h))
    else {
        trace!("Image dimensions overflow: {}x{}", width, height);
        return None;
    };
    let expected_rgb = expected_gray.checked_mul(3)?;

    let rgba_data: Vec<u8> = if (color_space == b"DeviceRGB" || color_space == b"RGB")
        && data.len() >= expected_rgb
    {
        data[..expected_rgb]
            .chunks(3)
            .flat_map(|c| [c[0], c[1], c[2], 255])
            .collect()
    } else if (color_space == b"DeviceGray" || color_space == b"G") && data.len() >= expected_gray {
        data[..expected_gray]
            .iter()
            .flat_map(|&g| [g, g, g, 255])
            .collect()
    } else {
        trace!(
            "Could not decode image: data_len={}, expected_rgb={}, expected_gray={}",
            data.len(),
            expected_rgb,
            expected_gray
        );
        return None;
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba_data).map(DynamicImage::ImageRgba8)
}
