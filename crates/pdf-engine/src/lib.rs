use image::{ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// US Letter, used when a page carries no readable MediaBox.
pub const FALLBACK_PAGE_SIZE: PageSize = PageSize { width_pt: 612.0, height_pt: 792.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// Pixel dimensions of the page surface at `scale`. Never below 1x1.
    pub fn scaled_px(self, scale: f32) -> (u32, u32) {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        (
            (self.width_pt * scale).round().max(1.0) as u32,
            (self.height_pt * scale).round().max(1.0) as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_index: u32,
    pub scale: f32,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self { page_index: 0, scale: 1.0 }
    }
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported")]
    EncryptedUnsupported,
    #[error("document has no pages")]
    NoPages,
}

/// Document source for the viewer: page geometry plus a per-page render
/// operation. Knows nothing about scrolling.
pub trait PdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    fn page_size(&self, handle: DocumentHandle, page_index: u32)
        -> Result<PageSize, PdfEngineError>;
    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;

    fn page_sizes(&self, handle: DocumentHandle) -> Result<Vec<PageSize>, PdfEngineError> {
        let count = self.page_count(handle)?;
        (0..count).map(|page_index| self.page_size(handle, page_index)).collect()
    }
}

#[derive(Debug, Default)]
pub struct LopdfEngine {
    next_handle: u64,
    docs: HashMap<DocumentHandle, Vec<PageSize>>,
}

impl LopdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_sizes(bytes: &[u8]) -> Result<Vec<PageSize>, PdfEngineError> {
        if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(PdfEngineError::EncryptedUnsupported);
        }

        let doc = Document::load_mem(bytes)?;
        let sizes = doc
            .get_pages()
            .into_values()
            .map(|object_id| media_box(&doc, object_id).unwrap_or(FALLBACK_PAGE_SIZE))
            .collect::<Vec<_>>();

        if sizes.is_empty() {
            return Err(PdfEngineError::NoPages);
        }

        Ok(sizes)
    }

    fn record(&self, handle: DocumentHandle) -> Result<&[PageSize], PdfEngineError> {
        self.docs
            .get(&handle)
            .map(Vec::as_slice)
            .ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

/// MediaBox of a page, following `/Parent` links for inherited boxes.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<PageSize> {
    let mut dict: &Dictionary = doc.get_dictionary(page_id).ok()?;

    // Page trees are shallow; the bound only guards against reference cycles.
    for _ in 0..32 {
        if let Some(size) = dict.get(b"MediaBox").ok().and_then(rect_size) {
            return Some(size);
        }

        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn rect_size(object: &Object) -> Option<PageSize> {
    let array = object.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let x0 = number(&array[0])?;
    let y0 = number(&array[1])?;
    let x1 = number(&array[2])?;
    let y1 = number(&array[3])?;
    Some(PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() })
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value as f32),
        _ => None,
    }
}

impl PdfEngine for LopdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let bytes = match source {
            OpenSource::Path(path) => fs::read(path)?,
            OpenSource::Bytes(bytes) => bytes,
        };

        let page_sizes = Self::parse_sizes(&bytes)?;

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        debug!(handle = handle.raw(), pages = page_sizes.len(), "opened PDF");
        self.docs.insert(handle, page_sizes);

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.record(handle)?.len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        let sizes = self.record(handle)?;
        sizes.get(page_index as usize).copied().ok_or(PdfEngineError::PageOutOfRange {
            page: page_index,
            page_count: sizes.len() as u32,
        })
    }

    /// Produces a blank page-sized surface with a light border. Content
    /// rasterisation belongs to a full rendering backend.
    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbaImage, PdfEngineError> {
        let (width, height) = self.page_size(handle, request.page_index)?.scaled_px(request.scale);
        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        if width >= 4 && height >= 4 {
            let border = Rgba([220, 220, 220, 255]);
            for x in 0..width {
                image.put_pixel(x, 0, border);
                image.put_pixel(x, height - 1, border);
            }
            for y in 0..height {
                image.put_pixel(0, y, border);
                image.put_pixel(width - 1, y, border);
            }
        }

        Ok(image)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

pub fn default_engine() -> LopdfEngine {
    LopdfEngine::new()
}
