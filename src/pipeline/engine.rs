//! The document-engine capability the transcode policy is written against.
//!
//! The policy only needs a handful of page-level operations. Expressing them
//! as [`PageDocument`] keeps the policy free of any pdfium types, and lets
//! its invariants be tested against an in-memory document.

use crate::config::ScaleFactor;
use crate::error::PixelPaperError;
use image::DynamicImage;

/// Page size in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageExtent {
    pub width: f32,
    pub height: f32,
}

impl PageExtent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Multiply both axes by the same factor.
    pub fn scaled(self, scale: ScaleFactor) -> Self {
        Self {
            width: self.width * scale.get(),
            height: self.height * scale.get(),
        }
    }

    /// Pixel size of a render at one pixel per point, at least 1×1.
    pub fn pixel_size(self) -> RenderSize {
        RenderSize {
            width: (self.width.round() as u32).max(1),
            height: (self.height.round() as u32).max(1),
        }
    }
}

/// Target bitmap dimensions for [`PageDocument::render_page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSize {
    pub width: u32,
    pub height: u32,
}

/// Serialization options requested when the output document is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaveOptions {
    /// Drop unreferenced objects and deflate streams.
    pub compact: bool,
    /// Drop empty streams and renumber objects so the xref table is rebuilt.
    pub structural_cleanup: bool,
}

/// Page-level operations on an open document.
///
/// Page indices are 0-based. Implementations report page failures as
/// [`PixelPaperError::UnsupportedPage`] with a 1-indexed page number.
pub trait PageDocument {
    fn page_count(&self) -> usize;

    fn page_extent(&self, index: usize) -> Result<PageExtent, PixelPaperError>;

    /// `true` if the page draws at least one embedded raster image, directly
    /// or through a form XObject.
    fn page_has_images(&self, index: usize) -> Result<bool, PixelPaperError>;

    /// Render the whole page into a bitmap of exactly `size`.
    fn render_page(&self, index: usize, size: RenderSize) -> Result<DynamicImage, PixelPaperError>;

    /// Append a structural copy of `source`'s page `index` to this document.
    fn copy_page_from(&mut self, source: &Self, index: usize) -> Result<(), PixelPaperError>;

    /// Append a new page of `extent` filled edge to edge by `image`.
    fn push_image_page(
        &mut self,
        extent: PageExtent,
        image: &DynamicImage,
    ) -> Result<(), PixelPaperError>;

    /// Delete every page past the first `page_count`.
    fn truncate(&mut self, page_count: usize) -> Result<(), PixelPaperError>;

    /// Serialize the document.
    fn save(&self, options: SaveOptions) -> Result<Vec<u8>, PixelPaperError>;
}
