//! pdfium-backed [`PageDocument`].
//!
//! pdfium does the parts of the job that need a real renderer: opening the
//! input, telling image pages from text pages (images nested in form
//! XObjects included), rasterising, structural page copies and building the
//! new image pages. Serialization goes through pdfium's writer and then the
//! lopdf [`compact`](super::compact) pass.
//!
//! A [`Pdfium`] handle is bound per invocation and every document borrows
//! it, so nothing outlives the call that opened it.

use crate::error::PixelPaperError;
use crate::pipeline::compact;
use crate::pipeline::engine::{PageDocument, PageExtent, RenderSize, SaveOptions};
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bind to a pdfium library.
///
/// Search order: `explicit` (a library file or a directory containing one),
/// `PDFIUM_LIB_PATH`, the working directory, then the system library path.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, PixelPaperError> {
    let configured = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match configured {
        Some(path) => {
            let library = if path.is_dir() {
                Pdfium::pdfium_platform_library_name_at_path(&path)
            } else {
                path
            };
            debug!("Binding pdfium from {}", library.display());
            Pdfium::bind_to_library(&library)
        }
        None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PixelPaperError::PdfiumBinding(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// An open pdfium document.
pub struct PdfiumDocument<'a> {
    inner: PdfDocument<'a>,
}

impl<'a> PdfiumDocument<'a> {
    /// Open a PDF from memory. `origin` is only used in error messages.
    pub fn open_bytes(
        pdfium: &'a Pdfium,
        bytes: &'a [u8],
        password: Option<&'a str>,
        origin: &Path,
    ) -> Result<Self, PixelPaperError> {
        let inner = pdfium
            .load_pdf_from_byte_slice(bytes, password)
            .map_err(|e| classify_open_error(e, password.is_some(), origin))?;

        if inner.pages().len() == 0 {
            return Err(PixelPaperError::EmptyDocument {
                path: origin.to_path_buf(),
            });
        }

        debug!("Opened {} ({} pages)", origin.display(), inner.pages().len());
        Ok(Self { inner })
    }

    /// A new, empty document to receive transcoded pages.
    pub fn create(pdfium: &'a Pdfium) -> Result<Self, PixelPaperError> {
        let inner = pdfium
            .create_new_pdf()
            .map_err(|e| PixelPaperError::Internal(format!("pdfium create_new_pdf: {:?}", e)))?;
        Ok(Self { inner })
    }

    fn page(&self, index: usize) -> Result<PdfPage<'a>, PixelPaperError> {
        let page_index = page_index(index)?;
        self.inner
            .pages()
            .get(page_index)
            .map_err(|e| unsupported(index, e))
    }
}

impl PageDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.inner.pages().len() as usize
    }

    fn page_extent(&self, index: usize) -> Result<PageExtent, PixelPaperError> {
        let page = self.page(index)?;
        Ok(PageExtent::new(page.width().value, page.height().value))
    }

    fn page_has_images(&self, index: usize) -> Result<bool, PixelPaperError> {
        let page = self.page(index)?;
        let found = page.objects().iter().any(|object| draws_image(&object));
        Ok(found)
    }

    fn render_page(&self, index: usize, size: RenderSize) -> Result<DynamicImage, PixelPaperError> {
        let page = self.page(index)?;
        let render_config = PdfRenderConfig::new()
            .set_target_width(size.width as i32)
            .set_target_height(size.height as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| unsupported(index, e))?;

        // Pages render onto an opaque white background; the alpha channel
        // only adds an SMask to the output.
        Ok(DynamicImage::ImageRgb8(bitmap.as_image().to_rgb8()))
    }

    fn copy_page_from(&mut self, source: &Self, index: usize) -> Result<(), PixelPaperError> {
        let source_index = page_index(index)?;
        let destination = self.inner.pages().len();
        self.inner
            .pages_mut()
            .copy_page_from_document(&source.inner, source_index, destination)
            .map_err(|e| unsupported(index, e))
    }

    fn push_image_page(
        &mut self,
        extent: PageExtent,
        image: &DynamicImage,
    ) -> Result<(), PixelPaperError> {
        let width = PdfPoints::new(extent.width);
        let height = PdfPoints::new(extent.height);
        let page_num = self.inner.pages().len() as usize + 1;

        let mut page = self
            .inner
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(width, height))
            .map_err(|e| placement_failed(page_num, e))?;

        let origin = PdfPoints::new(0.0);
        page.objects_mut()
            .create_image_object(origin, origin, image, Some(width), Some(height))
            .map_err(|e| placement_failed(page_num, e))?;

        Ok(())
    }

    fn truncate(&mut self, page_count: usize) -> Result<(), PixelPaperError> {
        while self.page_count() > page_count {
            let last = page_index(self.page_count() - 1)?;
            self.inner
                .pages()
                .get(last)
                .and_then(|page| page.delete())
                .map_err(|e| placement_failed(last as usize + 1, e))?;
        }
        Ok(())
    }

    fn save(&self, options: SaveOptions) -> Result<Vec<u8>, PixelPaperError> {
        let raw = self.inner.save_to_bytes().map_err(|e| PixelPaperError::PdfWrite {
            detail: format!("pdfium save: {:?}", e),
        })?;
        compact::compact_pdf(&raw, options)
    }
}

/// Image objects count wherever they sit; form XObjects are searched
/// recursively.
fn draws_image(object: &PdfPageObject<'_>) -> bool {
    match object.object_type() {
        PdfPageObjectType::Image => true,
        PdfPageObjectType::XObjectForm => object
            .as_x_object_form_object()
            .is_some_and(|form| form.iter().any(|child| draws_image(&child))),
        _ => false,
    }
}

fn page_index(index: usize) -> Result<PdfPageIndex, PixelPaperError> {
    PdfPageIndex::try_from(index).map_err(|_| PixelPaperError::UnsupportedPage {
        page: index + 1,
        detail: "page index exceeds pdfium's limit".into(),
    })
}

fn unsupported(index: usize, e: PdfiumError) -> PixelPaperError {
    PixelPaperError::UnsupportedPage {
        page: index + 1,
        detail: format!("{:?}", e),
    }
}

fn placement_failed(page_num: usize, e: PdfiumError) -> PixelPaperError {
    PixelPaperError::PdfWrite {
        detail: format!("output page {}: {:?}", page_num, e),
    }
}

fn classify_open_error(e: PdfiumError, has_password: bool, origin: &Path) -> PixelPaperError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if has_password {
            PixelPaperError::WrongPassword {
                path: origin.to_path_buf(),
            }
        } else {
            PixelPaperError::PasswordRequired {
                path: origin.to_path_buf(),
            }
        }
    } else {
        PixelPaperError::DocumentOpen {
            path: origin.to_path_buf(),
            detail: err_str,
        }
    }
}
