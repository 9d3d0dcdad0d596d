//! # pixelpaper
//!
//! Merge, compress and resize PDF documents, and resize or compress raster
//! images.
//!
//! ## Why rasterize?
//!
//! Most oversized PDFs are oversized because of the scans and photos they
//! embed. Re-encoding those images in place means decoding every filter
//! and colour space a PDF can carry. Instead, a page that holds images is
//! rendered as a whole at a reduced size and replaced by a single image
//! page. Pages without images are copied untouched, so their text stays
//! selectable and their vectors stay sharp.
//!
//! ## Operations
//!
//! ```text
//! merge           PDF + PDF + …  ──▶ PDF      (lopdf page-tree splice)
//! compress-pdf    PDF ──▶ PDF                 (image pages rasterized at p%)
//! resize-pdf      PDF ──▶ PDF                 (every page rasterized at p%)
//! resize-image    image ──▶ image             (same format, p% per side)
//! compress-image  image ──▶ JPEG              (quality q)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pixelpaper::{compress_pdf, ScalePercent, TranscodeConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TranscodeConfig::default();
//!     let stats = compress_pdf(
//!         Path::new("scan.pdf"),
//!         Path::new("scan-small.pdf"),
//!         ScalePercent::new(50)?,
//!         &config,
//!     )?;
//!     eprintln!(
//!         "{} pages, {} rasterized: {} → {}",
//!         stats.total_pages,
//!         stats.rasterized_pages,
//!         pixelpaper::human_size(stats.input_bytes),
//!         pixelpaper::human_size(stats.output_bytes),
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pixelpaper` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pixelpaper = { version = "0.3", default-features = false }
//! ```
//!
//! ## PDFium
//!
//! Compress and resize need a pdfium shared library at runtime. It is
//! looked up from [`TranscodeConfig::pdfium_library`], then
//! `PDFIUM_LIB_PATH`, the working directory and the system library path.
//! Merge and the image operations do not use pdfium.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Quality, ScalePercent, TranscodeConfig, TranscodeConfigBuilder, TranscodeMode};
pub use convert::{
    compress_image, compress_pdf, merge_pdf_bytes, merge_pdfs, resize_image, resize_pdf,
    transcode_pdf_bytes,
};
pub use error::{PageError, PixelPaperError};
pub use output::{human_size, ImageStats, MergeStats, PageAction, PageOutcome, TranscodeStats};
pub use pipeline::transcode::TranscodeOutput;
pub use progress::{NoopProgressCallback, ProgressCallback, TranscodeProgressCallback};
