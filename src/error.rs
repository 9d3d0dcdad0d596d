//! Error types for the pixelpaper library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PixelPaperError`]: **fatal**, the operation cannot complete (bad
//!   parameter, unreadable input, a page that will not render, a destination
//!   that cannot be written). Returned as `Err(PixelPaperError)` from every
//!   entry point, and nothing is written to the destination.
//!
//! * [`PageError`]: **non-fatal**, a single page failed while
//!   [`crate::config::TranscodeConfig::skip_failed_pages`] is enabled. Stored
//!   inside [`crate::output::PageOutcome`] so callers can see which pages were
//!   dropped from the output.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pixelpaper library.
#[derive(Debug, Error)]
pub enum PixelPaperError {
    // ── Input validation ──────────────────────────────────────────────────
    /// A numeric parameter is outside its allowed range.
    #[error("{parameter} must be between {min} and {max}, got {value}")]
    InvalidParameter {
        parameter: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Merge was asked to combine zero documents.
    #[error("Nothing to merge: at least one input PDF is required")]
    NoInputs,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The document engine could not parse the input.
    #[error("PDF '{path}' could not be opened: {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// The document opened but has no pages.
    #[error("PDF '{path}' has no pages")]
    EmptyDocument { path: PathBuf },

    /// A page could not be inspected, rendered, copied or placed.
    #[error("Page {page} could not be transcoded: {detail}")]
    UnsupportedPage { page: usize, detail: String },

    /// `skip_failed_pages` was set and every page failed.
    #[error("All {total} pages failed.\nFirst error: {first_error}")]
    AllPagesFailed { total: usize, first_error: String },

    /// Serializing or compacting the output document failed.
    #[error("Failed to write PDF: {detail}")]
    PdfWrite { detail: String },

    // ── Image errors ──────────────────────────────────────────────────────
    /// The input bytes are not in an image format we can decode.
    #[error("Unrecognised image format: {detail}")]
    UnsupportedImageFormat { detail: String },

    /// The image codec rejected the input.
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[source] image::ImageError),

    /// The image codec could not encode the output.
    #[error("Failed to encode image: {0}")]
    ImageEncode(#[source] image::ImageError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Download a build from https://github.com/bblanchon/pdfium-binaries and either:\n\
  • place libpdfium next to the working directory,\n\
  • set PDFIUM_LIB_PATH=/path/to/libpdfium, or\n\
  • pass --pdfium-lib /path/to/libpdfium.\n"
    )]
    PdfiumBinding(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PixelPaperError {
    /// Shorthand for a range violation on a 1–100 style parameter.
    pub(crate) fn out_of_range(parameter: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self::InvalidParameter {
            parameter,
            value,
            min,
            max,
        }
    }
}

/// A non-fatal error for a single page.
///
/// Only produced when failed pages are skipped instead of aborting the run.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Inspecting or rendering the source page failed.
    #[error("Page {page}: rendering failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Writing the page into the output document failed.
    #[error("Page {page}: could not be added to the output: {detail}")]
    PlacementFailed { page: usize, detail: String },
}

impl PageError {
    /// Classify a fatal per-page error as its non-fatal counterpart.
    pub(crate) fn from_fatal(page: usize, err: &PixelPaperError) -> Self {
        match err {
            PixelPaperError::UnsupportedPage { detail, .. } => PageError::RenderFailed {
                page,
                detail: detail.clone(),
            },
            other => PageError::PlacementFailed {
                page,
                detail: other.to_string(),
            },
        }
    }
}
