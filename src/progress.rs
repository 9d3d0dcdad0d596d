//! Progress-callback trait for per-page transcode events.
//!
//! Inject an [`Arc<dyn TranscodeProgressCallback>`] via
//! [`crate::config::TranscodeConfigBuilder::progress_callback`] to receive
//! events as the policy walks the document.
//!
//! # Example
//!
//! ```rust
//! use pixelpaper::{PageAction, TranscodeConfig, TranscodeProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountRasterized(AtomicUsize);
//!
//! impl TranscodeProgressCallback for CountRasterized {
//!     fn on_page_complete(&self, _page_num: usize, _total: usize, action: PageAction) {
//!         if action == PageAction::Rasterized {
//!             self.0.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let config = TranscodeConfig::builder()
//!     .progress_callback(Arc::new(CountRasterized(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::PageAction;
use std::sync::Arc;

/// Called by the transcode policy as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in page order on the calling thread.
pub trait TranscodeProgressCallback: Send + Sync {
    /// Called once before the first page.
    fn on_transcode_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is inspected.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages in the document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been written to the output.
    fn on_page_complete(&self, page_num: usize, total_pages: usize, action: PageAction) {
        let _ = (page_num, total_pages, action);
    }

    /// Called when a page fails and is skipped.
    ///
    /// Not called when the failure aborts the run; the caller gets the error
    /// instead.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    ///
    /// # Arguments
    /// * `total_pages`       — pages in the input document
    /// * `rasterized_pages`  — pages flattened to an image
    fn on_transcode_complete(&self, total_pages: usize, rasterized_pages: usize) {
        let _ = (total_pages, rasterized_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl TranscodeProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranscodeConfig`].
pub type ProgressCallback = Arc<dyn TranscodeProgressCallback>;
