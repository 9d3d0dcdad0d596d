//! Result types returned by the entry points.
//!
//! Everything here is `Serialize` so the CLI can print it with `--json`.

use crate::config::TranscodeMode;
use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// What the policy did with one input page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    /// Copied structurally; vector and text content preserved.
    Copied,
    /// Flattened to a single full-page image at the target scale.
    Rasterized,
    /// Failed and left out of the output.
    Skipped,
}

/// Per-page record of a transcode run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    /// 1-indexed page number in the input document.
    pub page_num: usize,
    pub action: PageAction,
    /// Output page width in PDF points (0 for skipped pages).
    pub width: f32,
    /// Output page height in PDF points (0 for skipped pages).
    pub height: f32,
    /// Set only for skipped pages.
    pub error: Option<PageError>,
}

/// Summary of a compress or resize run over a PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeStats {
    pub mode: TranscodeMode,
    pub scale_percent: u8,
    pub total_pages: usize,
    pub copied_pages: usize,
    pub rasterized_pages: usize,
    pub skipped_pages: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub duration_ms: u64,
    pub pages: Vec<PageOutcome>,
}

/// Summary of a merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeStats {
    pub documents: usize,
    pub total_pages: usize,
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub duration_ms: u64,
}

/// Summary of a raster image operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStats {
    /// Lower-case format name, e.g. `"png"`.
    pub format: String,
    pub input_width: u32,
    pub input_height: u32,
    pub output_width: u32,
    pub output_height: u32,
    pub input_bytes: u64,
    pub output_bytes: u64,
    /// Where the result was written. May differ from the requested path for
    /// compression, which always produces a `.jpg`.
    pub destination: std::path::PathBuf,
}

/// Format a byte count the way the summary line shows it.
///
/// `B` below 1 KiB, then `KB` and `MB` with two decimals.
pub fn human_size(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes < KIB {
        format!("{bytes} B")
    } else if bytes < MIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    }
}
