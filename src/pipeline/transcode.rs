//! The per-page transcode policy.
//!
//! For every input page the policy picks one of two transformations:
//!
//! ```text
//!            ┌─ Resize ─────────────────────────────┐
//! page ──────┤                                      ├──▶ render at scale → new page
//!            └─ Compress ─ has images? ── yes ──────┘
//!                               │
//!                               └──── no ──────────────▶ structural copy
//! ```
//!
//! Compress at 100 % never rasterizes; only the save-time cleanup runs.
//! The output keeps the input's page count and order.

use crate::config::{ScaleFactor, TranscodeConfig, TranscodeMode};
use crate::error::{PageError, PixelPaperError};
use crate::output::{PageAction, PageOutcome};
use crate::pipeline::engine::{PageDocument, SaveOptions};
use tracing::{debug, info, warn};

/// Serialized output plus what happened to each page.
#[derive(Debug)]
pub struct TranscodeOutput {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageOutcome>,
}

/// Save options the policy requests for `mode`.
pub fn save_options_for(mode: TranscodeMode) -> SaveOptions {
    SaveOptions {
        compact: true,
        structural_cleanup: mode == TranscodeMode::Compress,
    }
}

/// Transcode every page of `input` into `output`, then serialize `output`.
///
/// `output` is expected to start empty. Any page failure aborts the call
/// unless `config.skip_failed_pages` is set, in which case whatever the
/// failed page left in `output` is removed again.
pub fn transcode_document<D: PageDocument>(
    input: &D,
    output: &mut D,
    scale: ScaleFactor,
    mode: TranscodeMode,
    config: &TranscodeConfig,
) -> Result<TranscodeOutput, PixelPaperError> {
    let total_pages = input.page_count();
    info!(
        "Transcoding {} pages ({}, scale {:.2})",
        total_pages,
        mode,
        scale.get()
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_transcode_start(total_pages);
    }

    let mut pages = Vec::with_capacity(total_pages);

    for index in 0..total_pages {
        let page_num = index + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, total_pages);
        }

        let kept = output.page_count();
        match transcode_page(input, output, index, scale, mode) {
            Ok(outcome) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, total_pages, outcome.action);
                }
                pages.push(outcome);
            }
            Err(e) if config.skip_failed_pages => {
                warn!("Skipping page {}: {}", page_num, e);
                output.truncate(kept)?;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, total_pages, &e.to_string());
                }
                pages.push(PageOutcome {
                    page_num,
                    action: PageAction::Skipped,
                    width: 0.0,
                    height: 0.0,
                    error: Some(PageError::from_fatal(page_num, &e)),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let rasterized = count(&pages, PageAction::Rasterized);
    if let Some(ref cb) = config.progress_callback {
        cb.on_transcode_complete(total_pages, rasterized);
    }

    if total_pages > 0 && count(&pages, PageAction::Skipped) == total_pages {
        let first_error = pages
            .iter()
            .find_map(|p| p.error.as_ref())
            .map(|e| e.to_string())
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(PixelPaperError::AllPagesFailed {
            total: total_pages,
            first_error,
        });
    }

    let save_options = save_options_for(mode);
    let bytes = output.save(save_options)?;
    info!(
        "Transcoded {} pages: {} copied, {} rasterized → {} bytes",
        total_pages,
        count(&pages, PageAction::Copied),
        rasterized,
        bytes.len()
    );

    Ok(TranscodeOutput { bytes, pages })
}

/// Apply the policy to one page.
fn transcode_page<D: PageDocument>(
    input: &D,
    output: &mut D,
    index: usize,
    scale: ScaleFactor,
    mode: TranscodeMode,
) -> Result<PageOutcome, PixelPaperError> {
    let page_num = index + 1;
    let extent = input.page_extent(index)?;

    let rasterize = match mode {
        TranscodeMode::Resize => true,
        TranscodeMode::Compress => !scale.is_identity() && input.page_has_images(index)?,
    };

    if !rasterize {
        output.copy_page_from(input, index)?;
        debug!("Page {}: copied ({} x {} pt)", page_num, extent.width, extent.height);
        return Ok(PageOutcome {
            page_num,
            action: PageAction::Copied,
            width: extent.width,
            height: extent.height,
            error: None,
        });
    }

    let target = extent.scaled(scale);
    let size = target.pixel_size();
    let image = input.render_page(index, size)?;
    output.push_image_page(target, &image)?;
    debug!(
        "Page {}: rasterized {}x{} px onto {} x {} pt",
        page_num, size.width, size.height, target.width, target.height
    );

    Ok(PageOutcome {
        page_num,
        action: PageAction::Rasterized,
        width: target.width,
        height: target.height,
        error: None,
    })
}

fn count(pages: &[PageOutcome], action: PageAction) -> usize {
    pages.iter().filter(|p| p.action == action).count()
}
