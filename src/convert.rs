//! Entry points: the five user-facing operations.
//!
//! The path-based functions read the input, run the operation in memory and
//! write the result atomically, so a failed call never leaves a partial
//! output behind. The `*_bytes` variants skip the filesystem entirely.

use crate::config::{Quality, ScalePercent, TranscodeConfig, TranscodeMode};
use crate::error::PixelPaperError;
use crate::output::{ImageStats, MergeStats, PageAction, TranscodeStats};
use crate::pipeline::pdfium::{bind_pdfium, PdfiumDocument};
use crate::pipeline::transcode::{transcode_document, TranscodeOutput};
use crate::pipeline::{input, merge, raster, write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Concatenate PDFs in the given order into `output`.
///
/// # Errors
/// [`PixelPaperError::NoInputs`] for an empty list; input validation errors
/// name the offending file.
pub fn merge_pdfs(inputs: &[PathBuf], output: &Path) -> Result<MergeStats, PixelPaperError> {
    let start = Instant::now();
    if inputs.is_empty() {
        return Err(PixelPaperError::NoInputs);
    }
    info!("Merging {} PDFs into {}", inputs.len(), output.display());

    let mut buffers = Vec::with_capacity(inputs.len());
    for path in inputs {
        buffers.push(input::read_pdf(path)?);
    }
    let input_bytes = buffers.iter().map(|b| b.len() as u64).sum();

    let documents = buffers
        .iter()
        .zip(inputs)
        .map(|(bytes, path)| match lopdf::Document::load_mem(bytes) {
            Ok(doc) => Ok((path.clone(), doc)),
            Err(e) => Err(PixelPaperError::DocumentOpen {
                path: path.clone(),
                detail: e.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let merged = merge::merge_pdf_documents(documents)?;
    write::write_atomic(output, &merged.bytes)?;

    let stats = MergeStats {
        documents: inputs.len(),
        total_pages: merged.page_count,
        input_bytes,
        output_bytes: merged.bytes.len() as u64,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Merge complete: {} documents, {} pages, {}ms",
        stats.documents, stats.total_pages, stats.duration_ms
    );
    Ok(stats)
}

/// Compress a PDF: pages carrying raster images are re-rendered at
/// `percent`, every other page is copied as is.
///
/// At 100 % no page is rendered and only the save-time cleanup applies.
pub fn compress_pdf(
    input_path: &Path,
    output_path: &Path,
    percent: ScalePercent,
    config: &TranscodeConfig,
) -> Result<TranscodeStats, PixelPaperError> {
    transcode_file(input_path, output_path, TranscodeMode::Compress, percent, config)
}

/// Resize a PDF: every page is rendered to an image page at `percent` of
/// its original size.
pub fn resize_pdf(
    input_path: &Path,
    output_path: &Path,
    percent: ScalePercent,
    config: &TranscodeConfig,
) -> Result<TranscodeStats, PixelPaperError> {
    transcode_file(input_path, output_path, TranscodeMode::Resize, percent, config)
}

/// In-memory compress or resize of a PDF.
///
/// # Example
/// ```rust,no_run
/// use pixelpaper::{transcode_pdf_bytes, ScalePercent, TranscodeConfig, TranscodeMode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("scan.pdf")?;
/// let out = transcode_pdf_bytes(
///     &bytes,
///     TranscodeMode::Compress,
///     ScalePercent::new(50)?,
///     &TranscodeConfig::default(),
/// )?;
/// std::fs::write("scan-small.pdf", &out.bytes)?;
/// # Ok(())
/// # }
/// ```
pub fn transcode_pdf_bytes(
    bytes: &[u8],
    mode: TranscodeMode,
    percent: ScalePercent,
    config: &TranscodeConfig,
) -> Result<TranscodeOutput, PixelPaperError> {
    transcode_in_memory(bytes, Path::new("<memory>"), mode, percent, config)
}

/// Merge serialized PDFs in order.
pub fn merge_pdf_bytes(inputs: &[Vec<u8>]) -> Result<Vec<u8>, PixelPaperError> {
    merge::merge_pdf_bytes(inputs)
}

/// Scale a raster image by `percent`, keeping its format.
///
/// JPEG output uses `config.resize_jpeg_quality`.
pub fn resize_image(
    input_path: &Path,
    output_path: &Path,
    percent: ScalePercent,
    config: &TranscodeConfig,
) -> Result<ImageStats, PixelPaperError> {
    info!("Resizing image {} to {}", input_path.display(), percent);
    let jpeg_quality = Quality::new(config.resize_jpeg_quality as u32)?;
    let bytes = input::read_image(input_path)?;
    let encoded = raster::resize_image(&bytes, percent, jpeg_quality)?;
    write::write_atomic(output_path, &encoded.bytes)?;

    Ok(image_stats(&bytes, &encoded, output_path.to_path_buf()))
}

/// Re-encode a raster image as JPEG at `quality`.
///
/// The output is always a JPEG: if `output_path` does not end in `.jpg` or
/// `.jpeg` the extension is replaced with `.jpg`. The path actually written
/// is returned in [`ImageStats::destination`].
pub fn compress_image(
    input_path: &Path,
    output_path: &Path,
    quality: Quality,
) -> Result<ImageStats, PixelPaperError> {
    let destination = raster::jpeg_destination(output_path);
    info!(
        "Compressing image {} at quality {} → {}",
        input_path.display(),
        quality.get(),
        destination.display()
    );
    let bytes = input::read_image(input_path)?;
    let encoded = raster::compress_image(&bytes, quality)?;
    write::write_atomic(&destination, &encoded.bytes)?;

    Ok(image_stats(&bytes, &encoded, destination))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn transcode_file(
    input_path: &Path,
    output_path: &Path,
    mode: TranscodeMode,
    percent: ScalePercent,
    config: &TranscodeConfig,
) -> Result<TranscodeStats, PixelPaperError> {
    let start = Instant::now();
    info!(
        "Starting {}: {} → {} at {}",
        mode,
        input_path.display(),
        output_path.display(),
        percent
    );

    let bytes = input::read_pdf(input_path)?;
    let output = transcode_in_memory(&bytes, input_path, mode, percent, config)?;
    write::write_atomic(output_path, &output.bytes)?;

    let count = |action: PageAction| output.pages.iter().filter(|p| p.action == action).count();
    let stats = TranscodeStats {
        mode,
        scale_percent: percent.get(),
        total_pages: output.pages.len(),
        copied_pages: count(PageAction::Copied),
        rasterized_pages: count(PageAction::Rasterized),
        skipped_pages: count(PageAction::Skipped),
        input_bytes: bytes.len() as u64,
        output_bytes: output.bytes.len() as u64,
        duration_ms: start.elapsed().as_millis() as u64,
        pages: output.pages,
    };

    info!(
        "{} complete: {} pages ({} rasterized, {} skipped), {}ms",
        mode, stats.total_pages, stats.rasterized_pages, stats.skipped_pages, stats.duration_ms
    );
    Ok(stats)
}

fn transcode_in_memory(
    bytes: &[u8],
    origin: &Path,
    mode: TranscodeMode,
    percent: ScalePercent,
    config: &TranscodeConfig,
) -> Result<TranscodeOutput, PixelPaperError> {
    let pdfium = bind_pdfium(config.pdfium_library.as_deref())?;
    let source = PdfiumDocument::open_bytes(&pdfium, bytes, config.password.as_deref(), origin)?;
    let mut target = PdfiumDocument::create(&pdfium)?;
    transcode_document(&source, &mut target, percent.factor(), mode, config)
}

fn image_stats(input: &[u8], encoded: &raster::EncodedImage, destination: PathBuf) -> ImageStats {
    ImageStats {
        format: raster::format_name(encoded.format),
        input_width: encoded.source_width,
        input_height: encoded.source_height,
        output_width: encoded.width,
        output_height: encoded.height,
        input_bytes: input.len() as u64,
        output_bytes: encoded.bytes.len() as u64,
        destination,
    }
}
