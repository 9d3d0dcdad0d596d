//! Raster image resize and compression.
//!
//! Both operations decode the whole image into memory, transform it, and
//! encode it again. Nothing here touches the filesystem; see
//! [`crate::convert`] for the path-based wrappers.

use crate::config::{Quality, ScalePercent};
use crate::error::PixelPaperError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// An encoded image plus the dimensions before and after the operation.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub source_width: u32,
    pub source_height: u32,
    pub width: u32,
    pub height: u32,
}

/// Scale both axes by `percent`, keeping the container format.
///
/// Each new dimension is `floor(dim * percent / 100)`, never below 1 px.
/// JPEG output is written at `jpeg_quality`.
pub fn resize_image(
    bytes: &[u8],
    percent: ScalePercent,
    jpeg_quality: Quality,
) -> Result<EncodedImage, PixelPaperError> {
    let (img, format) = decode(bytes)?;
    let (width, height) = scaled_dimensions(img.width(), img.height(), percent);
    debug!(
        "Resizing {:?} {}x{} → {}x{}",
        format,
        img.width(),
        img.height(),
        width,
        height
    );

    let resized = img.resize_exact(width, height, FilterType::Triangle);
    let encoded = encode(&resized, format, jpeg_quality)?;

    Ok(EncodedImage {
        bytes: encoded,
        format,
        source_width: img.width(),
        source_height: img.height(),
        width,
        height,
    })
}

/// Re-encode as JPEG at `quality`. Alpha is dropped; dimensions are kept.
pub fn compress_image(bytes: &[u8], quality: Quality) -> Result<EncodedImage, PixelPaperError> {
    let (img, format) = decode(bytes)?;
    debug!("Compressing {:?} {}x{} at quality {}", format, img.width(), img.height(), quality.get());

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let encoded = encode(&rgb, ImageFormat::Jpeg, quality)?;

    Ok(EncodedImage {
        bytes: encoded,
        format: ImageFormat::Jpeg,
        source_width: img.width(),
        source_height: img.height(),
        width: img.width(),
        height: img.height(),
    })
}

/// `path` with its extension replaced by `.jpg`, unless it already ends in
/// `.jpg` or `.jpeg` (any case).
pub fn jpeg_destination(path: &Path) -> PathBuf {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        path.to_path_buf()
    } else {
        path.with_extension("jpg")
    }
}

/// Lower-case short name for a format, as shown in stats.
pub fn format_name(format: ImageFormat) -> String {
    format
        .extensions_str()
        .first()
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| format!("{:?}", format).to_lowercase())
}

fn scaled_dimensions(width: u32, height: u32, percent: ScalePercent) -> (u32, u32) {
    let scale = |dim: u32| ((dim as u64 * percent.get() as u64) / 100).max(1) as u32;
    (scale(width), scale(height))
}

fn decode(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), PixelPaperError> {
    let format = image::guess_format(bytes).map_err(|e| PixelPaperError::UnsupportedImageFormat {
        detail: e.to_string(),
    })?;
    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
        image::ImageError::Unsupported(_) => PixelPaperError::UnsupportedImageFormat {
            detail: e.to_string(),
        },
        other => PixelPaperError::ImageDecode(other),
    })?;
    Ok((img, format))
}

fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    jpeg_quality: Quality,
) -> Result<Vec<u8>, PixelPaperError> {
    let mut buf = Vec::new();

    if format == ImageFormat::Jpeg {
        let rgb = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality.get());
        rgb.write_with_encoder(encoder)
            .map_err(PixelPaperError::ImageEncode)?;
        return Ok(buf);
    }

    let prepared;
    let img = if supports_alpha(format) {
        img
    } else {
        prepared = DynamicImage::ImageRgb8(img.to_rgb8());
        &prepared
    };

    img.write_to(&mut Cursor::new(&mut buf), format)
        .map_err(|e| match e {
            image::ImageError::Unsupported(_) => PixelPaperError::UnsupportedImageFormat {
                detail: e.to_string(),
            },
            other => PixelPaperError::ImageEncode(other),
        })?;
    Ok(buf)
}

fn supports_alpha(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP
    )
}
