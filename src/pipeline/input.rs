//! Input loading: read a user-supplied path into memory, with validation.
//!
//! Every operation works on an in-memory buffer, so inputs are read whole.
//! PDFs are checked for the `%PDF` magic before any engine sees them so a
//! mislabelled file produces a meaningful error instead of an engine
//! failure deep in the pipeline.

use crate::error::PixelPaperError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read a PDF, validating existence, permissions and the `%PDF` magic.
pub fn read_pdf(path: &Path) -> Result<Vec<u8>, PixelPaperError> {
    let bytes = read_file(path)?;

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(PixelPaperError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Read PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Read an image file. The format is sniffed later by the decoder.
pub fn read_image(path: &Path) -> Result<Vec<u8>, PixelPaperError> {
    let bytes = read_file(path)?;
    debug!("Read image: {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

fn read_file(path: &Path) -> Result<Vec<u8>, PixelPaperError> {
    if !path.is_file() {
        return Err(PixelPaperError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => PixelPaperError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PixelPaperError::FileNotFound {
            path: path.to_path_buf(),
        },
    })
}
