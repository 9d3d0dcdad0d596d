//! Atomic output writes.
//!
//! Bytes go to a temp file in the destination directory which is then
//! renamed over the destination. A failed write leaves the destination
//! untouched and the temp file is removed when it is dropped.

use crate::error::PixelPaperError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `bytes` to `path`, replacing any existing file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PixelPaperError> {
    let failed = |source: std::io::Error| PixelPaperError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(failed)?;
    tmp.write_all(bytes).map_err(failed)?;
    tmp.as_file().sync_all().map_err(failed)?;
    tmp.persist(path).map_err(|e| failed(e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.pdf");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn missing_directory_fails_without_side_effects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("out.pdf");

        let err = write_atomic(&path, b"data").unwrap_err();

        assert!(matches!(err, PixelPaperError::OutputWriteFailed { .. }));
        assert!(!path.exists());
    }
}
