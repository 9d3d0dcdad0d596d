//! Configuration and parameter types.
//!
//! Numeric parameters are validated once, at construction: a [`ScalePercent`]
//! or [`Quality`] that exists is always in range, so the transcode policy
//! never re-checks or clamps them.
//!
//! Everything that is not a per-call parameter lives in [`TranscodeConfig`],
//! built via its [`TranscodeConfigBuilder`].

use crate::error::PixelPaperError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A scale percentage in `1..=100`.
///
/// `100` means "keep the original size".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ScalePercent(u8);

impl ScalePercent {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    /// The identity scale (100 %).
    pub const FULL: ScalePercent = ScalePercent(100);

    /// Validate a user-supplied percentage.
    pub fn new(value: u32) -> Result<Self, PixelPaperError> {
        if value < Self::MIN as u32 || value > Self::MAX as u32 {
            return Err(PixelPaperError::out_of_range(
                "scale percent",
                value as i64,
                Self::MIN as i64,
                Self::MAX as i64,
            ));
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// The factor this percentage applies to each axis.
    pub fn factor(self) -> ScaleFactor {
        ScaleFactor(self.0 as f32 / 100.0)
    }
}

impl TryFrom<u32> for ScalePercent {
    type Error = PixelPaperError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScalePercent> for u32 {
    fn from(p: ScalePercent) -> Self {
        p.0 as u32
    }
}

impl fmt::Display for ScalePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A uniform scale factor in `(0, 1]`, always derived from a [`ScalePercent`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ScaleFactor(f32);

impl ScaleFactor {
    pub fn get(self) -> f32 {
        self.0
    }

    /// `true` for 100 %.
    pub fn is_identity(self) -> bool {
        self.0 >= 1.0
    }
}

/// JPEG quality in `1..=100` (1 = smallest file, 100 = best quality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;

    /// Validate a user-supplied quality level.
    pub fn new(value: u32) -> Result<Self, PixelPaperError> {
        if value < Self::MIN as u32 || value > Self::MAX as u32 {
            return Err(PixelPaperError::out_of_range(
                "quality",
                value as i64,
                Self::MIN as i64,
                Self::MAX as i64,
            ));
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Quality {
    type Error = PixelPaperError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for u32 {
    fn from(q: Quality) -> Self {
        q.0 as u32
    }
}

/// How the transcode policy treats each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscodeMode {
    /// Rasterize every page at the target scale.
    Resize,
    /// Copy image-free pages untouched; flatten image-bearing pages to one
    /// scaled raster. At 100 % nothing is rasterized.
    Compress,
}

impl fmt::Display for TranscodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscodeMode::Resize => f.write_str("resize"),
            TranscodeMode::Compress => f.write_str("compress"),
        }
    }
}

/// Options shared by every operation.
///
/// Built via [`TranscodeConfig::builder()`] or [`TranscodeConfig::default()`].
///
/// # Example
/// ```rust
/// use pixelpaper::TranscodeConfig;
///
/// let config = TranscodeConfig::builder()
///     .skip_failed_pages(true)
///     .resize_jpeg_quality(90)
///     .build()
///     .unwrap();
/// assert!(config.skip_failed_pages);
/// ```
#[derive(Clone)]
pub struct TranscodeConfig {
    /// PDF user password for encrypted inputs.
    pub password: Option<String>,

    /// Drop pages that fail to render instead of aborting. Default: false.
    ///
    /// With the default, one bad page fails the whole call and nothing is
    /// written. When enabled, the page is left out of the output and reported
    /// in [`crate::output::PageOutcome::error`].
    pub skip_failed_pages: bool,

    /// Explicit pdfium library file or directory. Falls back to
    /// `PDFIUM_LIB_PATH`, the working directory, then the system library.
    pub pdfium_library: Option<PathBuf>,

    /// JPEG quality used when a resized image is re-encoded as JPEG. Default: 95.
    pub resize_jpeg_quality: u8,

    /// Receives per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            password: None,
            skip_failed_pages: false,
            pdfium_library: None,
            resize_jpeg_quality: 95,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for TranscodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscodeConfig")
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("skip_failed_pages", &self.skip_failed_pages)
            .field("pdfium_library", &self.pdfium_library)
            .field("resize_jpeg_quality", &self.resize_jpeg_quality)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn TranscodeProgressCallback>"),
            )
            .finish()
    }
}

impl TranscodeConfig {
    /// Create a new builder for `TranscodeConfig`.
    pub fn builder() -> TranscodeConfigBuilder {
        TranscodeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`TranscodeConfig`].
#[derive(Debug)]
pub struct TranscodeConfigBuilder {
    config: TranscodeConfig,
}

impl TranscodeConfigBuilder {
    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn skip_failed_pages(mut self, v: bool) -> Self {
        self.config.skip_failed_pages = v;
        self
    }

    pub fn pdfium_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library = Some(path.into());
        self
    }

    pub fn resize_jpeg_quality(mut self, q: u8) -> Self {
        self.config.resize_jpeg_quality = q;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranscodeConfig, PixelPaperError> {
        let c = &self.config;
        if Quality::new(c.resize_jpeg_quality as u32).is_err() {
            return Err(PixelPaperError::InvalidConfig(format!(
                "resize JPEG quality must be 1–100, got {}",
                c.resize_jpeg_quality
            )));
        }
        if let Some(ref p) = c.password {
            if p.is_empty() {
                return Err(PixelPaperError::InvalidConfig(
                    "password must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}
