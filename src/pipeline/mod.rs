//! Pipeline stages behind the entry points in [`crate::convert`].
//!
//! Each submodule implements one step, and only [`pdfium`] knows about the
//! rendering engine.
//!
//! ## Data Flow
//!
//! ```text
//!                 ┌─ transcode (policy over PageDocument, pdfium) ─┐
//! input ──────────┼─ merge     (lopdf)                             ├──▶ compact ──▶ write
//! (validate+read) └─ raster    (image)  ───────────────────────────┴─────────────▶ write
//! ```
//!
//! 1. [`input`]     read a path into memory, checking the `%PDF` magic
//! 2. [`engine`]    the page-level capability the policy is written against
//! 3. [`transcode`] per-page copy-or-rasterize policy for compress and resize
//! 4. [`pdfium`]    pdfium binding and the [`engine::PageDocument`] impl
//! 5. [`merge`]     page-tree concatenation of several PDFs
//! 6. [`compact`]   drop unreferenced objects and deflate streams on save
//! 7. [`raster`]    decode, scale or re-encode raster images
//! 8. [`write`]     temp-file-and-rename output

pub mod compact;
pub mod engine;
pub mod input;
pub mod merge;
pub mod pdfium;
pub mod raster;
pub mod transcode;
pub mod write;
