//! End-to-end integration tests for pixelpaper.
//!
//! Fixtures are built in memory with lopdf and image and written to a
//! scratch directory. Merge and the image operations need nothing else and
//! always run. Compress and resize need a pdfium library and are gated
//! behind the `E2E_ENABLED` environment variable.
//!
//! Run the gated tests with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pixelpaper::{
    compress_image, compress_pdf, merge_pdf_bytes, merge_pdfs, resize_image, resize_pdf,
    transcode_pdf_bytes, PageAction, PixelPaperError, Quality, ScalePercent, TranscodeConfig,
    TranscodeMode,
};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test if E2E_ENABLED is not set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run pdfium tests");
            return;
        }
    }};
}

#[derive(Clone, Copy)]
enum FixturePage {
    /// A line of Helvetica text and nothing else.
    Text,
    /// A full-page 2×2 RGB image XObject.
    Image,
    /// The same image, drawn from inside a form XObject.
    FormImage,
}

/// A US-Letter PDF with one page per entry. Each page's `Rotate` is 0 and
/// its index is written to a custom `PageTag` key so order can be checked
/// after a merge.
fn fixture_pdf(pages: &[FixturePage], first_tag: i64) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 0,
        ],
    ));

    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
        },
        b"q 612 0 0 792 0 0 cm /Im1 Do Q".to_vec(),
    ));

    let mut kids: Vec<Object> = Vec::new();
    for (i, page) in pages.iter().enumerate() {
        let (content, resources) = match page {
            FixturePage::Text => (
                b"BT /F1 24 Tf 72 700 Td (Hello from pixelpaper) Tj ET".to_vec(),
                dictionary! { "Font" => dictionary! { "F1" => font_id } },
            ),
            FixturePage::Image => (
                b"q 612 0 0 792 0 0 cm /Im1 Do Q".to_vec(),
                dictionary! { "XObject" => dictionary! { "Im1" => image_id } },
            ),
            FixturePage::FormImage => (
                b"/Fm0 Do".to_vec(),
                dictionary! { "XObject" => dictionary! { "Fm0" => form_id } },
            ),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
            "PageTag" => first_tag + i as i64,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn page_tags(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|id| {
            doc.get_dictionary(*id)
                .unwrap()
                .get(b"PageTag")
                .unwrap()
                .as_i64()
                .unwrap()
        })
        .collect()
}

/// MediaBox width and height of a page, following inheritance.
fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let mut node = doc.get_dictionary(page_id).unwrap();
    loop {
        if let Ok(mb) = node.get(b"MediaBox") {
            let mb = mb.as_array().unwrap();
            let v: Vec<f32> = mb.iter().map(|o| o.as_float().unwrap()).collect();
            return (v[2] - v[0], v[3] - v[1]);
        }
        let parent = node.get(b"Parent").unwrap().as_reference().unwrap();
        node = doc.get_dictionary(parent).unwrap();
    }
}

fn page_sizes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|id| page_size(&doc, *id))
        .collect()
}

fn assert_size(actual: (f32, f32), expected: (f32, f32), context: &str) {
    assert!(
        (actual.0 - expected.0).abs() < 0.5 && (actual.1 - expected.1).abs() < 0.5,
        "[{context}] expected {expected:?}, got {actual:?}"
    );
}

fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn pct(p: u32) -> ScalePercent {
    ScalePercent::new(p).unwrap()
}

// ── Merge (no pdfium needed) ─────────────────────────────────────────────────

#[test]
fn test_merge_files_in_order() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(
        dir.path(),
        "a.pdf",
        &fixture_pdf(&[FixturePage::Text, FixturePage::Image], 1),
    );
    let b = write_fixture(
        dir.path(),
        "b.pdf",
        &fixture_pdf(&[FixturePage::Image, FixturePage::Text, FixturePage::Text], 3),
    );
    let out = dir.path().join("merged.pdf");

    let stats = merge_pdfs(&[a, b], &out).unwrap();

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.total_pages, 5);
    let merged = Document::load_mem(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(page_tags(&merged), vec![1, 2, 3, 4, 5]);
    assert_eq!(stats.output_bytes, std::fs::metadata(&out).unwrap().len());
}

#[test]
fn test_merge_same_file_twice() {
    let dir = TempDir::new().unwrap();
    let a = write_fixture(dir.path(), "a.pdf", &fixture_pdf(&[FixturePage::Text], 7));
    let out = dir.path().join("twice.pdf");

    let stats = merge_pdfs(&[a.clone(), a], &out).unwrap();

    assert_eq!(stats.total_pages, 2);
    let merged = Document::load_mem(&std::fs::read(&out).unwrap()).unwrap();
    assert_eq!(page_tags(&merged), vec![7, 7]);
}

#[test]
fn test_merge_bytes() {
    let inputs = vec![
        fixture_pdf(&[FixturePage::Text], 1),
        fixture_pdf(&[FixturePage::Image, FixturePage::Image], 2),
    ];
    let bytes = merge_pdf_bytes(&inputs).unwrap();
    let merged = Document::load_mem(&bytes).unwrap();
    assert_eq!(page_tags(&merged), vec![1, 2, 3]);
    for size in page_sizes(&bytes) {
        assert_size(size, (612.0, 792.0), "merged page");
    }
}

#[test]
fn test_merge_nothing() {
    let dir = TempDir::new().unwrap();
    let err = merge_pdfs(&[], &dir.path().join("out.pdf")).unwrap_err();
    assert!(matches!(err, PixelPaperError::NoInputs));
}

#[test]
fn test_merge_rejects_non_pdf_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let good = write_fixture(dir.path(), "good.pdf", &fixture_pdf(&[FixturePage::Text], 1));
    let bad = write_fixture(dir.path(), "bad.pdf", &png_fixture(4, 4));
    let out = dir.path().join("out.pdf");

    let err = merge_pdfs(&[good, bad.clone()], &out).unwrap_err();

    match err {
        PixelPaperError::NotAPdf { path, .. } => assert_eq!(path, bad),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_merge_missing_input() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.pdf");
    let err = merge_pdfs(&[missing], &dir.path().join("out.pdf")).unwrap_err();
    assert!(matches!(err, PixelPaperError::FileNotFound { .. }));
}

// ── Images (no pdfium needed) ────────────────────────────────────────────────

#[test]
fn test_resize_image_file() {
    let dir = TempDir::new().unwrap();
    let src = write_fixture(dir.path(), "wide.png", &png_fixture(200, 100));
    let dst = dir.path().join("small.png");

    let stats = resize_image(&src, &dst, pct(50), &TranscodeConfig::default()).unwrap();

    assert_eq!((stats.output_width, stats.output_height), (100, 50));
    assert_eq!(stats.format, "png");
    assert_eq!(stats.destination, dst);
    let written = image::open(&dst).unwrap();
    assert_eq!((written.width(), written.height()), (100, 50));
}

#[test]
fn test_compress_image_coerces_extension() {
    let dir = TempDir::new().unwrap();
    let src = write_fixture(dir.path(), "photo.png", &png_fixture(64, 64));
    let requested = dir.path().join("photo-small.png");

    let stats = compress_image(&src, &requested, Quality::new(60).unwrap()).unwrap();

    let expected = dir.path().join("photo-small.jpg");
    assert_eq!(stats.destination, expected);
    assert!(expected.exists());
    assert!(!requested.exists());
    assert_eq!(
        image::guess_format(&std::fs::read(&expected).unwrap()).unwrap(),
        ImageFormat::Jpeg
    );
}

#[test]
fn test_compress_image_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let src = write_fixture(dir.path(), "photo.png", &png_fixture(80, 60));
    let q = Quality::new(35).unwrap();

    let first = compress_image(&src, &dir.path().join("one.jpg"), q).unwrap();
    let second = compress_image(&src, &dir.path().join("two.jpeg"), q).unwrap();

    assert_eq!(
        std::fs::read(&first.destination).unwrap(),
        std::fs::read(&second.destination).unwrap()
    );
}

#[test]
fn test_compress_image_rejects_non_image() {
    let dir = TempDir::new().unwrap();
    let src = write_fixture(dir.path(), "notes.png", b"just some text");
    let err = compress_image(&src, &dir.path().join("out.jpg"), Quality::new(50).unwrap())
        .unwrap_err();
    assert!(matches!(err, PixelPaperError::UnsupportedImageFormat { .. }));
}

// ── Input validation before pdfium is touched ────────────────────────────────

#[test]
fn test_compress_pdf_missing_input() {
    let dir = TempDir::new().unwrap();
    let err = compress_pdf(
        &dir.path().join("missing.pdf"),
        &dir.path().join("out.pdf"),
        pct(50),
        &TranscodeConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PixelPaperError::FileNotFound { .. }));
}

#[test]
fn test_resize_pdf_rejects_non_pdf() {
    let dir = TempDir::new().unwrap();
    let src = write_fixture(dir.path(), "image.pdf", &png_fixture(8, 8));
    let err = resize_pdf(
        &src,
        &dir.path().join("out.pdf"),
        pct(50),
        &TranscodeConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PixelPaperError::NotAPdf { .. }));
}

#[test]
fn test_percent_and_quality_bounds() {
    assert!(ScalePercent::new(0).is_err());
    assert!(ScalePercent::new(150).is_err());
    assert!(Quality::new(0).is_err());
    assert!(Quality::new(101).is_err());
}

// ── Compress / resize (pdfium) ───────────────────────────────────────────────

#[test]
fn test_compress_full_scale_copies_every_page() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let src = write_fixture(
        dir.path(),
        "mixed.pdf",
        &fixture_pdf(&[FixturePage::Text, FixturePage::Image, FixturePage::Text], 1),
    );
    let out = dir.path().join("out.pdf");

    let stats = compress_pdf(&src, &out, ScalePercent::FULL, &TranscodeConfig::default()).unwrap();

    assert_eq!(stats.total_pages, 3);
    assert_eq!(stats.copied_pages, 3);
    assert_eq!(stats.rasterized_pages, 0);
    for size in page_sizes(&std::fs::read(&out).unwrap()) {
        assert_size(size, (612.0, 792.0), "compress 100");
    }
}

#[test]
fn test_compress_half_scale_only_touches_image_pages() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let src = write_fixture(
        dir.path(),
        "mixed.pdf",
        &fixture_pdf(&[FixturePage::Text, FixturePage::Image, FixturePage::Text], 1),
    );
    let out = dir.path().join("out.pdf");

    let stats = compress_pdf(&src, &out, pct(50), &TranscodeConfig::default()).unwrap();

    let actions: Vec<PageAction> = stats.pages.iter().map(|p| p.action).collect();
    assert_eq!(
        actions,
        vec![PageAction::Copied, PageAction::Rasterized, PageAction::Copied]
    );
    let sizes = page_sizes(&std::fs::read(&out).unwrap());
    assert_eq!(sizes.len(), 3);
    assert_size(sizes[0], (612.0, 792.0), "text page");
    assert_size(sizes[1], (306.0, 396.0), "image page");
    assert_size(sizes[2], (612.0, 792.0), "text page");
}

#[test]
fn test_compress_finds_images_inside_form_xobjects() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let src = write_fixture(
        dir.path(),
        "form.pdf",
        &fixture_pdf(&[FixturePage::Text, FixturePage::FormImage], 1),
    );
    let out = dir.path().join("out.pdf");

    let stats = compress_pdf(&src, &out, pct(50), &TranscodeConfig::default()).unwrap();

    let actions: Vec<PageAction> = stats.pages.iter().map(|p| p.action).collect();
    assert_eq!(actions, vec![PageAction::Copied, PageAction::Rasterized]);
    let sizes = page_sizes(&std::fs::read(&out).unwrap());
    assert_size(sizes[0], (612.0, 792.0), "text page");
    assert_size(sizes[1], (306.0, 396.0), "form image page");
}

#[test]
fn test_resize_scales_every_page() {
    e2e_skip_unless_ready!();
    let dir = TempDir::new().unwrap();
    let src = write_fixture(
        dir.path(),
        "mixed.pdf",
        &fixture_pdf(&[FixturePage::Text, FixturePage::Image], 1),
    );
    let out = dir.path().join("out.pdf");

    let stats = resize_pdf(&src, &out, pct(25), &TranscodeConfig::default()).unwrap();

    assert_eq!(stats.rasterized_pages, 2);
    for size in page_sizes(&std::fs::read(&out).unwrap()) {
        assert_size(size, (153.0, 198.0), "resize 25");
    }
}

#[test]
fn test_transcode_bytes_in_memory() {
    e2e_skip_unless_ready!();
    let input = fixture_pdf(&[FixturePage::Image], 1);

    let out = transcode_pdf_bytes(
        &input,
        TranscodeMode::Resize,
        pct(50),
        &TranscodeConfig::default(),
    )
    .unwrap();

    assert_eq!(out.pages.len(), 1);
    assert!(out.bytes.starts_with(b"%PDF"));
    assert_size(page_sizes(&out.bytes)[0], (306.0, 396.0), "bytes resize");
}
