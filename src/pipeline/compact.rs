//! Save-time cleanup of a serialized PDF.
//!
//! Rebuilding a document page by page leaves objects behind that nothing
//! references any more (source resources of rasterized pages, the donor
//! catalogs of merged documents). lopdf re-reads the bytes, drops them and
//! writes the document back out.

use crate::error::PixelPaperError;
use crate::pipeline::engine::SaveOptions;
use lopdf::Document;
use tracing::debug;

/// Apply `options` to a serialized PDF.
///
/// With both options off the input is returned unchanged.
pub fn compact_pdf(bytes: &[u8], options: SaveOptions) -> Result<Vec<u8>, PixelPaperError> {
    if !options.compact && !options.structural_cleanup {
        return Ok(bytes.to_vec());
    }

    let mut doc = Document::load_mem(bytes).map_err(|e| PixelPaperError::PdfWrite {
        detail: format!("could not re-read output for compaction: {}", e),
    })?;
    compact_document(&mut doc, options);
    save_document(&mut doc)
}

/// In-place version of [`compact_pdf`] for documents already loaded in lopdf.
pub fn compact_document(doc: &mut Document, options: SaveOptions) {
    let before = doc.objects.len();

    if options.compact {
        let pruned = doc.prune_objects();
        debug!("Pruned {} unreferenced objects", pruned.len());
    }

    if options.structural_cleanup {
        let emptied = doc.delete_zero_length_streams();
        debug!("Removed {} zero-length streams", emptied.len());
        doc.renumber_objects();
    }

    if options.compact {
        doc.compress();
    }

    debug!("Compaction: {} → {} objects", before, doc.objects.len());
}

/// Serialize a lopdf document to bytes.
pub fn save_document(doc: &mut Document) -> Result<Vec<u8>, PixelPaperError> {
    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(|e| PixelPaperError::PdfWrite {
        detail: format!("{}", e),
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object, Stream};

    /// One page plus an orphaned stream nothing points at.
    fn document_with_orphan() -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            b"0 0 m 100 100 l S".to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 300.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc.add_object(Stream::new(dictionary! {}, vec![b'x'; 4096]));
        doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        doc
    }

    fn to_bytes(mut doc: Document) -> Vec<u8> {
        save_document(&mut doc).unwrap()
    }

    #[test]
    fn compaction_drops_unreferenced_objects() {
        let raw = to_bytes(document_with_orphan());
        let before = Document::load_mem(&raw).unwrap().objects.len();

        let compacted = compact_pdf(
            &raw,
            SaveOptions {
                compact: true,
                structural_cleanup: false,
            },
        )
        .unwrap();
        let doc = Document::load_mem(&compacted).unwrap();

        assert!(doc.objects.len() < before, "{} !< {}", doc.objects.len(), before);
        assert_eq!(doc.get_pages().len(), 1);
        assert!(compacted.len() < raw.len());
    }

    #[test]
    fn structural_cleanup_renumbers_densely() {
        let raw = to_bytes(document_with_orphan());
        let cleaned = compact_pdf(
            &raw,
            SaveOptions {
                compact: true,
                structural_cleanup: true,
            },
        )
        .unwrap();
        let doc = Document::load_mem(&cleaned).unwrap();

        let ids: Vec<u32> = doc.objects.keys().map(|(id, _)| *id).collect();
        let expected: Vec<u32> = (1..=ids.len() as u32).collect();
        assert_eq!(ids, expected);
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn no_options_is_passthrough() {
        let raw = to_bytes(document_with_orphan());
        let same = compact_pdf(&raw, SaveOptions::default()).unwrap();
        assert_eq!(same, raw);
    }

    #[test]
    fn garbage_input_is_a_write_error() {
        let err = compact_pdf(
            b"not a pdf at all",
            SaveOptions {
                compact: true,
                structural_cleanup: false,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PixelPaperError::PdfWrite { .. }));
    }
}
