//! Concatenate PDF documents with lopdf.
//!
//! The first document is the base. Every following document is renumbered
//! past the base's highest object id and its objects are moved in. A new
//! page-tree root then takes each input's old root as a kid, so every page
//! keeps the attributes it inherited in its own document and none it never
//! had. Whatever the donors kept besides their page trees (their catalogs)
//! is left unreferenced and dropped by the final compaction pass.

use crate::error::PixelPaperError;
use crate::pipeline::compact;
use crate::pipeline::engine::SaveOptions;
use lopdf::{dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A merged, compacted, serialized document.
#[derive(Debug)]
pub struct MergedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Merge serialized PDFs in order. The result is compacted.
///
/// Inputs are named `<input N>` in errors.
pub fn merge_pdf_bytes(inputs: &[Vec<u8>]) -> Result<Vec<u8>, PixelPaperError> {
    let documents = inputs
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            let origin = PathBuf::from(format!("<input {}>", i + 1));
            match Document::load_mem(bytes) {
                Ok(doc) => Ok((origin, doc)),
                Err(e) => Err(PixelPaperError::DocumentOpen {
                    path: origin,
                    detail: e.to_string(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(merge_pdf_documents(documents)?.bytes)
}

/// Merge loaded documents, compact the result and serialize it.
///
/// Each document is paired with the path it came from, for error messages.
pub fn merge_pdf_documents(
    documents: Vec<(PathBuf, Document)>,
) -> Result<MergedPdf, PixelPaperError> {
    let mut merged = merge_documents(documents)?;
    compact::compact_document(
        &mut merged,
        SaveOptions {
            compact: true,
            structural_cleanup: false,
        },
    );
    let page_count = merged.get_pages().len();
    let bytes = compact::save_document(&mut merged)?;
    Ok(MergedPdf { bytes, page_count })
}

/// Append the pages of every document to the first one.
///
/// Zero documents is [`PixelPaperError::NoInputs`]; a single document is
/// returned as is. An input without a usable page tree is
/// [`PixelPaperError::DocumentOpen`] naming its path.
pub fn merge_documents(documents: Vec<(PathBuf, Document)>) -> Result<Document, PixelPaperError> {
    let mut documents = documents.into_iter();
    let (base_origin, mut base) = documents.next().ok_or(PixelPaperError::NoInputs)?;
    let rest: Vec<_> = documents.collect();
    if rest.is_empty() {
        return Ok(base);
    }

    let mut subtrees = vec![(pages_root_id(&base, &base_origin)?, base_origin)];
    let mut page_count = base.get_pages().len();

    for (origin, mut add) in rest {
        pages_root_id(&add, &origin)?;
        add.renumber_objects_with(base.max_id + 1);
        let add_root = pages_root_id(&add, &origin)?;
        let add_pages = add.get_pages().len();
        debug!("Appending {} ({} pages)", origin.display(), add_pages);

        page_count += add_pages;
        base.max_id = add.max_id;
        base.objects.extend(add.objects);
        subtrees.push((add_root, origin));
    }

    let root_id = base.new_object_id();
    for (subtree_id, origin) in &subtrees {
        base.get_object_mut(*subtree_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| malformed(origin, "page tree root", e))?
            .set("Parent", root_id);
    }
    let kids: Vec<Object> = subtrees
        .iter()
        .map(|(id, _)| Object::Reference(*id))
        .collect();
    base.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );

    let (_, base_origin) = &subtrees[0];
    base.catalog_mut()
        .map_err(|e| malformed(base_origin, "catalog", e))?
        .set("Pages", root_id);

    base.renumber_objects();
    Ok(base)
}

fn pages_root_id(doc: &Document, origin: &Path) -> Result<ObjectId, PixelPaperError> {
    doc.catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|e| malformed(origin, "catalog", e))
}

fn malformed(origin: &Path, what: &str, e: lopdf::Error) -> PixelPaperError {
    PixelPaperError::DocumentOpen {
        path: origin.to_path_buf(),
        detail: format!("malformed {}: {}", what, e),
    }
}
