//! PDF composition for the TOC synthesizer, built on lopdf.
//!
//! This crate provides:
//! - `LopdfContainer`, the `DocumentContainer` implementation for real PDFs
//! - Page-tree insertion that keeps `/Kids` and `/Count` consistent
//! - Content overlaying (drawing on top of a page's existing content)
//! - Outline (bookmark) reading and writing

mod container;
mod encoding;
mod error;
mod outline;

pub use container::LopdfContainer;
pub use encoding::{decode_text_string, encode_text_string, to_win_ansi};
pub use error::ComposerError;
pub use outline::{read_outline, write_outline};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;

/// Page trees deeper than this are treated as malformed.
pub(crate) const MAX_TREE_DEPTH: usize = 64;

/// Media box used when neither a page nor its ancestors declare one.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Follows a single indirect reference. Dangling references resolve to the
/// reference itself, which callers then reject as the wrong type.
pub(crate) fn deref<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f as f32),
        _ => None,
    }
}

/// Looks up `key` on a page, falling back to its ancestors for inheritable
/// attributes such as `/MediaBox` and `/Resources`.
pub(crate) fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_object(node).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(deref(doc, value));
        }
        node = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

/// The page's media box as `[x0, y0, x1, y1]` with `x0 <= x1` and `y0 <= y1`.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f32; 4] {
    let values: Option<Vec<f32>> = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| obj.as_array().ok())
        .map(|arr| arr.iter().filter_map(|o| number(deref(doc, o))).collect());
    match values.as_deref() {
        Some(&[a, b, c, d]) => [a.min(c), b.min(d), a.max(c), b.max(d)],
        _ => {
            log::warn!("Page {:?} has no usable /MediaBox, assuming US Letter", page_id);
            DEFAULT_MEDIA_BOX
        }
    }
}

fn catalog_pages_id(doc: &Document) -> Result<ObjectId, ComposerError> {
    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let root_dict = doc.get_object(root_id)?.as_dict()?;
    Ok(root_dict.get(b"Pages")?.as_reference()?)
}

fn parent_of(doc: &Document, node: ObjectId) -> Result<ObjectId, ComposerError> {
    let dict = doc.get_object(node)?.as_dict()?;
    dict.get(b"Parent")
        .and_then(Object::as_reference)
        .map_err(|_| ComposerError::Structure(format!("Page {:?} has no /Parent", node)))
}

/// The `/Kids` array of a page-tree node, following an indirect array.
fn kids_mut(doc: &mut Document, node: ObjectId) -> Result<&mut Vec<Object>, ComposerError> {
    let indirect = match doc.get_object(node)?.as_dict()?.get(b"Kids")? {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    let kids = match indirect {
        Some(id) => doc.get_object_mut(id)?.as_array_mut()?,
        None => doc.get_object_mut(node)?.as_dict_mut()?.get_mut(b"Kids")?.as_array_mut()?,
    };
    Ok(kids)
}

/// Adds `delta` to `/Count` on `node` and every ancestor up to the root.
fn bump_counts(doc: &mut Document, node: ObjectId, delta: i64) -> Result<(), ComposerError> {
    let mut visited = HashSet::new();
    let mut current = Some(node);
    while let Some(id) = current {
        if !visited.insert(id) {
            return Err(ComposerError::Structure("Cycle in page tree".to_string()));
        }
        let dict = doc.get_object_mut(id)?.as_dict_mut()?;
        let count = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        dict.set("Count", count + delta);
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(())
}

/// Links the page object `page_id` into the page tree so that it becomes
/// page index `at` (zero-based). The page is placed next to its neighbour
/// in the neighbour's own `/Kids`, so nested page trees stay intact.
pub fn insert_page(doc: &mut Document, at: usize, page_id: ObjectId) -> Result<(), ComposerError> {
    let pages = doc.get_pages();
    let count = pages.len();
    if at > count {
        return Err(ComposerError::Structure(format!(
            "Cannot insert a page at index {} of a {}-page document",
            at, count
        )));
    }

    let neighbour = |index: usize| {
        pages
            .get(&(index as u32 + 1))
            .copied()
            .ok_or_else(|| ComposerError::Structure(format!("Page {} is missing from the page tree", index + 1)))
    };
    let (parent_id, anchor, after) = if count == 0 {
        (catalog_pages_id(doc)?, None, true)
    } else if at < count {
        let sibling = neighbour(at)?;
        (parent_of(doc, sibling)?, Some(sibling), false)
    } else {
        let sibling = neighbour(count - 1)?;
        (parent_of(doc, sibling)?, Some(sibling), true)
    };

    let kids = kids_mut(doc, parent_id)?;
    let position = match anchor {
        None => kids.len(),
        Some(sibling) => {
            let found = kids
                .iter()
                .position(|k| matches!(k, Object::Reference(id) if *id == sibling))
                .ok_or_else(|| {
                    ComposerError::Structure(format!("Page {:?} is not listed in its parent's /Kids", sibling))
                })?;
            if after { found + 1 } else { found }
        }
    };
    kids.insert(position, Object::Reference(page_id));

    if let Ok(Object::Dictionary(page_dict)) = doc.get_object_mut(page_id) {
        page_dict.set("Parent", Object::Reference(parent_id));
    }
    bump_counts(doc, parent_id, 1)
}

/// Adds a new content stream to an existing page, drawn on top of whatever
/// the page already shows.
///
/// Existing content is bracketed with `q`/`Q` so graphics state it leaves
/// behind (transforms, colors) cannot leak into the overlay. Pages without
/// `/Contents` simply get the overlay as their only stream.
pub fn overlay_content(doc: &mut Document, page_id: ObjectId, content_stream: Vec<u8>) -> Result<(), ComposerError> {
    let existing: Option<Vec<Object>> = {
        let page_dict = doc.get_object(page_id)?.as_dict()?;
        match page_dict.get(b"Contents") {
            Ok(Object::Array(arr)) => Some(arr.clone()),
            Ok(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(arr)) => Some(arr.clone()),
                _ => Some(vec![Object::Reference(*id)]),
            },
            Ok(other) => {
                return Err(ComposerError::Structure(format!(
                    "Page {:?} has an unexpected /Contents entry: {:?}",
                    page_id, other
                )));
            }
            Err(_) => None,
        }
    };

    let contents = match existing {
        Some(mut streams) if !streams.is_empty() => {
            let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
            let mut overlay = b"Q\n".to_vec();
            overlay.extend_from_slice(&content_stream);
            let overlay_id = doc.add_object(Stream::new(dictionary! {}, overlay));
            streams.insert(0, Object::Reference(save_id));
            streams.push(Object::Reference(overlay_id));
            Object::Array(streams)
        }
        _ => Object::Reference(doc.add_object(Stream::new(dictionary! {}, content_stream))),
    };

    let page_dict = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page_dict.set("Contents", contents);
    Ok(())
}
