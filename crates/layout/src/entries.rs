//! Turns caller-supplied TOC rows into validated `TocEntry` values.
//!
//! Bad rows never fail the whole document: blank titles are dropped and
//! out-of-range numbers are clamped. Only a document without pages is an
//! error, since there is nothing to clamp into.

use crate::LayoutError;
use log::debug;
use tocsmith_types::{RawNumber, RawTocEntry, TocEntry};

/// Normalizes `raw` against a document of `original_page_count` pages.
///
/// Entry order is preserved. The returned entries satisfy
/// `1 <= target_page <= original_page_count` and `level >= 1`.
pub fn normalize(raw: &[RawTocEntry], original_page_count: usize) -> Result<Vec<TocEntry>, LayoutError> {
    if original_page_count < 1 {
        return Err(LayoutError::Validation(
            "cannot build a table of contents for a document with no pages".to_string(),
        ));
    }

    let entries = raw
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| normalize_one(i, entry, original_page_count))
        .collect();
    Ok(entries)
}

fn normalize_one(index: usize, raw: &RawTocEntry, page_count: usize) -> Option<TocEntry> {
    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        debug!("Dropping TOC entry #{}: blank title", index);
        return None;
    }

    let level = coerce(raw.level.as_ref(), index, "level").max(1);
    let page = coerce(raw.page.as_ref(), index, "page");
    let target_page = page.clamp(1, page_count as i64) as usize;
    if target_page as i64 != page {
        debug!(
            "Clamped page of TOC entry #{} ('{}') from {} to {}",
            index, title, page, target_page
        );
    }

    Some(TocEntry {
        level: level.min(u32::MAX as i64) as u32,
        title: title.to_string(),
        target_page,
    })
}

/// Missing or non-numeric values fall back to 1.
fn coerce(value: Option<&RawNumber>, index: usize, field: &str) -> i64 {
    match value {
        None => 1,
        Some(v) => v.to_i64().unwrap_or_else(|| {
            debug!("TOC entry #{} has a non-numeric {} {:?}, using 1", index, field, v);
            1
        }),
    }
}
