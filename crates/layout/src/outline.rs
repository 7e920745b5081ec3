use tocsmith_types::{OutlineItem, TocEntry};

/// Deepest bookmark nesting written. PDF readers stop following `/First`
/// chains long before any sane document gets here.
pub const MAX_OUTLINE_DEPTH: u32 = 64;

/// Projects entries onto a bookmark list that forms a valid tree.
///
/// Pages stay in original numbering. The first item is always at level 1 and
/// no item sits more than one level below its predecessor; deeper jumps are
/// pulled up so every bookmark has a parent. Nothing is nested deeper than
/// `MAX_OUTLINE_DEPTH`.
pub fn to_outline(entries: &[TocEntry]) -> Vec<OutlineItem> {
    let mut previous = 0u32;
    entries
        .iter()
        .map(|entry| {
            let level = entry.level.clamp(1, (previous + 1).min(MAX_OUTLINE_DEPTH));
            previous = level;
            OutlineItem {
                level,
                title: entry.title.clone(),
                page: entry.target_page,
            }
        })
        .collect()
}
