//! Maps every TOC line to the page it jumps to once TOC pages exist.

use crate::config::InsertionPolicy;
use crate::planner::{LayoutPlan, LineDirective};
use crate::LayoutError;
use tocsmith_types::{TocEntry, ZoomHint};

/// Where a given number of TOC pages land in the final document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInsertion {
    pub policy: InsertionPolicy,
    pub original_page_count: usize,
    pub toc_pages: usize,
}

impl PageInsertion {
    pub fn new(policy: InsertionPolicy, original_page_count: usize, toc_pages: usize) -> Self {
        Self { policy, original_page_count, toc_pages }
    }

    /// TOC pages that sit in front of the original content. Every original
    /// page shifts by exactly this many positions.
    pub fn pages_before_original(&self) -> usize {
        match self.policy {
            InsertionPolicy::PreSized => self.toc_pages,
            InsertionPolicy::InsertOneAppendOverflow => self.toc_pages.min(1),
        }
    }

    /// TOC pages appended after the original content.
    pub fn pages_after_original(&self) -> usize {
        self.toc_pages - self.pages_before_original()
    }

    pub fn final_page_count(&self) -> usize {
        self.original_page_count + self.toc_pages
    }

    /// Zero-based index, in the final document, of the `toc_page`-th TOC page.
    pub fn toc_page_index(&self, toc_page: usize) -> usize {
        match self.policy {
            InsertionPolicy::PreSized => toc_page,
            InsertionPolicy::InsertOneAppendOverflow if toc_page == 0 => 0,
            InsertionPolicy::InsertOneAppendOverflow => self.original_page_count + toc_page,
        }
    }

    /// Zero-based index, in the final document, of original page `page` (1-based).
    pub fn shifted_index(&self, page: usize) -> usize {
        page.saturating_sub(1) + self.pages_before_original()
    }
}

/// A TOC line together with where its link lives and where it points.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLink<'a> {
    pub line: &'a LineDirective,
    /// Final-document index of the TOC page carrying the link.
    pub source_page: usize,
    /// Final-document index of the page the link jumps to.
    pub destination: usize,
    pub zoom: ZoomHint,
}

/// Resolves every line of `plan` against the page shift described by `insertion`.
///
/// Destinations are `(target_page - 1) + pages_before_original`, clamped to
/// the final document. An `insertion` that disagrees with the plan means the
/// page bookkeeping upstream is broken, and is reported as an error rather
/// than producing links into the wrong pages.
pub fn resolve<'a>(
    plan: &'a LayoutPlan,
    entries: &[TocEntry],
    insertion: &PageInsertion,
    zoom: ZoomHint,
) -> Result<Vec<ResolvedLink<'a>>, LayoutError> {
    if insertion.toc_pages != plan.pages_inserted {
        return Err(LayoutError::LinkResolution(format!(
            "insertion accounts for {} TOC pages but the layout uses {}",
            insertion.toc_pages, plan.pages_inserted
        )));
    }
    if insertion.original_page_count < 1 {
        return Err(LayoutError::Validation(
            "cannot resolve links in a document with no pages".to_string(),
        ));
    }

    let last_page = insertion.final_page_count() - 1;
    plan.lines
        .iter()
        .map(|line| {
            let entry = entries.get(line.entry_index).ok_or_else(|| {
                LayoutError::LinkResolution(format!(
                    "layout line refers to entry #{} but only {} entries were given",
                    line.entry_index,
                    entries.len()
                ))
            })?;
            Ok(ResolvedLink {
                line,
                source_page: insertion.toc_page_index(line.toc_page),
                destination: insertion.shifted_index(entry.target_page).min(last_page),
                zoom,
            })
        })
        .collect()
}
