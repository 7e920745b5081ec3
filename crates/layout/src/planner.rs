//! Paginates TOC entries and positions every line, as pure geometry.
//!
//! Coordinates use a top-left origin with `y` growing downward. Each TOC page
//! starts with a heading; entry baselines follow at a fixed pitch until the
//! next one would sink below the bottom margin, at which point a new page is
//! started. The page count therefore falls out of live overflow detection.

use crate::config::TocLayoutConfig;
use crate::text::{estimate_width, truncate_title, CHAR_WIDTH_FACTOR};
use log::debug;
use tocsmith_types::{PageGeometry, Point, Rect, TocEntry};

/// How far the clickable area reaches above the baseline, in font sizes.
const LINK_ASCENT: f32 = 0.8;
/// How far the clickable area reaches below the baseline, in font sizes.
const LINK_DESCENT: f32 = 0.35;

/// The heading line at the top of one TOC page.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingDirective {
    pub toc_page: usize,
    pub position: Point,
    pub text: String,
    pub font_size: f32,
}

/// Placement of a single TOC entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LineDirective {
    /// Zero-based index among the TOC pages (not the final document).
    pub toc_page: usize,
    /// Index of the rendered entry in the planner's input.
    pub entry_index: usize,
    /// Indented left edge of the title.
    pub x: f32,
    pub baseline: f32,
    /// Title as it should be drawn, truncated if needed.
    pub title: String,
    /// The entry's original 1-based page number.
    pub page_label: String,
    /// Left edge of the right-aligned page label.
    pub page_label_x: f32,
    /// The whole line is clickable, from the indent to the right margin.
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutPlan {
    pub headings: Vec<HeadingDirective>,
    pub lines: Vec<LineDirective>,
    /// Number of TOC pages the lines occupy.
    pub pages_inserted: usize,
    /// Width reserved at the right margin for the widest page label.
    pub page_number_column: f32,
    /// Font size entry titles and labels are drawn at.
    pub font_size: f32,
}

impl LayoutPlan {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The fixed baseline grid shared by every TOC page.
struct Slots {
    first_baseline: f32,
    pitch: f32,
    limit: f32,
}

impl Slots {
    fn new(geometry: &PageGeometry, config: &TocLayoutConfig) -> Self {
        Self {
            first_baseline: geometry.margins.top + config.heading_gap(),
            pitch: config.effective_line_height(),
            limit: geometry.content_bottom(),
        }
    }

    fn baseline(&self, slot: usize) -> f32 {
        self.first_baseline + slot as f32 * self.pitch
    }

    fn overflows(&self, slot: usize) -> bool {
        self.baseline(slot) > self.limit
    }

    /// Lines that fit on one page. Never less than one: the first entry of a
    /// page is placed even when it overflows.
    fn capacity(&self) -> usize {
        if self.overflows(0) {
            return 1;
        }
        let mut n = ((self.limit - self.first_baseline) / self.pitch).floor() as usize + 1;
        while n > 1 && self.overflows(n - 1) {
            n -= 1;
        }
        while !self.overflows(n) {
            n += 1;
        }
        n
    }
}

/// Number of entry lines one TOC page holds for this geometry.
pub fn lines_per_page(geometry: &PageGeometry, config: &TocLayoutConfig) -> usize {
    Slots::new(geometry, config).capacity()
}

/// Up-front estimate of TOC pages, `ceil(entry_count / lines_per_page)`.
///
/// Only useful for pre-sizing; `plan` is authoritative.
pub fn estimate_pages(entry_count: usize, geometry: &PageGeometry, config: &TocLayoutConfig) -> usize {
    entry_count.div_ceil(lines_per_page(geometry, config))
}

/// Lays out `entries` on as many TOC pages as they need.
pub fn plan(entries: &[TocEntry], geometry: &PageGeometry, config: &TocLayoutConfig) -> LayoutPlan {
    let slots = Slots::new(geometry, config);
    let right_edge = geometry.right_edge();
    let font_size = config.font_size;

    let mut headings = Vec::new();
    let mut lines = Vec::with_capacity(entries.len());
    let mut toc_page = 0;
    let mut slot = 0;
    let page_number_column = entries
        .iter()
        .map(|e| estimate_width(&e.target_page.to_string(), font_size))
        .fold(0.0, f32::max);
    let char_width = font_size * CHAR_WIDTH_FACTOR;

    for (entry_index, entry) in entries.iter().enumerate() {
        if entry_index == 0 {
            headings.push(heading(0, geometry, config));
        } else if slot > 0 && slots.overflows(slot) {
            toc_page += 1;
            slot = 0;
            debug!("TOC page {} starts at entry #{}", toc_page, entry_index);
            headings.push(heading(toc_page, geometry, config));
        }

        let baseline = slots.baseline(slot);
        let indent = config.indent_step * entry.level.saturating_sub(1) as f32;
        let x = (geometry.margins.left + indent).clamp(0.0, right_edge.max(0.0));

        let max_chars = if config.fit_titles {
            // One character of air between the title and the widest label.
            let room = right_edge - page_number_column - char_width - x;
            config.max_title_chars.min((room / char_width).floor().max(1.0) as usize)
        } else {
            config.max_title_chars
        };
        let title = truncate_title(&entry.title, max_chars, &config.ellipsis).into_owned();
        let page_label = entry.target_page.to_string();
        let label_width = estimate_width(&page_label, font_size);

        lines.push(LineDirective {
            toc_page,
            entry_index,
            x,
            baseline,
            title,
            page_label_x: right_edge - label_width,
            page_label,
            rect: Rect::from_corners(
                x,
                baseline - LINK_ASCENT * font_size,
                right_edge,
                baseline + LINK_DESCENT * font_size,
            ),
        });
        slot += 1;
    }

    LayoutPlan {
        headings,
        pages_inserted: if lines.is_empty() { 0 } else { toc_page + 1 },
        lines,
        page_number_column,
        font_size,
    }
}

fn heading(toc_page: usize, geometry: &PageGeometry, config: &TocLayoutConfig) -> HeadingDirective {
    let (text, font_size) = if toc_page == 0 {
        (config.heading.clone(), config.heading_font_size)
    } else {
        (config.continuation_heading(), config.continuation_font_size)
    };
    HeadingDirective {
        toc_page,
        position: Point::new(geometry.margins.left, geometry.margins.top),
        text,
        font_size,
    }
}
