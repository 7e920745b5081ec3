use crate::LayoutError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tocsmith_types::{Margins, PageGeometry, Size};

/// Lines are never packed tighter than this, whatever the requested font size.
pub const MIN_LINE_HEIGHT: f32 = 16.0;

/// All the numbers that shape a TOC page, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TocLayoutConfig {
    /// Heading drawn at the top of the first TOC page.
    pub heading: String,
    /// Appended to the heading on every following TOC page.
    pub continuation_suffix: String,
    pub heading_font_size: f32,
    pub continuation_font_size: f32,
    /// Font size of entry titles and page numbers.
    pub font_size: f32,
    /// Requested distance between baselines. See `effective_line_height`.
    pub line_height: f32,
    /// Space below a heading, in multiples of the line height.
    pub heading_advance: f32,
    /// Horizontal shift per nesting level.
    pub indent_step: f32,
    /// Titles longer than this many characters are cut and end in `ellipsis`.
    pub max_title_chars: usize,
    pub ellipsis: String,
    /// Also shorten titles that would run into the page-number column.
    pub fit_titles: bool,
    pub margins: Margins,
}

impl Default for TocLayoutConfig {
    fn default() -> Self {
        Self {
            heading: "Hyperlinked Table of Contents".to_string(),
            continuation_suffix: " (cont.)".to_string(),
            heading_font_size: 16.0,
            continuation_font_size: 14.0,
            font_size: 11.0,
            line_height: 18.0,
            heading_advance: 2.0,
            indent_step: 14.0,
            max_title_chars: 180,
            ellipsis: "\u{2026}".to_string(),
            fit_titles: false,
            margins: Margins::all(54.0),
        }
    }
}

impl TocLayoutConfig {
    pub fn effective_line_height(&self) -> f32 {
        self.line_height.max(MIN_LINE_HEIGHT)
    }

    /// Vertical distance from a heading baseline to the first entry baseline.
    pub fn heading_gap(&self) -> f32 {
        self.heading_advance * self.effective_line_height()
    }

    pub fn continuation_heading(&self) -> String {
        format!("{}{}", self.heading, self.continuation_suffix)
    }

    /// The geometry TOC pages of `size` are laid out on. Fails when the
    /// margins leave no area to draw in.
    pub fn page_geometry(&self, size: Size) -> Result<PageGeometry, LayoutError> {
        let geometry = PageGeometry::new(size, self.margins);
        if geometry.usable_width() <= 0.0 || geometry.usable_height() <= 0.0 {
            return Err(LayoutError::Validation(format!(
                "margins {:?} leave no usable area on a {}x{}pt page",
                self.margins, size.width, size.height
            )));
        }
        Ok(geometry)
    }

    /// Rejects configurations the planner cannot honor.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let sizes = [
            ("headingFontSize", self.heading_font_size),
            ("continuationFontSize", self.continuation_font_size),
            ("fontSize", self.font_size),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::Validation(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let spacing = [
            ("lineHeight", self.line_height),
            ("headingAdvance", self.heading_advance),
            ("indentStep", self.indent_step),
            ("margins.top", self.margins.top),
            ("margins.right", self.margins.right),
            ("margins.bottom", self.margins.bottom),
            ("margins.left", self.margins.left),
        ];
        for (name, value) in spacing {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        let ellipsis_chars = self.ellipsis.chars().count();
        if self.max_title_chars <= ellipsis_chars {
            return Err(LayoutError::Validation(format!(
                "maxTitleChars ({}) must leave room for at least one character before the {}-character ellipsis",
                self.max_title_chars, ellipsis_chars
            )));
        }
        Ok(())
    }
}

/// Where TOC pages are placed relative to the original content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsertionPolicy {
    /// Every TOC page goes in front of the original content, so all original
    /// pages shift by the full TOC page count. (Default)
    #[default]
    PreSized,
    /// A single TOC page goes in front; any overflow pages are appended after
    /// the original content and do not shift it.
    InsertOneAppendOverflow,
}

impl FromStr for InsertionPolicy {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pre-sized" | "presized" => Ok(InsertionPolicy::PreSized),
            "insert-one" | "insert-one-append-overflow" => Ok(InsertionPolicy::InsertOneAppendOverflow),
            other => Err(LayoutError::Validation(format!(
                "unknown insertion policy '{}', expected 'pre-sized' or 'insert-one'",
                other
            ))),
        }
    }
}
