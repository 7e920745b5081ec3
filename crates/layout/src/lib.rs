//! # tocsmith-layout
//!
//! The pure core of the TOC synthesizer. Nothing here performs I/O or holds
//! state between calls:
//! - **entries**: normalizes raw caller input into `TocEntry` values
//! - **planner**: paginates entries and positions every TOC line
//! - **resolver**: remaps each entry's page to its index after insertion
//! - **outline**: projects entries onto a valid bookmark tree

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Link resolution failed: {0}")]
    LinkResolution(String),
}

pub mod config;
pub mod entries;
pub mod outline;
pub mod planner;
pub mod resolver;
pub mod text;

pub use self::config::{InsertionPolicy, MIN_LINE_HEIGHT, TocLayoutConfig};
pub use self::entries::normalize;
pub use self::outline::{to_outline, MAX_OUTLINE_DEPTH};
pub use self::planner::{HeadingDirective, LayoutPlan, LineDirective, estimate_pages, lines_per_page, plan};
pub use self::resolver::{PageInsertion, ResolvedLink, resolve};

// Re-export the value types the public API is written in
pub use tocsmith_types::{Margins, OutlineItem, PageGeometry, RawTocEntry, Rect, Size, TocEntry, ZoomHint};
