pub mod color;
pub mod document;
pub mod geometry;
pub mod link;

pub use color::Color;
pub use document::{OutlineItem, RawNumber, RawTocEntry, TocEntry};
pub use geometry::{Margins, PageGeometry, Point, Rect, Size};
pub use link::ZoomHint;
