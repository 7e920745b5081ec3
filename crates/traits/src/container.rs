//! DocumentContainer trait for abstracting the paginated document being
//! decorated with a table of contents.
//!
//! The TOC core never touches file bytes. Everything it needs from a
//! document (page count and size, blank-page insertion, text drawing, link
//! annotations, outline access, serialization) goes through this trait.

use std::fmt::Debug;
use thiserror::Error;
use tocsmith_types::{Color, OutlineItem, Point, Rect, Size, ZoomHint};

/// Error type for document container operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContainerError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Page index {index} is out of range for a document with {count} pages")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Document has no pages")]
    EmptyDocument,

    #[error("Unsupported document structure: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ContainerError {
    fn from(err: std::io::Error) -> Self {
        ContainerError::Io(err.to_string())
    }
}

/// A single run of text to draw on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Baseline origin, top-left page space.
    pub position: Point,
    pub text: String,
    pub font_size: f32,
    /// Base font name, e.g. `Helvetica`.
    pub font: String,
    pub color: Color,
}

/// A clickable area that jumps to another page of the same document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkAnnotation {
    /// Clickable area, top-left page space.
    pub rect: Rect,
    /// Zero-based index of the destination page in the current document.
    pub destination: usize,
    pub zoom: ZoomHint,
}

/// The capabilities the TOC synthesizer needs from a paginated document.
///
/// Page indices are zero-based and always refer to the document as it is at
/// the time of the call. Outline pages are the exception: they are 1-based
/// numbers in the document as it was loaded, so an outline written after
/// pages were inserted still lands on the intended content.
///
/// # Implementations
///
/// - `LopdfContainer` (in `tocsmith-pdf-composer`): real PDF files via `lopdf`
/// - `InMemoryContainer`: records every call, for tests and dry runs
pub trait DocumentContainer: Debug {
    fn page_count(&self) -> usize;

    /// Size of the page at `page_index`.
    fn page_size(&self, page_index: usize) -> Result<Size, ContainerError>;

    /// Inserts a blank page so that it ends up at index `at`.
    fn insert_blank_page(&mut self, at: usize, size: Size) -> Result<(), ContainerError>;

    fn append_blank_page(&mut self, size: Size) -> Result<(), ContainerError> {
        let at = self.page_count();
        self.insert_blank_page(at, size)
    }

    fn draw_text(&mut self, page_index: usize, run: &TextRun) -> Result<(), ContainerError>;

    fn add_link(&mut self, page_index: usize, link: &LinkAnnotation) -> Result<(), ContainerError>;

    /// The outline the document was loaded with, flattened depth-first.
    /// Returns an empty vector when the document has none.
    fn existing_outline(&self) -> Result<Vec<OutlineItem>, ContainerError>;

    /// Replaces the document outline. Returns the number of bookmarks written.
    fn set_outline(&mut self, items: &[OutlineItem]) -> Result<usize, ContainerError>;

    /// Serializes the document in its current state.
    fn to_bytes(&mut self) -> Result<Vec<u8>, ContainerError>;

    /// Returns a human-readable name for this container (for logging/debugging).
    fn name(&self) -> &'static str;
}
