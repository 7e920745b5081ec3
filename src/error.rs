use thiserror::Error;
use tocsmith_layout::LayoutError;
use tocsmith_pdf_composer::ComposerError;
use tocsmith_traits::ContainerError;

/// Everything that can stop a table of contents from being synthesized.
#[derive(Error, Debug)]
pub enum TocError {
    #[error("Layout failed: {0}")]
    Layout(#[from] LayoutError),

    #[error("Document error: {0}")]
    Container(#[from] ContainerError),

    #[error("Configuration is invalid: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No bookmarks found")]
    NoEntries,
}

impl From<ComposerError> for TocError {
    fn from(e: ComposerError) -> Self {
        TocError::Container(e.into())
    }
}
