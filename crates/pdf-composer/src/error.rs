use thiserror::Error;
use tocsmith_traits::ContainerError;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Malformed document structure: {0}")]
    Structure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ComposerError> for ContainerError {
    fn from(err: ComposerError) -> Self {
        match err {
            ComposerError::Pdf(e) => ContainerError::Pdf(e.to_string()),
            ComposerError::Structure(msg) => ContainerError::Unsupported(msg),
            ComposerError::Io(e) => ContainerError::Io(e.to_string()),
        }
    }
}
