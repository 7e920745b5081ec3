//! # tocsmith
//!
//! Adds a hyperlinked table of contents to existing PDF documents. Entries
//! come from the caller or from the document's own bookmarks; the TOC pages
//! are laid out by `tocsmith-layout`, written through `tocsmith-pdf-composer`,
//! and every line links to the page it names.

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{ColorConfig, FontConfig, SynthesisConfig};
pub use error::TocError;
pub use pipeline::{
    process_batch, process_request, process_request_with, synthesize, BatchOutcome, EntrySource, SynthesisReport,
    SynthesisRequest, SynthesisResponse, TocPipeline, TocPipelineBuilder,
};

pub use tocsmith_layout::{InsertionPolicy, TocLayoutConfig};
pub use tocsmith_pdf_composer::LopdfContainer;
pub use tocsmith_traits::{DocumentContainer, InMemoryContainer};
pub use tocsmith_types::{OutlineItem, RawTocEntry, ZoomHint};
