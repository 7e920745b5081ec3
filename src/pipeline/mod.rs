//! The TOC synthesis pipeline.
//!
//! - **orchestrator**: `synthesize` sequences entry gathering, layout, page
//!   insertion, drawing, links and bookmarks against any `DocumentContainer`
//! - **builder**: `TocPipelineBuilder` layers overrides on a `SynthesisConfig`
//! - **api**: the request/response contract for whole PDFs in memory
//! - **batch**: many files at once, in parallel with the `parallel` feature
//!
//! # Example
//!
//! ```ignore
//! use tocsmith::{EntrySource, TocPipelineBuilder};
//! use tocsmith_types::RawTocEntry;
//!
//! let pipeline = TocPipelineBuilder::new().with_heading("Contents").build()?;
//! let entries = vec![RawTocEntry::new(1, "Intro", 1), RawTocEntry::new(1, "Methods", 4)];
//! let report = pipeline.process_file("in.pdf", "out.pdf", EntrySource::Explicit(entries))?;
//! println!("{} TOC pages", report.toc_pages);
//! ```

pub mod api;
pub mod batch;
pub mod builder;
pub mod orchestrator;

pub use api::{process_request, process_request_with, SynthesisRequest, SynthesisResponse};
pub use batch::{process_batch, BatchOutcome};
pub use builder::TocPipelineBuilder;
pub use orchestrator::{synthesize, EntrySource, SynthesisReport, TocPipeline};
