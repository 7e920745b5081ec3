//! Batch processing of many PDFs.
//!
//! Each input gets its own container and shares nothing with the others, so
//! with the `parallel` feature (on by default) the files are spread over
//! rayon's work-stealing pool. Without it they are processed in order on the
//! calling thread. Entries always come from each file's own outline.
//!
//! # Example
//!
//! ```ignore
//! use tocsmith::{TocPipelineBuilder, process_batch};
//!
//! let pipeline = TocPipelineBuilder::new().build()?;
//! let outcomes = process_batch(&pipeline, &["a.pdf".into(), "b.pdf".into()], "out".as_ref())?;
//! for outcome in &outcomes {
//!     println!("{}: {:?}", outcome.input.display(), outcome.result);
//! }
//! ```

use super::orchestrator::{EntrySource, SynthesisReport, TocPipeline};
use crate::error::TocError;
use log::{info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The result of processing one file of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    pub result: Result<SynthesisReport, TocError>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Processes every file in `inputs`, writing each result into `out_dir`
/// under the input's file name.
///
/// A failing file does not stop the batch; its error is reported in its
/// `BatchOutcome`. Outcomes are returned in input order. Only a missing or
/// uncreatable `out_dir` fails the whole call.
pub fn process_batch(pipeline: &TocPipeline, inputs: &[PathBuf], out_dir: &Path) -> Result<Vec<BatchOutcome>, TocError> {
    fs::create_dir_all(out_dir).map_err(|e| {
        TocError::Io(io::Error::new(e.kind(), format!("Failed to create '{}': {}", out_dir.display(), e)))
    })?;
    info!("[TOC] Processing {} files into {}", inputs.len(), out_dir.display());

    #[cfg(feature = "parallel")]
    let outcomes: Vec<BatchOutcome> = inputs.par_iter().map(|input| process_one(pipeline, input, out_dir)).collect();
    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<BatchOutcome> = inputs.iter().map(|input| process_one(pipeline, input, out_dir)).collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!("[TOC] Batch finished: {} succeeded, {} failed", outcomes.len() - failed, failed);
    Ok(outcomes)
}

fn process_one(pipeline: &TocPipeline, input: &Path, out_dir: &Path) -> BatchOutcome {
    let output = match input.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.join("output.pdf"),
    };
    let result = pipeline.process_file(input, &output, EntrySource::ExistingOutline);
    if let Err(e) = &result {
        warn!("[TOC] {} failed: {}", input.display(), e);
    }
    BatchOutcome { input: input.to_path_buf(), output, result }
}
