#![allow(dead_code)]

pub mod fixtures;
#[macro_use]
pub mod pdf_assertions;

use lopdf::Document as LopdfDocument;
use lopdf::ObjectId;
use tocsmith::{EntrySource, SynthesisReport, TocError, TocPipeline};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a synthesized PDF with helper methods
pub struct OutputPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
    pub report: SynthesisReport,
}

impl OutputPdf {
    pub fn from_bytes(bytes: Vec<u8>, report: SynthesisReport) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc, report })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.doc.get_pages().into_values().collect()
    }

    /// Save PDF to a file for manual debugging
    pub fn save_for_debug(&self, name: &str) -> std::io::Result<()> {
        std::fs::write(format!("test_output_{}.pdf", name), &self.bytes)
    }
}

/// Saves `doc` and runs it through `pipeline`.
pub fn run_pipeline(
    pipeline: &TocPipeline,
    doc: &mut LopdfDocument,
    source: EntrySource,
) -> Result<OutputPdf, Box<dyn std::error::Error>> {
    let input = fixtures::to_bytes(doc)?;
    let (bytes, report) = pipeline.process_bytes(&input, source)?;
    OutputPdf::from_bytes(bytes, report)
}

/// Like `run_pipeline`, but keeps the library error for inspection.
pub fn try_pipeline(pipeline: &TocPipeline, doc: &mut LopdfDocument, source: EntrySource) -> Result<SynthesisReport, TocError> {
    let input = fixtures::to_bytes(doc).map_err(|e| TocError::Config(e.to_string()))?;
    pipeline.process_bytes(&input, source).map(|(_, report)| report)
}
