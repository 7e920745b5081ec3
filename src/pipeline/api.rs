// src/pipeline/api.rs
use super::orchestrator::{EntrySource, SynthesisReport, TocPipeline};
use crate::config::SynthesisConfig;
use crate::error::TocError;
use log::info;
use serde::{Deserialize, Serialize};
use tocsmith_types::{RawTocEntry, ZoomHint};

fn default_true() -> bool {
    true
}

/// One self-contained request: a PDF plus the options to apply to it.
///
/// Field names follow the JSON shape callers send (`useExistingOutline`,
/// `fontSize`, ...). The document bytes are never serialized.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    #[serde(skip)]
    pub document: Vec<u8>,
    #[serde(default)]
    pub entries: Option<Vec<RawTocEntry>>,
    /// Take entries from the document's bookmarks instead of `entries`.
    #[serde(default)]
    pub use_existing_outline: bool,
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default = "default_true")]
    pub write_bookmarks: bool,
    #[serde(default)]
    pub zoom: Option<ZoomHint>,
    /// Fail with `TocError::NoEntries` instead of returning the input unchanged.
    #[serde(default)]
    pub require_entries: bool,
}

impl SynthesisRequest {
    pub fn new(document: Vec<u8>) -> Self {
        Self { document, write_bookmarks: true, ..Default::default() }
    }

    pub fn with_entries(mut self, entries: Vec<RawTocEntry>) -> Self {
        self.entries = Some(entries);
        self
    }

    fn source(&self) -> EntrySource {
        if self.use_existing_outline {
            EntrySource::ExistingOutline
        } else {
            EntrySource::Explicit(self.entries.clone().unwrap_or_default())
        }
    }

    /// Applies the per-request overrides on top of `base`.
    fn config(&self, base: &SynthesisConfig) -> SynthesisConfig {
        let mut config = base.clone();
        if let Some(heading) = &self.heading {
            config.layout.heading = heading.clone();
        }
        if let Some(size) = self.font_size {
            config.layout.font_size = size;
        }
        if let Some(zoom) = self.zoom {
            config.zoom = zoom;
        }
        config.write_bookmarks = self.write_bookmarks;
        config
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResponse {
    #[serde(skip)]
    pub document: Vec<u8>,
    pub bookmarks_written: usize,
    pub final_page_count: usize,
    pub toc_pages: usize,
}

impl SynthesisResponse {
    fn new(document: Vec<u8>, report: SynthesisReport) -> Self {
        Self {
            document,
            bookmarks_written: report.bookmarks_written,
            final_page_count: report.final_page_count,
            toc_pages: report.toc_pages,
        }
    }
}

/// Handles a request with the default configuration.
pub fn process_request(request: SynthesisRequest) -> Result<SynthesisResponse, TocError> {
    process_request_with(request, &SynthesisConfig::default())
}

/// Handles a request, layering its overrides on `base`.
///
/// When no entries can be derived the original bytes come back untouched,
/// unless the request sets `require_entries`.
pub fn process_request_with(request: SynthesisRequest, base: &SynthesisConfig) -> Result<SynthesisResponse, TocError> {
    let pipeline = TocPipeline::new(request.config(base));
    let (document, report) = pipeline.process_bytes(&request.document, request.source())?;

    if report.toc_pages == 0 {
        if request.require_entries {
            return Err(TocError::NoEntries);
        }
        info!("[TOC] Returning the document unchanged.");
    }
    Ok(SynthesisResponse::new(document, report))
}
