// src/pipeline/builder.rs
use super::orchestrator::TocPipeline;
use crate::config::SynthesisConfig;
use crate::error::TocError;
use std::path::Path;
use tocsmith_layout::InsertionPolicy;
use tocsmith_types::ZoomHint;

/// A builder for creating a `TocPipeline`.
///
/// Starts from `SynthesisConfig::default()` (or a loaded config file) and
/// layers individual overrides on top, the way the CLI flags do.
#[derive(Debug, Clone, Default)]
pub struct TocPipelineBuilder {
    config: SynthesisConfig,
}

impl TocPipelineBuilder {
    pub fn new() -> Self { Default::default() }

    /// Replaces the whole base configuration.
    pub fn with_config(mut self, config: SynthesisConfig) -> Self { self.config = config; self }

    /// Loads the base configuration from a JSON file.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, TocError> {
        self.config = SynthesisConfig::from_file(path)?;
        Ok(self)
    }

    /// Sets the heading of the first TOC page. Continuation pages append the configured suffix.
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self { self.config.layout.heading = heading.into(); self }

    pub fn with_font_size(mut self, size: f32) -> Self { self.config.layout.font_size = size; self }

    pub fn with_zoom(mut self, zoom: ZoomHint) -> Self { self.config.zoom = zoom; self }

    pub fn with_policy(mut self, policy: InsertionPolicy) -> Self { self.config.policy = policy; self }

    /// Shortens titles that would otherwise run under their page numbers.
    pub fn with_fit_titles(mut self, fit: bool) -> Self { self.config.layout.fit_titles = fit; self }

    /// Enables or disables rewriting the document outline.
    pub fn with_bookmarks(mut self, write: bool) -> Self { self.config.write_bookmarks = write; self }

    /// Consumes the builder and creates the `TocPipeline`.
    /// The merged configuration is validated here, so a bad override fails before any document is touched.
    pub fn build(self) -> Result<TocPipeline, TocError> {
        self.config.validate()?;
        log::debug!("Building TOC pipeline with policy {:?}, zoom {:?}", self.config.policy, self.config.zoom);
        Ok(TocPipeline::new(self.config))
    }
}
