use crate::config::SynthesisConfig;
use crate::error::TocError;
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tocsmith_pdf_composer::LopdfContainer;
use tocsmith_layout::{
    estimate_pages, normalize, plan, resolve, to_outline, LayoutError, LayoutPlan, PageInsertion,
    RawTocEntry, ResolvedLink,
};
use tocsmith_traits::{DocumentContainer, LinkAnnotation, TextRun};
use tocsmith_types::{Color, Point, Size};

/// Where the TOC entries come from.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySource {
    /// Caller-supplied rows. An empty list falls back to the document's outline.
    Explicit(Vec<RawTocEntry>),
    /// The bookmark tree the document already carries.
    ExistingOutline,
}

/// What a synthesis run did to the document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisReport {
    pub toc_pages: usize,
    pub links_written: usize,
    pub bookmarks_written: usize,
    pub final_page_count: usize,
}

/// Adds a hyperlinked table of contents to `container`.
///
/// Page count and first-page geometry are captured before anything is
/// inserted, and all layout and link arithmetic uses those numbers. When no
/// entries can be found the container is left untouched and the report says
/// so; that is not an error.
pub fn synthesize<C>(container: &mut C, source: EntrySource, config: &SynthesisConfig) -> Result<SynthesisReport, TocError>
where
    C: DocumentContainer + ?Sized,
{
    config.validate()?;

    let original_page_count = container.page_count();
    if original_page_count == 0 {
        return Err(LayoutError::Validation("cannot add a table of contents to a document with no pages".into()).into());
    }
    let page_size = container.page_size(0)?;
    let geometry = config.layout.page_geometry(page_size)?;
    info!(
        "[TOC] {} has {} pages of {}x{}pt",
        container.name(),
        original_page_count,
        page_size.width,
        page_size.height
    );

    let raw = gather_entries(container, source)?;
    let entries = normalize(&raw, original_page_count)?;
    if entries.is_empty() {
        info!("[TOC] No entries found, leaving the document unchanged.");
        return Ok(SynthesisReport { final_page_count: original_page_count, ..Default::default() });
    }

    let layout = plan(&entries, &geometry, &config.layout);
    let estimate = estimate_pages(entries.len(), &geometry, &config.layout);
    if estimate != layout.pages_inserted {
        debug!("[TOC] Estimated {} TOC pages, layout needs {}", estimate, layout.pages_inserted);
    }
    let insertion = PageInsertion::new(config.policy, original_page_count, layout.pages_inserted);
    let links = resolve(&layout, &entries, &insertion, config.zoom)?;
    info!(
        "[TOC] {} entries on {} TOC pages ({:?})",
        entries.len(),
        layout.pages_inserted,
        config.policy
    );

    insert_toc_pages(container, &insertion, page_size)?;
    draw_headings(container, &layout, &insertion, config)?;
    let links_written = write_entries(container, &links, layout.font_size, config)?;

    let bookmarks_written = if config.write_bookmarks {
        let outline = to_outline(&entries);
        match container.set_outline(&outline) {
            Ok(written) => written,
            Err(e) => {
                warn!("[TOC] Could not write bookmarks, continuing without them: {}", e);
                0
            }
        }
    } else {
        0
    };

    let report = SynthesisReport {
        toc_pages: layout.pages_inserted,
        links_written,
        bookmarks_written,
        final_page_count: container.page_count(),
    };
    info!(
        "[TOC] Done: {} TOC pages, {} links, {} bookmarks, {} pages total.",
        report.toc_pages, report.links_written, report.bookmarks_written, report.final_page_count
    );
    Ok(report)
}

/// A configured synthesizer, created by `TocPipelineBuilder`.
#[derive(Debug, Clone, Default)]
pub struct TocPipeline {
    config: SynthesisConfig,
}

impl TocPipeline {
    pub(crate) fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Runs the synthesis against any document container.
    pub fn synthesize<C>(&self, container: &mut C, source: EntrySource) -> Result<SynthesisReport, TocError>
    where
        C: DocumentContainer + ?Sized,
    {
        synthesize(container, source, &self.config)
    }

    /// Adds a TOC to a PDF held in memory.
    ///
    /// A document that yields no entries is handed back byte-for-byte.
    pub fn process_bytes(&self, pdf: &[u8], source: EntrySource) -> Result<(Vec<u8>, SynthesisReport), TocError> {
        let mut container = LopdfContainer::load_mem(pdf)?;
        let report = self.synthesize(&mut container, source)?;
        if report.toc_pages == 0 {
            return Ok((pdf.to_vec(), report));
        }
        let bytes = container.to_bytes()?;
        debug!("[TOC] Serialized {} bytes", bytes.len());
        Ok((bytes, report))
    }

    /// Reads `input`, adds a TOC and writes the result to `output`.
    pub fn process_file<P, Q>(&self, input: P, output: Q, source: EntrySource) -> Result<SynthesisReport, TocError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let output = output.as_ref();
        let pdf = fs::read(input).map_err(|e| {
            TocError::Io(io::Error::new(e.kind(), format!("Failed to read '{}': {}", input.display(), e)))
        })?;
        let (bytes, report) = self.process_bytes(&pdf, source)?;
        fs::write(output, bytes).map_err(|e| {
            TocError::Io(io::Error::new(e.kind(), format!("Failed to write '{}': {}", output.display(), e)))
        })?;
        info!("[TOC] Wrote {}", output.display());
        Ok(report)
    }
}

fn gather_entries<C>(container: &C, source: EntrySource) -> Result<Vec<RawTocEntry>, TocError>
where
    C: DocumentContainer + ?Sized,
{
    match source {
        EntrySource::Explicit(raw) if !raw.is_empty() => Ok(raw),
        EntrySource::Explicit(_) => {
            debug!("[TOC] No explicit entries given, falling back to the document outline");
            outline_entries(container)
        }
        EntrySource::ExistingOutline => outline_entries(container),
    }
}

fn outline_entries<C>(container: &C) -> Result<Vec<RawTocEntry>, TocError>
where
    C: DocumentContainer + ?Sized,
{
    let outline = container.existing_outline()?;
    debug!("[TOC] Document outline has {} bookmarks", outline.len());
    Ok(outline.into_iter().map(RawTocEntry::from).collect())
}

fn insert_toc_pages<C>(container: &mut C, insertion: &PageInsertion, size: Size) -> Result<(), TocError>
where
    C: DocumentContainer + ?Sized,
{
    for at in 0..insertion.pages_before_original() {
        container.insert_blank_page(at, size)?;
    }
    for _ in 0..insertion.pages_after_original() {
        container.append_blank_page(size)?;
    }

    let actual = container.page_count();
    if actual != insertion.final_page_count() {
        return Err(LayoutError::LinkResolution(format!(
            "expected {} pages after inserting the table of contents, found {}",
            insertion.final_page_count(),
            actual
        ))
        .into());
    }
    Ok(())
}

fn draw_headings<C>(
    container: &mut C,
    layout: &LayoutPlan,
    insertion: &PageInsertion,
    config: &SynthesisConfig,
) -> Result<(), TocError>
where
    C: DocumentContainer + ?Sized,
{
    for heading in &layout.headings {
        let run = TextRun {
            position: heading.position,
            text: heading.text.clone(),
            font_size: heading.font_size,
            font: config.fonts.heading.clone(),
            color: config.colors.heading,
        };
        container.draw_text(insertion.toc_page_index(heading.toc_page), &run)?;
    }
    Ok(())
}

/// Draws each entry's title and page label and makes the line clickable.
fn write_entries<C>(
    container: &mut C,
    links: &[ResolvedLink<'_>],
    font_size: f32,
    config: &SynthesisConfig,
) -> Result<usize, TocError>
where
    C: DocumentContainer + ?Sized,
{
    let run = |position: Point, text: &str, color: Color| TextRun {
        position,
        text: text.to_string(),
        font_size,
        font: config.fonts.body.clone(),
        color,
    };

    for link in links {
        let line = link.line;
        container.draw_text(link.source_page, &run(Point::new(line.x, line.baseline), &line.title, config.colors.entry))?;
        container.draw_text(
            link.source_page,
            &run(Point::new(line.page_label_x, line.baseline), &line.page_label, config.colors.page_number),
        )?;
        let annotation = LinkAnnotation { rect: line.rect, destination: link.destination, zoom: link.zoom };
        container.add_link(link.source_page, &annotation)?;
    }
    Ok(links.len())
}
