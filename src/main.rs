use clap::{Args, Parser, Subcommand};
use itertools::Itertools;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tocsmith::{
    process_batch, EntrySource, InsertionPolicy, RawTocEntry, SynthesisReport, TocError, TocPipeline,
    TocPipelineBuilder, ZoomHint,
};

// Many short-lived lopdf objects per document; mimalloc keeps batch runs flat.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Adds a hyperlinked table of contents to a PDF.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// PDF to add the table of contents to
    input: Option<PathBuf>,

    /// Where to write the result
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON array of entries: [{"title": .., "page": .., "level": ..}]
    #[arg(long, conflicts_with = "from_outline")]
    entries: Option<PathBuf>,

    /// Build the table of contents from the document's bookmarks
    #[arg(long)]
    from_outline: bool,

    /// Fail instead of copying the input when no entries are found
    #[arg(long)]
    require_entries: bool,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process several PDFs, taking entries from each file's bookmarks
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long)]
        out_dir: PathBuf,

        #[command(flatten)]
        options: Options,
    },
}

/// Settings shared by single-file and batch runs.
#[derive(Args, Debug)]
struct Options {
    /// Base configuration file (JSON); the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    heading: Option<String>,

    #[arg(long)]
    font_size: Option<f32>,

    /// Fixed zoom factor for link targets
    #[arg(long, conflicts_with = "top_of_page")]
    zoom: Option<f32>,

    /// Links scroll to the top of the target page, keeping the viewer's zoom
    #[arg(long)]
    top_of_page: bool,

    /// pre-sized (all TOC pages in front) or insert-one (overflow appended)
    #[arg(long)]
    policy: Option<InsertionPolicy>,

    /// Shorten titles so they never run under the page numbers
    #[arg(long)]
    fit_titles: bool,

    /// Leave the document outline alone
    #[arg(long)]
    no_bookmarks: bool,
}

impl Options {
    fn pipeline(&self) -> Result<TocPipeline, TocError> {
        let mut builder = TocPipelineBuilder::new();
        if let Some(path) = &self.config {
            builder = builder.with_config_file(path)?;
        }
        if let Some(heading) = &self.heading {
            builder = builder.with_heading(heading.clone());
        }
        if let Some(size) = self.font_size {
            builder = builder.with_font_size(size);
        }
        if self.top_of_page {
            builder = builder.with_zoom(ZoomHint::TopOfPage);
        } else if let Some(zoom) = self.zoom {
            builder = builder.with_zoom(ZoomHint::Fixed(zoom));
        }
        if let Some(policy) = self.policy {
            builder = builder.with_policy(policy);
        }
        if self.fit_titles {
            builder = builder.with_fit_titles(true);
        }
        if self.no_bookmarks {
            builder = builder.with_bookmarks(false);
        }
        builder.build()
    }
}

fn summary(report: &SynthesisReport) -> String {
    [
        format!("{} TOC pages", report.toc_pages),
        format!("{} links", report.links_written),
        format!("{} bookmarks", report.bookmarks_written),
        format!("{} pages total", report.final_page_count),
    ]
    .iter()
    .join(", ")
}

fn run_single(cli: Cli) -> Result<(), TocError> {
    let (Some(input), Some(output)) = (cli.input, cli.output) else {
        return Err(TocError::Config("an input file and --output are required".to_string()));
    };
    let pipeline = cli.options.pipeline()?;

    let source = match &cli.entries {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            EntrySource::Explicit(serde_json::from_str::<Vec<RawTocEntry>>(&json)?)
        }
        None if cli.from_outline => EntrySource::ExistingOutline,
        None => EntrySource::Explicit(Vec::new()),
    };

    let (bytes, report) = pipeline.process_bytes(&fs::read(&input)?, source)?;
    if report.toc_pages == 0 && cli.require_entries {
        return Err(TocError::NoEntries);
    }
    fs::write(&output, bytes)?;
    println!("{} -> {}: {}", input.display(), output.display(), summary(&report));
    Ok(())
}

fn run_batch(inputs: Vec<PathBuf>, out_dir: PathBuf, options: Options) -> Result<bool, TocError> {
    let pipeline = options.pipeline()?;
    let outcomes = process_batch(&pipeline, &inputs, &out_dir)?;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(report) => println!("{} -> {}: {}", outcome.input.display(), outcome.output.display(), summary(report)),
            Err(e) => eprintln!("{}: {}", outcome.input.display(), e),
        }
    }
    Ok(outcomes.iter().all(|o| o.is_ok()))
}

fn main() -> ExitCode {
    env_logger::init();
    let mut cli = Cli::parse();

    let result = match cli.command.take() {
        Some(Command::Batch { inputs, out_dir, options }) => run_batch(inputs, out_dir, options),
        None => run_single(cli).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
