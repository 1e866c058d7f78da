//! Itinerary redaction CLI.
//!
//! By default processes every PDF in the configured input directory and
//! writes redacted copies to the output directory. Use the `file`
//! subcommand for a single document and `extract` to inspect the result.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use itinerary_redactor::{
    extract_text_from_pdf, AppConfig, BatchRunner, DocumentPipeline, ImageHandling, Preset,
    RedactionConfig,
};

/// Itinerary PDF redaction tool
///
/// Securely redact agent contacts, fare rules and comment links from
/// itinerary PDFs. Only documents with at least one redaction are written.
#[derive(Parser)]
#[command(name = "itinerary-redactor")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE", default_value = "redactor.toml", global = true)]
    config: PathBuf,

    /// Directory containing source PDFs (overrides the config file)
    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Directory receiving redacted PDFs (overrides the config file)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Rule set to use instead of the configured rules
    #[arg(long, value_enum, global = true)]
    preset: Option<Preset>,

    /// Image handling inside redacted regions
    #[arg(long, value_enum, global = true)]
    images: Option<ImageHandling>,

    /// Right margin excluded from every region, in points
    #[arg(long, value_name = "POINTS", global = true)]
    margin: Option<f32>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Redact a single PDF
    File {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Extract text from a PDF (for debugging and verification)
    Extract {
        /// Input PDF file path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

/// Merges command-line overrides into the loaded configuration.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    if let Some(preset) = cli.preset {
        let base = std::mem::take(&mut config.redaction);
        config.redaction = RedactionConfig {
            rules: RedactionConfig::preset(preset).rules,
            ..base
        };
    }
    if let Some(images) = cli.images {
        config.redaction.images = images;
    }
    if let Some(margin) = cli.margin {
        config.redaction.right_margin_offset = margin;
    }
    if let Some(dir) = &cli.input_dir {
        config.batch.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.batch.output_dir = dir.clone();
    }

    config
        .redaction
        .validate()
        .context("Invalid redaction settings")?;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_batch(config: AppConfig) -> Result<()> {
    if !config.batch.input_dir.exists() {
        anyhow::bail!(
            "Input folder '{}' not found",
            config.batch.input_dir.display()
        );
    }

    let pipeline = DocumentPipeline::with_mupdf(config.redaction);
    let report = BatchRunner::new(pipeline, config.batch)
        .run()
        .context("Batch processing failed")?;

    let written = report.written().count();
    let unchanged = report.succeeded().count() - written;
    println!(
        "✓ {} document(s) redacted, {} without matches, {} skipped",
        written,
        unchanged,
        report.skipped.len()
    );

    let failures: Vec<_> = report.failed().collect();
    for (path, err) in &failures {
        eprintln!("✗ {}: {}", path.display(), err);
    }
    if !failures.is_empty() {
        anyhow::bail!("{} document(s) failed", failures.len());
    }

    Ok(())
}

fn run_file(config: AppConfig, input: &Path, output: &Path) -> Result<()> {
    let pipeline = DocumentPipeline::with_mupdf(config.redaction);
    let report = pipeline
        .process(input, output)
        .with_context(|| format!("Redaction failed for {}", input.display()))?;

    if report.has_redactions() {
        println!(
            "✓ Redacted {} region(s) on {} of {} page(s) → {}",
            report.regions_applied,
            report.pages_modified,
            report.pages_processed,
            output.display()
        );
    } else {
        println!("⚠ No sections found to redact; nothing written");
    }

    Ok(())
}

fn run_extract(input: &Path, output: Option<&Path>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let text = extract_text_from_pdf(input).with_context(|| "Text extraction failed")?;

    if let Some(output_path) = output {
        std::fs::write(output_path, &text)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        println!(
            "✓ Extracted {} characters → {}",
            text.len(),
            output_path.display()
        );
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(Commands::Extract { input, output }) => run_extract(input, output.as_deref()),
        Some(Commands::File { input, output }) => run_file(resolve_config(&cli)?, input, output),
        None => run_batch(resolve_config(&cli)?),
    }
}
