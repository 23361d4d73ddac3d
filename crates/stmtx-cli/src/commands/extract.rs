//! Extract command - transactions from a single statement.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use stmtx_core::{ErrorKind, ExtractorRegistry, PdfTextSource};

use super::output::{self, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input statement (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Exit with an error if any block could not be parsed
    #[arg(long)]
    strict: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if !super::is_supported(&args.input) {
        anyhow::bail!("Unsupported file format: {}", args.input.display());
    }

    info!("Extracting {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Loading bank definitions...");

    let registry = ExtractorRegistry::with_defaults(&config)?;
    let pdf_source = PdfTextSource::new(&config.pdf);

    pb.set_message("Extracting transactions...");
    let result = registry.extract_file(&args.input, &pdf_source)?;
    pb.finish_and_clear();

    if result.bank.is_none() {
        match result.errors.iter().find(|e| e.kind == ErrorKind::Structural) {
            Some(error) => anyhow::bail!("{}", error),
            None => anyhow::bail!("No supported bank recognized in {}", args.input.display()),
        }
    }

    let rendered = output::render(&result, args.format, config.extraction.locale)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &rendered)?;
        println!(
            "{} {} items written to {}",
            style("✓").green(),
            result.items.len(),
            output_path.display()
        );
    } else {
        println!("{}", rendered);
    }

    for error in &result.errors {
        eprintln!("{} {}", style("⚠").yellow(), error);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if args.strict && !result.is_ok() {
        anyhow::bail!("{} blocks could not be parsed", result.errors.len());
    }

    Ok(())
}
