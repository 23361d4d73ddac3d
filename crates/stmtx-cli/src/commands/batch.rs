//! Batch command - extract transactions from many statements.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use stmtx_core::{DocumentResult, ExtractorRegistry, PdfTextSource};

use super::output::{self, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write all items to summary.csv
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of a single file.
struct FileResult {
    path: PathBuf,
    result: Result<DocumentResult, String>,
    processing_time_ms: u64,
}

impl FileResult {
    /// Failure message if the file yielded nothing usable.
    fn failure(&self) -> Option<String> {
        match &self.result {
            Err(e) => Some(e.clone()),
            Ok(doc) if doc.bank.is_none() => Some(
                doc.errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "no supported bank recognized".to_string()),
            ),
            Ok(_) => None,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| super::is_supported(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(output_dir) = &args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let registry = Arc::new(ExtractorRegistry::with_defaults(&config)?);
    let pdf_source = Arc::new(PdfTextSource::new(&config.pdf));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));

    // Set by the first failing file unless errors are tolerated; no
    // further files are scheduled once it is set.
    let halted = Arc::new(AtomicBool::new(false));
    let total = files.len();

    let mut handles = Vec::with_capacity(total);
    for path in files {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        if halted.load(Ordering::SeqCst) {
            warn!(
                "Skipping {} remaining files after a failure",
                total - handles.len()
            );
            break;
        }

        let registry = Arc::clone(&registry);
        let pdf_source = Arc::clone(&pdf_source);
        let halted = Arc::clone(&halted);
        let continue_on_error = args.continue_on_error;
        let pb = overall_pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let file_start = Instant::now();
            let result = registry.extract_file(&path, pdf_source.as_ref())
                .map_err(|e| e.to_string());
            pb.inc(1);
            let result = FileResult {
                path,
                result,
                processing_time_ms: file_start.elapsed().as_millis() as u64,
            };
            if !continue_on_error && result.failure().is_some() {
                halted.store(true, Ordering::SeqCst);
            }
            result
        }));
    }

    // Joined in input order so outputs and the summary are stable.
    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let result = handle.await?;
        if let Some(message) = result.failure() {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), message);
            } else {
                overall_pb.abandon();
                error!("Failed to process {}: {}", result.path.display(), message);
                anyhow::bail!("Processing failed: {}", message);
            }
        }
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        write_outputs(output_dir, &results, args.format, config.extraction.locale)?;
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results
        .iter()
        .filter_map(|r| r.failure().map(|message| (&r.path, message)))
        .collect();
    let items: usize = results
        .iter()
        .filter_map(|r| r.result.as_ref().ok())
        .map(|doc| doc.items.len())
        .sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} items, {} successful, {} failed",
        style(items).cyan(),
        style(results.len() - failed.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, message) in &failed {
            println!("  - {}: {}", path.display(), message);
        }
    }

    Ok(())
}

fn write_outputs(
    output_dir: &Path,
    results: &[FileResult],
    format: OutputFormat,
    locale: stmtx_core::NumberLocale,
) -> anyhow::Result<()> {
    for file in results {
        let Ok(doc) = &file.result else {
            continue;
        };
        if doc.bank.is_none() {
            continue;
        }

        let stem = file
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("statement");
        let output_path = output_dir.join(format!("{}.{}", stem, format.extension()));

        fs::write(&output_path, output::render(doc, format, locale)?)?;
        debug!("Wrote output to {}", output_path.display());
    }
    Ok(())
}

/// One row per extracted item, plus one row per failed file.
fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header: Vec<&str> = output::ITEM_HEADER.to_vec();
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for file in results {
        let filename = file
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match (&file.result, file.failure()) {
            (Ok(doc), None) => {
                for item in &doc.items {
                    let mut record = output::item_record(doc, item);
                    record.push(file.processing_time_ms.to_string());
                    record.push(String::new());
                    wtr.write_record(&record)?;
                }
            }
            (_, failure) => {
                let mut record = vec![String::new(); output::ITEM_HEADER.len()];
                record[0] = filename.to_string();
                record.push(file.processing_time_ms.to_string());
                record.push(failure.unwrap_or_default());
                wtr.write_record(&record)?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
