//! pricelist — batch extraction of product records from vendor price-list
//! PDFs.
//!
//! This binary is the thin ingestion/presentation shell around the
//! extraction pipeline: it reads the uploaded files, enforces the batch
//! limits, runs the batch and renders the per-vendor report. All
//! extraction logic lives in the library crates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;

use pricelist_core::{BatchResult, ExtractionOptions, SourceDocument};
use pricelist_pipeline::{process_batch, BatchOptions, DocumentProcessor};

/// Upload limits enforced at the ingestion boundary, not inside the core.
const MAX_FILES: usize = 30;
const MAX_TOTAL_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "pricelist",
    version,
    about = "Extract product records from vendor price-list PDFs"
)]
struct Cli {
    /// PDF files to process (at most 30 files, 100 MB combined).
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Write the full batch result as JSON to this path (`-` for stdout).
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Raster resolution for the OCR fallback, in DPI.
    #[arg(long, default_value_t = 400.0)]
    dpi: f32,

    /// Worker threads for the batch pool (0 = one per core, 1 = sequential).
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Minimum OCR token confidence (0.0-1.0).
    #[arg(long, default_value_t = 0.3)]
    min_confidence: f32,

    /// Fraction of a column's cells that must look like currency for a
    /// table to count as costed.
    #[arg(long, default_value_t = 0.5)]
    cost_ratio: f64,

    /// Suppress the per-vendor record listing; print the summary only.
    #[arg(short, long)]
    quiet: bool,
}

/// JSON report envelope.
#[derive(Debug, Serialize)]
struct Report<'a> {
    generated_at: String,
    batch: &'a BatchResult,
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        #[allow(clippy::cast_precision_loss)]
        let value = bytes as f64 / MB as f64;
        format!("{value:.1} MB")
    } else if bytes >= KB {
        #[allow(clippy::cast_precision_loss)]
        let value = bytes as f64 / KB as f64;
        format!("{value:.1} KB")
    } else {
        format!("{bytes} bytes")
    }
}

fn filename_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Read the batch into memory, enforcing the ingestion limits.
fn load_documents(paths: &[PathBuf]) -> Result<Vec<SourceDocument>> {
    if paths.len() > MAX_FILES {
        bail!("too many files: {} (limit {MAX_FILES})", paths.len());
    }

    let mut documents = Vec::with_capacity(paths.len());
    let mut total_bytes = 0u64;

    for path in paths {
        let filename = filename_of(path);
        if !filename.to_lowercase().ends_with(".pdf") {
            eprintln!(
                "{} skipping {filename}: not a .pdf file",
                "warning:".yellow().bold()
            );
            continue;
        }

        let bytes =
            fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        total_bytes += bytes.len() as u64;
        if total_bytes > MAX_TOTAL_BYTES {
            bail!(
                "combined upload size exceeds {}",
                format_bytes(MAX_TOTAL_BYTES)
            );
        }
        documents.push(SourceDocument::new(filename, bytes));
    }

    if documents.is_empty() {
        bail!("no PDF files to process");
    }
    Ok(documents)
}

fn render_report(batch: &BatchResult, quiet: bool) {
    if !quiet {
        for (vendor, records) in &batch.vendors {
            println!("\n{}", vendor.bright_white().bold());
            for record in records {
                println!(
                    "  {:<16} {:<44} {:>9}",
                    record.product_id,
                    record.description,
                    format!("${:.2}", record.cost)
                );
            }
        }
    }

    for failure in &batch.failures {
        eprintln!(
            "{} {} - {}",
            "✗".red().bold(),
            failure.filename.bright_white(),
            failure.message.red()
        );
    }

    println!(
        "\n{} {} vendor(s), {} record(s), {} row(s) skipped, {} document(s) failed",
        "Done:".green().bold(),
        batch.vendors.len(),
        batch.stats.records_extracted,
        batch.stats.rows_skipped,
        batch.stats.documents_failed
    );
}

fn write_json(batch: &BatchResult, path: &Path) -> Result<()> {
    let report = Report {
        generated_at: chrono::Local::now().to_rfc3339(),
        batch,
    };
    let rendered = serde_json::to_string_pretty(&report)?;
    if path.as_os_str() == "-" {
        println!("{rendered}");
    } else {
        fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let documents = load_documents(&cli.files)?;
    println!(
        "Processing {} document(s) ({})...",
        documents.len(),
        format_bytes(documents.iter().map(|d| d.bytes.len() as u64).sum())
    );

    let options = ExtractionOptions {
        render_dpi: cli.dpi,
        min_token_confidence: cli.min_confidence,
        cost_column_min_ratio: cli.cost_ratio,
        ..ExtractionOptions::default()
    };
    let processor =
        DocumentProcessor::new(options).context("initializing the extraction pipeline")?;

    let batch = process_batch(
        &processor,
        &documents,
        &BatchOptions {
            workers: cli.workers,
        },
    )
    .context("processing batch")?;

    render_report(&batch, cli.quiet);
    if let Some(path) = &cli.json {
        write_json(&batch, path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_the_right_unit() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn filename_of_strips_directories() {
        assert_eq!(filename_of(Path::new("/tmp/up/Acme_2025.pdf")), "Acme_2025.pdf");
    }
}
