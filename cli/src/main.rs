//! formgrid CLI - batch form-record extraction from DOCX tables

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use formgrid::{collect_sources, process_with_progress, render, ExtractConfig, JsonFormat};

#[derive(Parser)]
#[command(name = "formgrid")]
#[command(version)]
#[command(about = "Extract form records from DOCX tables to CSV and JSON", long_about = None)]
struct Cli {
    /// Input directory containing .docx files and .zip bundles
    #[arg(value_name = "DIR", default_value = ".")]
    input: PathBuf,

    /// Output file path
    #[arg(short, long, value_name = "FILE", default_value = "output.csv")]
    output: PathBuf,

    /// Write JSON instead of CSV
    #[arg(long)]
    json: bool,

    /// Extraction configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Process documents sequentially instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Suppress the progress bar and summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> formgrid::Result<()> {
    let config = match &cli.config {
        Some(path) => ExtractConfig::from_json_file(path)?,
        None => ExtractConfig::default(),
    };

    let sources = collect_sources(&cli.input)?;

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid progress template")
                .progress_chars("#>-"),
        );
        pb
    };

    // The callback ticks the bar per document, failures included;
    // under rayon it fires from worker threads in completion order
    let outcomes = process_with_progress(&sources, &config, !cli.sequential, |outcome| {
        pb.set_message(outcome.source_id.clone());
        pb.inc(1);
    });

    pb.finish_and_clear();

    let failed: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.is_ok())
        .map(|o| o.source_id.clone())
        .collect();
    let records = formgrid::collect_records(outcomes);

    if cli.json {
        let json = render::to_json(&records, JsonFormat::Pretty)?;
        std::fs::write(&cli.output, json)?;
    } else {
        render::write_csv(&cli.output, &records, &config)?;
    }

    if !cli.quiet {
        println!(
            "{} {} records written to {}",
            "✓".green().bold(),
            records.len(),
            cli.output.display()
        );
        if !failed.is_empty() {
            println!(
                "{} {} documents skipped: {}",
                "!".yellow().bold(),
                failed.len(),
                failed.join(", ")
            );
        }
    }
    Ok(())
}
