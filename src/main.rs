//! sheetpack - Export typed spreadsheet tables

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use sheetpack::config::{Config, OutputFormat};
use sheetpack::progress::TracingProgress;
use sheetpack::runner::run_export;

/// Export typed spreadsheet tables to JSON, XML, or binary
#[derive(Parser, Debug)]
#[command(name = "sheetpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source workbook, CSV file, or directory
    #[arg(long)]
    src: PathBuf,

    /// Output directory (created if absent)
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Output format: json, xml or bin
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Merge all tables into one <name>.<ext> artifact
    #[arg(long)]
    combine: Option<String>,

    /// Table(s) to export (comma-separated, default all)
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,

    /// File extensions picked up from a source directory (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "xlsx,xlsm")]
    extensions: Vec<String>,

    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Only log warnings and errors, skip the summary table
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.quiet);

    // Failures are logged; the exit status stays 0.
    if let Err(e) = run(cli) {
        error!("{:#}", e);
    }
    ExitCode::SUCCESS
}

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.src, cli.out)
        .with_format(cli.format)
        .with_tables(cli.tables)
        .with_extensions(cli.extensions);
    if let Some(name) = cli.combine {
        config = config.with_combine(name);
    }
    if let Some(path) = cli.report {
        config = config.with_report(path);
    }

    let report = run_export(&config, &TracingProgress)?;

    if !cli.quiet && !report.tables.is_empty() {
        println!("{}", report.render());
    }
    if let Some(path) = &config.report {
        report.write_json(path)?;
    }
    Ok(())
}
