//! docx-fill command line

use anyhow::{Context, Result};
use clap::Parser;
use docx_fill::{Package, ReplacementSession, ReplacementSpec};
use log::{info, LevelFilter};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docx-fill")]
#[command(version)]
#[command(about = "Fill a DOCX template from a JSON replacements file")]
struct Cli {
    /// Template document
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the filled document
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// JSON file with "text", "tables" and "images" sections
    #[arg(value_name = "REPLACEMENTS")]
    replacements: PathBuf,

    /// Log every part and placeholder
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let json = fs::read_to_string(&cli.replacements)
        .with_context(|| format!("Failed to read {}", cli.replacements.display()))?;
    let spec = ReplacementSpec::from_json(&json)
        .with_context(|| format!("Invalid replacements file {}", cli.replacements.display()))?;

    let mut package = Package::open(&cli.input)
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;

    let report = ReplacementSession::new(&mut package, &spec).run()?;

    package
        .save(&cli.output)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    info!(
        "Wrote {} ({} problems)",
        cli.output.display(),
        report.problems()
    );
    Ok(())
}
