//! Compile a source star catalog into the binary sky map format.
//!
//! Reads the JSON source rows, resolves each spectral type to a color,
//! normalizes designations into display names and writes the packed
//! catalog. Rows that cannot be classified are dropped and summarized.

use anyhow::{Context, Result};
use clap::Parser;
use skymap::catalog::{compile_catalog, ProperNames, SourceRecord};
use skymap::spectral::ColorTable;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Compile a JSON star catalog into the binary sky map format",
    long_about = None
)]
struct Args {
    /// Source catalog: a JSON array of 12-element rows
    #[arg(short, long)]
    input: PathBuf,

    /// License / attribution text written ahead of the records
    #[arg(short, long)]
    license: PathBuf,

    /// Optional `;`-separated proper star name list
    #[arg(long)]
    star_names: Option<PathBuf>,

    /// Custom spectral type color table (JSON); defaults to the built-in table
    #[arg(long)]
    colors: Option<PathBuf>,

    /// Output path for the binary catalog
    #[arg(short, long, default_value = "objects.bin")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let records = SourceRecord::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;
    log::info!("Read {} source records", records.len());

    let license = fs::read_to_string(&args.license)
        .with_context(|| format!("Failed to read license {}", args.license.display()))?;

    let proper_names = match &args.star_names {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read star names {}", path.display()))?;
            let names = ProperNames::from_csv_str(&text);
            log::info!("Loaded {} proper star names", names.len());
            Some(names)
        }
        None => None,
    };

    let custom_table = match &args.colors {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read color table {}", path.display()))?;
            Some(
                ColorTable::from_json_str(&json)
                    .with_context(|| format!("Invalid color table {}", path.display()))?,
            )
        }
        None => None,
    };
    let table = custom_table.as_ref().unwrap_or(ColorTable::builtin());

    let compiled = compile_catalog(&records, &license, table, proper_names.as_ref())
        .context("Failed to compile catalog")?;

    fs::write(&args.output, &compiled.bytes)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let report = &compiled.report;
    println!("Catalog written to {}", args.output.display());
    println!("  Records written:          {}", report.written);
    println!("  Missing spectral type:    {}", report.skipped_null_type);
    println!("  Unclassified:             {}", report.skipped_unclassified);
    println!("  Rejected (name too long): {}", report.rejected_long_names.len());
    println!("  Size:                     {} bytes", compiled.bytes.len());

    Ok(())
}
