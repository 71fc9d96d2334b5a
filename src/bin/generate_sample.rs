use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use nyc311_check::sample::write_sample_csv;

/// Write a synthetic 311 extract with coordinates scattered around NYC.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    #[arg(long, default_value_t = 1000)]
    rows: usize,
    #[arg(long, default_value = "sample_311.csv")]
    output: PathBuf,
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    write_sample_csv(BufWriter::new(file), args.rows, args.seed)
        .context("writing sample CSV")?;

    println!("Wrote {} requests to {}", args.rows, args.output.display());
    Ok(())
}
