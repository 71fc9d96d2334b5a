use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use nyc311_check::check::nyc_311_checks;
use nyc311_check::data::loader::load_file;
use nyc311_check::report::{run_checks, Status};
use nyc311_check::DEFAULT_DATA_PATH;

#[derive(Parser)]
#[command(name = "nyc311-check")]
#[command(about = "Check the NYC 311 extract's column count and coordinate medians")]
struct Cli {
    /// Dataset to check (.csv, .json or .parquet).
    #[arg(long, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,
    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(Status::SetupError.code())
        }
    }
}

/// Load the dataset and report on every check.  A load failure is returned
/// as an error; check failures are part of the report.
fn run(cli: &Cli) -> Result<Status> {
    let dataset = load_file(&cli.data)
        .with_context(|| format!("loading {}", cli.data.display()))?;

    let report = run_checks(&dataset, &nyc_311_checks());
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(report.status())
}
