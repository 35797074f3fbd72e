use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sra_rnaseq_tools::matrix::aggregate_quant_dir;

#[derive(Parser)]
#[command(name = "make-counts-matrix")]
#[command(about = "Merge per-sample Salmon quantifications into one counts matrix TSV")]
#[command(version)]
struct Cli {
    /// Directory containing one subdirectory per sample, each with a quant.sf
    #[arg(long)]
    quant_dir: PathBuf,

    /// Destination TSV path
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let matrix = aggregate_quant_dir(&cli.quant_dir).into_diagnostic()?;
    matrix.write_tsv(&cli.out).into_diagnostic()?;
    Ok(())
}
