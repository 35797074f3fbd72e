use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sra_rnaseq_tools::domain::parse_bool;
use sra_rnaseq_tools::fs_util;
use sra_rnaseq_tools::matrix::CountsMatrix;
use sra_rnaseq_tools::pca::pca_scores;
use sra_rnaseq_tools::plot;
use sra_rnaseq_tools::sheet::SampleSheet;

#[derive(Parser)]
#[command(name = "summarize-qc")]
#[command(about = "Generate QC summary plots from quantification results")]
#[command(version)]
struct Cli {
    /// Path to the sample sheet CSV
    #[arg(long)]
    samples: PathBuf,

    /// Merged counts matrix TSV
    #[arg(long)]
    quant: PathBuf,

    /// Directory for plots
    #[arg(long)]
    outdir: PathBuf,

    /// Whether to compute PCA (true/1/yes/y or false/0/no/n)
    #[arg(long, default_value = "true")]
    make_pca: String,
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
    let make_pca = parse_bool(&cli.make_pca).into_diagnostic()?;

    let sheet = SampleSheet::read(&cli.samples).into_diagnostic()?;
    let matrix = CountsMatrix::read_tsv(&cli.quant).into_diagnostic()?;
    fs_util::ensure_dir(&cli.outdir).into_diagnostic()?;

    let sizes = matrix.library_sizes().into_diagnostic()?;
    plot::library_size_barplot(&sizes, &cli.outdir.join("library_sizes.png")).into_diagnostic()?;

    let pca_path = cli.outdir.join("pca.png");
    if make_pca {
        let samples = sheet.sample_ids();
        let tpm_rows = matrix.tpm_rows_for_samples(&samples).into_diagnostic()?;
        let pca = pca_scores(&samples, &tpm_rows).into_diagnostic()?;
        plot::pca_scatter_plot(&pca, &pca_path).into_diagnostic()?;
    } else {
        plot::placeholder_pca(&pca_path).into_diagnostic()?;
    }
    Ok(())
}
