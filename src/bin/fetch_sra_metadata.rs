use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use sra_rnaseq_tools::domain::BioProject;
use sra_rnaseq_tools::ena::EnaHttpClient;
use sra_rnaseq_tools::error::PipelineError;
use sra_rnaseq_tools::eutils::EutilsHttpClient;
use sra_rnaseq_tools::fetch::MetadataFetcher;
use sra_rnaseq_tools::sheet::EXAMPLE_SHEET;

#[derive(Parser)]
#[command(name = "fetch-sra-metadata")]
#[command(about = "Generate a sample sheet CSV from an NCBI BioProject accession")]
#[command(version)]
struct Cli {
    /// BioProject accession, e.g. PRJNA123456
    #[arg(long)]
    bioproject: String,

    /// Destination CSV path (e.g. config/samples.csv)
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
    let project: BioProject = cli.bioproject.parse().into_diagnostic()?;

    let primary = EnaHttpClient::new().into_diagnostic()?;
    let fallback = EutilsHttpClient::new().into_diagnostic()?;
    let fetcher = MetadataFetcher::new(primary, fallback);

    let sheet = match fetcher.fetch_sample_sheet(&project) {
        Ok(sheet) => sheet,
        Err(PipelineError::NoMetadata(_)) => {
            eprintln!(
                "Unable to retrieve metadata for {project}. Check your network connection.\n\
                 Create the sample sheet manually using the following structure:\n\
                 {EXAMPLE_SHEET}\
                 Expected output location: {}",
                cli.out.display()
            );
            return Err(PipelineError::NoMetadata(project.to_string()).into());
        }
        Err(err) => return Err(err.into()),
    };

    sheet.write(&cli.out).into_diagnostic()?;
    Ok(())
}
