use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("invalid BioProject accession: {0}")]
    InvalidBioProject(String),

    #[error("invalid SRA run accession: {0}")]
    InvalidRunAccession(String),

    #[error("cannot parse boolean from {0:?} (expected true/1/yes/y or false/0/no/n)")]
    InvalidBool(String),

    #[error("ENA request failed: {0}")]
    EnaHttp(String),

    #[error("ENA returned status {status}: {message}")]
    EnaStatus { status: u16, message: String },

    #[error("E-utilities request failed: {0}")]
    EutilsHttp(String),

    #[error("E-utilities returned status {status}: {message}")]
    EutilsStatus { status: u16, message: String },

    #[error("no run metadata available for {0} from any source")]
    NoMetadata(String),

    #[error("missing required columns in {}: {columns}", path.display())]
    MissingColumns { path: PathBuf, columns: String },

    #[error("sample sheet {} has blank {column} in row {row}", path.display())]
    BlankField {
        path: PathBuf,
        column: &'static str,
        row: usize,
    },

    #[error("no quant.sf files found under {}", .0.display())]
    NoQuantFiles(PathBuf),

    #[error("quantification file {} is missing column {column}", path.display())]
    MissingQuantColumn { path: PathBuf, column: String },

    #[error("counts matrix has no {0} columns")]
    NoMatrixColumns(&'static str),

    #[error("sample {0} from the sample sheet has no TPM column in the counts matrix")]
    UnknownSample(String),

    #[error("PCA requires at least two samples, got {0}")]
    TooFewSamples(usize),

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("plot rendering failed: {0}")]
    Plot(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
