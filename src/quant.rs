use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::PipelineError;

pub const QUANT_FILE_NAME: &str = "quant.sf";

const REQUIRED_COLUMNS: [&str; 3] = ["Name", "TPM", "NumReads"];

/// One transcript row of a Salmon `quant.sf` file. Extra columns such
/// as `Length` and `EffectiveLength` are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct QuantRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "TPM")]
    pub tpm: f64,
    #[serde(rename = "NumReads")]
    pub num_reads: f64,
}

/// Scan the quant directory for per-sample subdirectories containing a
/// `quant.sf` file, sorted by sample name. Subdirectories without the
/// file are silently skipped.
pub fn discover_quant_files(quant_dir: &Path) -> Result<Vec<(String, PathBuf)>, PipelineError> {
    let entries = fs::read_dir(quant_dir).map_err(|err| {
        PipelineError::Filesystem(format!("read {}: {err}", quant_dir.display()))
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| PipelineError::Filesystem(err.to_string()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let quant_file = path.join(QUANT_FILE_NAME);
        if !quant_file.is_file() {
            debug!(dir = %path.display(), "no quant.sf, skipping");
            continue;
        }
        let Some(sample) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        found.push((sample.to_string(), quant_file));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(found)
}

/// Load a `quant.sf` file, keeping only the `Name`, `TPM` and
/// `NumReads` columns.
pub fn load_quant_file(path: &Path) -> Result<Vec<QuantRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|err| PipelineError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let headers = reader
        .headers()
        .map_err(|err| PipelineError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(PipelineError::MissingQuantColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut records = Vec::new();
    for record in reader.deserialize::<QuantRecord>() {
        let record = record.map_err(|err| PipelineError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}
