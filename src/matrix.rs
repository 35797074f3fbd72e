use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::PipelineError;
use crate::fs_util;
use crate::quant::{discover_quant_files, load_quant_file};

pub const TPM_SUFFIX: &str = "_TPM";
pub const NUM_READS_SUFFIX: &str = "_NumReads";

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

/// Wide table keyed by transcript id with two columns per sample.
/// Cells absent from a sample's quantification are 0.0: no expression,
/// not "unknown".
#[derive(Debug, Clone, Default)]
pub struct CountsMatrix {
    pub transcript_ids: Vec<String>,
    pub columns: Vec<Column>,
}

/// Merge every `<sample>/quant.sf` under `quant_dir` into one matrix.
/// Errors if the directory holds no quantification files at all.
pub fn aggregate_quant_dir(quant_dir: &Path) -> Result<CountsMatrix, PipelineError> {
    let files = discover_quant_files(quant_dir)?;
    if files.is_empty() {
        return Err(PipelineError::NoQuantFiles(quant_dir.to_path_buf()));
    }
    CountsMatrix::from_quant_files(&files)
}

impl CountsMatrix {
    /// Outer-join quantification files in the given (sample-sorted)
    /// order. Transcripts keep first-seen row order.
    pub fn from_quant_files(files: &[(String, PathBuf)]) -> Result<Self, PipelineError> {
        let mut transcript_ids: Vec<String> = Vec::new();
        let mut row_index: HashMap<String, usize> = HashMap::new();
        let mut columns: Vec<Column> = Vec::new();

        for (sample, path) in files {
            let records = load_quant_file(path)?;
            let mut tpm = vec![0.0; transcript_ids.len()];
            let mut num_reads = vec![0.0; transcript_ids.len()];
            for record in records {
                let row = match row_index.get(&record.name) {
                    Some(&row) => row,
                    None => {
                        let row = transcript_ids.len();
                        row_index.insert(record.name.clone(), row);
                        transcript_ids.push(record.name);
                        row
                    }
                };
                if row >= tpm.len() {
                    tpm.resize(row + 1, 0.0);
                    num_reads.resize(row + 1, 0.0);
                }
                tpm[row] = record.tpm;
                num_reads[row] = record.num_reads;
            }
            columns.push(Column {
                name: format!("{sample}{TPM_SUFFIX}"),
                values: tpm,
            });
            columns.push(Column {
                name: format!("{sample}{NUM_READS_SUFFIX}"),
                values: num_reads,
            });
        }

        // transcripts first seen in a later sample leave holes in
        // earlier columns; fill them with zero
        for column in &mut columns {
            column.values.resize(transcript_ids.len(), 0.0);
        }

        Ok(Self {
            transcript_ids,
            columns,
        })
    }

    pub fn num_transcripts(&self) -> usize {
        self.transcript_ids.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    fn suffix_columns(&self, suffix: &str) -> Vec<(String, &[f64])> {
        self.columns
            .iter()
            .filter_map(|column| {
                column
                    .name
                    .strip_suffix(suffix)
                    .map(|sample| (sample.to_string(), column.values.as_slice()))
            })
            .collect()
    }

    /// `(sample, values)` pairs for every `*_NumReads` column, in
    /// matrix column order.
    pub fn num_reads_columns(&self) -> Result<Vec<(String, &[f64])>, PipelineError> {
        let columns = self.suffix_columns(NUM_READS_SUFFIX);
        if columns.is_empty() {
            return Err(PipelineError::NoMatrixColumns("*_NumReads"));
        }
        Ok(columns)
    }

    /// `(sample, values)` pairs for every `*_TPM` column, in matrix
    /// column order.
    pub fn tpm_columns(&self) -> Result<Vec<(String, &[f64])>, PipelineError> {
        let columns = self.suffix_columns(TPM_SUFFIX);
        if columns.is_empty() {
            return Err(PipelineError::NoMatrixColumns("*_TPM"));
        }
        Ok(columns)
    }

    /// Per-sample sum of mapped reads, in matrix column order.
    pub fn library_sizes(&self) -> Result<Vec<(String, f64)>, PipelineError> {
        Ok(self
            .num_reads_columns()?
            .into_iter()
            .map(|(sample, values)| (sample, values.iter().sum()))
            .collect())
    }

    /// One TPM row per requested sample, in the requested order.
    pub fn tpm_rows_for_samples(&self, samples: &[String]) -> Result<Vec<Vec<f64>>, PipelineError> {
        let tpm_columns = self.tpm_columns()?;
        let by_sample: HashMap<&str, &[f64]> = tpm_columns
            .iter()
            .map(|(sample, values)| (sample.as_str(), *values))
            .collect();
        samples
            .iter()
            .map(|sample| {
                by_sample
                    .get(sample.as_str())
                    .map(|values| values.to_vec())
                    .ok_or_else(|| PipelineError::UnknownSample(sample.clone()))
            })
            .collect()
    }

    pub fn write_tsv(&self, path: &Path) -> Result<(), PipelineError> {
        fs_util::ensure_parent_dir(path)?;
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(path)
            .map_err(|err| {
                PipelineError::Filesystem(format!("create {}: {err}", path.display()))
            })?;

        let mut header = vec!["transcript_id".to_string()];
        header.extend(self.columns.iter().map(|column| column.name.clone()));
        writer
            .write_record(&header)
            .map_err(|err| PipelineError::Filesystem(err.to_string()))?;

        for (row, transcript) in self.transcript_ids.iter().enumerate() {
            let mut record = vec![transcript.clone()];
            record.extend(self.columns.iter().map(|column| column.values[row].to_string()));
            writer
                .write_record(&record)
                .map_err(|err| PipelineError::Filesystem(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| PipelineError::Filesystem(err.to_string()))?;
        info!(
            transcripts = self.transcript_ids.len(),
            columns = self.columns.len(),
            path = %path.display(),
            "wrote counts matrix"
        );
        Ok(())
    }

    pub fn read_tsv(path: &Path) -> Result<Self, PipelineError> {
        let text = fs::read_to_string(path).map_err(|err| {
            PipelineError::Filesystem(format!("read {}: {err}", path.display()))
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|err| PipelineError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
            .clone();
        if headers.get(0) != Some("transcript_id") {
            return Err(PipelineError::Parse {
                path: path.to_path_buf(),
                message: "first column must be transcript_id".to_string(),
            });
        }

        let mut columns: Vec<Column> = headers
            .iter()
            .skip(1)
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();
        let mut transcript_ids = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| PipelineError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
            let Some(transcript) = record.get(0) else {
                continue;
            };
            transcript_ids.push(transcript.to_string());
            for (column, value) in columns.iter_mut().zip(record.iter().skip(1)) {
                let value = value.parse::<f64>().map_err(|err| PipelineError::Parse {
                    path: path.to_path_buf(),
                    message: format!("column {}: {err}", column.name),
                })?;
                column.values.push(value);
            }
        }

        Ok(Self {
            transcript_ids,
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn matrix_with(columns: Vec<(&str, Vec<f64>)>) -> CountsMatrix {
        let rows = columns.first().map(|(_, values)| values.len()).unwrap_or(0);
        CountsMatrix {
            transcript_ids: (0..rows).map(|i| format!("ENST{i:04}")).collect(),
            columns: columns
                .into_iter()
                .map(|(name, values)| Column {
                    name: name.to_string(),
                    values,
                })
                .collect(),
        }
    }

    #[test]
    fn library_sizes_sum_num_reads_per_sample() {
        let matrix = matrix_with(vec![
            ("Sample1_TPM", vec![10.0, 5.0]),
            ("Sample1_NumReads", vec![50.0, 25.0]),
            ("Sample2_TPM", vec![20.0, 15.0]),
            ("Sample2_NumReads", vec![60.0, 35.0]),
        ]);
        let sizes = matrix.library_sizes().unwrap();
        assert_eq!(
            sizes,
            vec![("Sample1".to_string(), 75.0), ("Sample2".to_string(), 95.0)]
        );
    }

    #[test]
    fn missing_num_reads_columns_is_an_error() {
        let matrix = matrix_with(vec![("Sample1_TPM", vec![10.0])]);
        let err = matrix.library_sizes().unwrap_err();
        assert_matches!(err, PipelineError::NoMatrixColumns("*_NumReads"));
    }

    #[test]
    fn tpm_rows_follow_requested_sample_order() {
        let matrix = matrix_with(vec![
            ("Sample1_TPM", vec![10.0, 5.0]),
            ("Sample2_TPM", vec![20.0, 15.0]),
        ]);
        let rows = matrix
            .tpm_rows_for_samples(&["Sample2".to_string(), "Sample1".to_string()])
            .unwrap();
        assert_eq!(rows, vec![vec![20.0, 15.0], vec![10.0, 5.0]]);
    }

    #[test]
    fn unknown_sample_is_an_error() {
        let matrix = matrix_with(vec![("Sample1_TPM", vec![10.0])]);
        let err = matrix
            .tpm_rows_for_samples(&["SampleX".to_string()])
            .unwrap_err();
        assert_matches!(err, PipelineError::UnknownSample(sample) if sample == "SampleX");
    }
}
