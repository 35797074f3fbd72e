use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::fs_util;

pub const REQUIRED_COLUMNS: [&str; 3] = ["sample_id", "condition", "sra_run"];

/// Shown on stderr when metadata retrieval fails, so the sheet can be
/// created by hand.
pub const EXAMPLE_SHEET: &str =
    "sample_id,condition,sra_run\nSampleA,NA,SRR0000001\nSampleB,NA,SRR0000002\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRow {
    pub sample_id: String,
    pub condition: String,
    pub sra_run: String,
}

#[derive(Debug, Clone, Default)]
pub struct SampleSheet {
    pub rows: Vec<SampleRow>,
}

impl SampleSheet {
    pub fn new(rows: Vec<SampleRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sample_ids(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.sample_id.clone()).collect()
    }

    /// Drop rows whose run accession was already seen; the first
    /// occurrence wins.
    pub fn dedup_by_run(&mut self) {
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row.sra_run.clone()));
    }

    pub fn sort_by_sample_id(&mut self) {
        self.rows
            .sort_by(|a, b| a.sample_id.cmp(&b.sample_id).then(a.sra_run.cmp(&b.sra_run)));
    }

    /// Load a sheet and validate that the three required columns are
    /// present and non-blank in every row.
    pub fn read(path: &Path) -> Result<Self, PipelineError> {
        let mut reader = csv::Reader::from_path(path).map_err(|err| PipelineError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

        let headers: HashSet<String> = reader
            .headers()
            .map_err(|err| PipelineError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?
            .iter()
            .map(|name| name.to_string())
            .collect();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| !headers.contains(*name))
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingColumns {
                path: path.to_path_buf(),
                columns: missing.join(", "),
            });
        }

        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<SampleRow>().enumerate() {
            let row = record.map_err(|err| PipelineError::Parse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;
            for (column, value) in [
                ("sample_id", &row.sample_id),
                ("condition", &row.condition),
                ("sra_run", &row.sra_run),
            ] {
                if value.trim().is_empty() {
                    return Err(PipelineError::BlankField {
                        path: path.to_path_buf(),
                        column,
                        row: index + 1,
                    });
                }
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    pub fn write(&self, path: &Path) -> Result<(), PipelineError> {
        fs_util::ensure_parent_dir(path)?;
        let mut writer = csv::Writer::from_path(path).map_err(|err| {
            PipelineError::Filesystem(format!("create {}: {err}", path.display()))
        })?;
        for row in &self.rows {
            writer
                .serialize(row)
                .map_err(|err| PipelineError::Filesystem(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| PipelineError::Filesystem(err.to_string()))?;
        info!(rows = self.rows.len(), path = %path.display(), "wrote sample sheet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sample: &str, run: &str) -> SampleRow {
        SampleRow {
            sample_id: sample.to_string(),
            condition: "NA".to_string(),
            sra_run: run.to_string(),
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut sheet = SampleSheet::new(vec![
            row("A", "SRR0000001"),
            row("B", "SRR0000001"),
            row("C", "SRR0000002"),
        ]);
        sheet.dedup_by_run();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rows[0].sample_id, "A");
        assert_eq!(sheet.rows[1].sample_id, "C");
    }

    #[test]
    fn sort_orders_by_sample_id() {
        let mut sheet = SampleSheet::new(vec![
            row("beta", "SRR0000002"),
            row("alpha", "SRR0000001"),
        ]);
        sheet.sort_by_sample_id();
        assert_eq!(sheet.sample_ids(), vec!["alpha", "beta"]);
    }

    #[test]
    fn example_sheet_has_required_header() {
        let header = EXAMPLE_SHEET.lines().next().unwrap();
        assert_eq!(header, REQUIRED_COLUMNS.join(","));
    }
}
