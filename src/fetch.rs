use tracing::{info, warn};

use crate::domain::BioProject;
use crate::error::PipelineError;
use crate::sheet::{SampleRow, SampleSheet};

/// A remote lookup that resolves a BioProject to candidate sample rows.
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &'static str;
    fn fetch_runs(&self, project: &BioProject) -> Result<Vec<SampleRow>, PipelineError>;
}

/// Primary-then-fallback metadata retrieval. Any failure of a source
/// (transport, status, malformed payload) is soft: it is logged and the
/// next source is tried. There is exactly one fallback and no retries.
pub struct MetadataFetcher<P: MetadataSource, F: MetadataSource> {
    primary: P,
    fallback: F,
}

impl<P: MetadataSource, F: MetadataSource> MetadataFetcher<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    pub fn fetch_sample_sheet(&self, project: &BioProject) -> Result<SampleSheet, PipelineError> {
        let mut rows = self.try_source(&self.primary, project);
        if rows.is_empty() {
            info!(source = self.fallback.name(), "falling back");
            rows = self.try_source(&self.fallback, project);
        }

        let mut sheet = SampleSheet::new(rows);
        sheet.dedup_by_run();
        sheet.sort_by_sample_id();
        if sheet.is_empty() {
            return Err(PipelineError::NoMetadata(project.to_string()));
        }
        Ok(sheet)
    }

    fn try_source(&self, source: &dyn MetadataSource, project: &BioProject) -> Vec<SampleRow> {
        info!(source = source.name(), project = %project, "querying run metadata");
        match source.fetch_runs(project) {
            Ok(rows) if rows.is_empty() => {
                warn!(source = source.name(), project = %project, "no runs returned");
                Vec::new()
            }
            Ok(rows) => {
                info!(source = source.name(), runs = rows.len(), "retrieved runs");
                rows
            }
            Err(err) => {
                warn!(source = source.name(), error = %err, "lookup failed");
                Vec::new()
            }
        }
    }
}
