use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::warn;

use crate::domain::{BioProject, RunAccession};
use crate::error::PipelineError;
use crate::fetch::MetadataSource;
use crate::sheet::SampleRow;

const ENA_PORTAL_URL: &str = "https://www.ebi.ac.uk/ena/portal/api/filereport";

/// One `read_run` record from the ENA portal filereport endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EnaRun {
    pub run_accession: String,
    #[serde(default)]
    pub sample_alias: String,
    #[serde(default)]
    pub sample_title: String,
}

#[derive(Clone)]
pub struct EnaHttpClient {
    client: Client,
    base_url: String,
}

impl EnaHttpClient {
    pub fn new() -> Result<Self, PipelineError> {
        Self::with_base_url(ENA_PORTAL_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PipelineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sra-rnaseq-tools/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PipelineError::EnaHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| PipelineError::EnaHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl MetadataSource for EnaHttpClient {
    fn name(&self) -> &'static str {
        "ENA portal"
    }

    fn fetch_runs(&self, project: &BioProject) -> Result<Vec<SampleRow>, PipelineError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("accession", project.as_str()),
                ("result", "read_run"),
                ("fields", "run_accession,sample_alias,sample_title"),
                ("format", "json"),
            ])
            .send()
            .map_err(|err| PipelineError::EnaHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "ENA request failed".to_string());
            return Err(PipelineError::EnaStatus { status, message });
        }
        let records: Vec<EnaRun> = response
            .json()
            .map_err(|err| PipelineError::EnaHttp(err.to_string()))?;
        Ok(rows_from_records(records))
    }
}

/// Normalize filereport records: `sample_id` is the most specific
/// non-blank field, falling back to the run accession itself.
pub fn rows_from_records(records: Vec<EnaRun>) -> Vec<SampleRow> {
    let mut rows = Vec::new();
    for record in records {
        let run: RunAccession = match record.run_accession.parse() {
            Ok(run) => run,
            Err(_) => {
                warn!(value = %record.run_accession, "skipping malformed run accession");
                continue;
            }
        };
        let sample_id = [&record.sample_alias, &record.sample_title]
            .into_iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| run.as_str().to_string());
        rows.push(SampleRow {
            sample_id,
            condition: "NA".to_string(),
            sra_run: run.as_str().to_string(),
        });
    }
    rows
}
