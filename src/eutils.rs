use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::{BioProject, RunAccession};
use crate::error::PipelineError;
use crate::fetch::MetadataSource;
use crate::sheet::SampleRow;

const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

#[derive(Debug, Deserialize)]
struct EsearchEnvelope {
    esearchresult: EsearchResult,
}

#[derive(Debug, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

#[derive(Clone)]
pub struct EutilsHttpClient {
    client: Client,
    base_url: String,
}

impl EutilsHttpClient {
    pub fn new() -> Result<Self, PipelineError> {
        Self::with_base_url(EUTILS_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, PipelineError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("sra-rnaseq-tools/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| PipelineError::EutilsHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| PipelineError::EutilsHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, PipelineError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "E-utilities request failed".to_string());
        Err(PipelineError::EutilsStatus { status, message })
    }

    fn esearch_ids(&self, project: &BioProject) -> Result<Vec<String>, PipelineError> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("db", "sra"),
                ("term", project.as_str()),
                ("retmode", "json"),
            ])
            .send()
            .map_err(|err| PipelineError::EutilsHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let envelope: EsearchEnvelope = response
            .json()
            .map_err(|err| PipelineError::EutilsHttp(err.to_string()))?;
        Ok(envelope.esearchresult.idlist)
    }

    fn efetch_runinfo(&self, ids: &[String]) -> Result<String, PipelineError> {
        let url = format!("{}/efetch.fcgi", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("db", "sra"),
                ("retmode", "text"),
                ("rettype", "runinfo"),
                ("id", ids.join(",").as_str()),
            ])
            .send()
            .map_err(|err| PipelineError::EutilsHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| PipelineError::EutilsHttp(err.to_string()))
    }
}

impl MetadataSource for EutilsHttpClient {
    fn name(&self) -> &'static str {
        "NCBI E-utilities"
    }

    fn fetch_runs(&self, project: &BioProject) -> Result<Vec<SampleRow>, PipelineError> {
        let ids = self.esearch_ids(project)?;
        if ids.is_empty() {
            warn!(project = %project, "esearch returned no SRA identifiers");
            return Ok(Vec::new());
        }
        info!(project = %project, ids = ids.len(), "fetching runinfo");
        let csv_text = self.efetch_runinfo(&ids)?;
        if csv_text.trim().is_empty() {
            warn!(project = %project, "efetch returned empty runinfo");
            return Ok(Vec::new());
        }
        rows_from_runinfo(&csv_text)
    }
}

/// Normalize a runinfo CSV payload. A payload without a `Run` column
/// counts as "no data" rather than a hard failure.
pub fn rows_from_runinfo(csv_text: &str) -> Result<Vec<SampleRow>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| PipelineError::EutilsHttp(err.to_string()))?
        .clone();
    let position = |name: &str| headers.iter().position(|header| header == name);
    let Some(run_idx) = position("Run") else {
        warn!("runinfo did not include a Run column");
        return Ok(Vec::new());
    };
    let sample_name_idx = position("SampleName");
    let biosample_idx = position("BioSample");

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| PipelineError::EutilsHttp(err.to_string()))?;
        let Some(run_value) = record.get(run_idx) else {
            continue;
        };
        // runinfo pages occasionally repeat the header line
        if run_value == "Run" {
            continue;
        }
        let run: RunAccession = match run_value.parse() {
            Ok(run) => run,
            Err(_) => {
                warn!(value = %run_value, "skipping malformed run accession");
                continue;
            }
        };
        let sample_id = [sample_name_idx, biosample_idx]
            .into_iter()
            .flatten()
            .filter_map(|idx| record.get(idx))
            .map(str::trim)
            .find(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| run.as_str().to_string());
        rows.push(SampleRow {
            sample_id,
            condition: "NA".to_string(),
            sra_run: run.as_str().to_string(),
        });
    }
    Ok(rows)
}
