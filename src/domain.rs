use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// NCBI BioProject accession, e.g. `PRJNA123456`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BioProject(String);

impl BioProject {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BioProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BioProject {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let digits = normalized
            .strip_prefix("PRJNA")
            .or_else(|| normalized.strip_prefix("PRJEB"))
            .or_else(|| normalized.strip_prefix("PRJDB"));
        let is_valid = digits
            .map(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
            .unwrap_or(false);
        if !is_valid {
            return Err(PipelineError::InvalidBioProject(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// SRA run accession, e.g. `SRR014966` (ERR/DRR for ENA and DDBJ runs).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RunAccession(String);

impl RunAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunAccession {
    type Err = PipelineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_uppercase();
        let digits = normalized
            .strip_prefix("SRR")
            .or_else(|| normalized.strip_prefix("ERR"))
            .or_else(|| normalized.strip_prefix("DRR"));
        let is_valid = digits
            .map(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
            .unwrap_or(false);
        if !is_valid {
            return Err(PipelineError::InvalidRunAccession(value.to_string()));
        }
        Ok(Self(normalized))
    }
}

/// Permissive textual boolean used by the `--make-pca` flag.
pub fn parse_bool(value: &str) -> Result<bool, PipelineError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(PipelineError::InvalidBool(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_bioproject_valid() {
        let acc: BioProject = "prjna123456".parse().unwrap();
        assert_eq!(acc.as_str(), "PRJNA123456");
    }

    #[test]
    fn parse_bioproject_invalid() {
        let err = "PRJXX123".parse::<BioProject>().unwrap_err();
        assert_matches!(err, PipelineError::InvalidBioProject(_));
        let err = "PRJNA".parse::<BioProject>().unwrap_err();
        assert_matches!(err, PipelineError::InvalidBioProject(_));
    }

    #[test]
    fn parse_run_accession_valid() {
        let acc: RunAccession = "SRR014966".parse().unwrap();
        assert_eq!(acc.as_str(), "SRR014966");
        let acc: RunAccession = "err1000001".parse().unwrap();
        assert_eq!(acc.as_str(), "ERR1000001");
    }

    #[test]
    fn parse_run_accession_invalid() {
        let err = "SRX014966".parse::<RunAccession>().unwrap_err();
        assert_matches!(err, PipelineError::InvalidRunAccession(_));
    }

    #[test]
    fn parse_bool_accepts_permissive_true() {
        for value in ["true", "TRUE", "1", "yes", "Y", " y "] {
            assert!(parse_bool(value).unwrap(), "{value:?} should parse true");
        }
    }

    #[test]
    fn parse_bool_accepts_permissive_false() {
        for value in ["false", "False", "0", "no", "N", " n "] {
            assert!(!parse_bool(value).unwrap(), "{value:?} should parse false");
        }
    }

    #[test]
    fn parse_bool_rejects_everything_else() {
        for value in ["", "maybe", "2", "yep", "truthy"] {
            assert_matches!(parse_bool(value), Err(PipelineError::InvalidBool(_)));
        }
    }
}
