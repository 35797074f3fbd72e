use std::fs;
use std::path::Path;

use crate::error::PipelineError;

pub fn ensure_dir(path: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(path)
        .map_err(|err| PipelineError::Filesystem(format!("create {}: {err}", path.display())))
}

/// Create the parent directory of an output file, if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    Ok(())
}
