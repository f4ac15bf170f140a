//! Turns the loaded grid into a downloadable CSV artifact.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::codec::TabularCodec;
use crate::error::QueryError;
use crate::files::storage::expand;
use crate::grid::Grid;

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// Encoded grid plus the name it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write into `dir`, creating it if needed. Returns the written path.
    pub async fn save_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = expand(dir.as_ref());
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create export directory {}", dir.display()))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)
            .await
            .with_context(|| format!("Failed to write export {}", path.display()))?;
        Ok(path)
    }
}

/// Encode the whole grid. A grid with no rows has nothing to export.
pub fn export_grid(
    grid: &Grid,
    codec: &TabularCodec,
    file_name: &str,
) -> Result<ExportArtifact, QueryError> {
    if grid.is_empty() {
        return Err(QueryError::EmptyResult);
    }
    Ok(ExportArtifact {
        file_name: file_name.to_string(),
        content_type: CSV_CONTENT_TYPE,
        bytes: codec.encode(grid).map_err(|err| QueryError::Export {
            message: err.to_string(),
        })?,
    })
}
