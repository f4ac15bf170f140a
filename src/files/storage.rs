use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use super::mime::guess_mime_type;

/// A source file held in memory, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    /// Build from bytes already in memory; the MIME type is guessed from `name`.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name);
        Self {
            name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Read a local file. `~` is expanded.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand(path.as_ref());
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .with_context(|| format!("Source path has no file name: {}", path.display()))?;
        let bytes = fs::read(&path)
            .await
            .with_context(|| format!("Failed to read source file {}", path.display()))?;
        Ok(Self::new(name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub(crate) fn expand(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).to_string()),
        None => path.to_path_buf(),
    }
}
