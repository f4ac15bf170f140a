use serde::{Deserialize, Serialize};

/// Identifier of an uploaded source file, as returned by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileReference {
    id: String,
}

impl FileReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Opaque path/identifier sent back as `filePath` when generating.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last `/`-separated segment of the identifier.
    pub fn display_name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Successful upload answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_path: String,
}

/// Optional body of a rejected upload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
