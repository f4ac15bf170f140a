//! Remote query-generation service abstraction and its HTTP implementation.

mod http;

pub use http::HttpQueryService;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::files::SourceFile;

/// Body of `POST /generate_sql`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Natural-language prompt
    pub text: String,

    /// Identifier returned by the upload endpoint
    pub file_path: String,

    pub limit: usize,
    pub offset: usize,
}

/// Raw generate answer. The body is tabular text, left undecoded here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl GenerateResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Statuses of 500 and above carry no table.
    pub fn is_server_failure(&self) -> bool {
        self.status >= 500
    }
}

/// The two operations the session needs from the remote collaborator.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Upload a source file and return the identifier the service stored it
    /// under. Every failure is a [`QueryError::Upload`].
    async fn upload_file(&self, file: &SourceFile) -> Result<String, QueryError>;

    /// Run a generation request. Any answer that arrived is `Ok`, whatever its
    /// status; failing to get one is a [`QueryError::Transport`].
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_request_uses_wire_field_names() {
        let request = GenerateRequest {
            text: "top customers".into(),
            file_path: "/tmp/abc.csv".into(),
            limit: 10,
            offset: 20,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "text": "top customers",
                "filePath": "/tmp/abc.csv",
                "limit": 10,
                "offset": 20,
            })
        );
    }

    #[test]
    fn server_failure_threshold_is_500() {
        assert!(!GenerateResponse::new(499, "").is_server_failure());
        assert!(GenerateResponse::new(500, "").is_server_failure());
        assert!(GenerateResponse::new(503, "").is_server_failure());
    }
}
