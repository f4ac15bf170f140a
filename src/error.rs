//! Error types shared by the service client and the query session.

use thiserror::Error;

use crate::codec::CodecError;

/// Message shown when the generate endpoint answers with a 5xx status.
pub const SERVER_SEMANTIC_MESSAGE: &str =
    "Internal Server Error or prompt entered is not relevant to the file.";

/// Fallback when the upload endpoint rejects the file without saying why.
pub const UPLOAD_FAILED_MESSAGE: &str = "File upload failed.";

/// Fallback when the upload request never got an answer.
pub const UPLOAD_UNEXPECTED_MESSAGE: &str =
    "An unexpected error occurred while uploading the file.";

/// Precondition failures detected before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a prompt")]
    MissingPrompt,

    #[error("Please upload a file")]
    MissingFile,

    #[error("Page limit must be a positive integer")]
    InvalidPageLimit,
}

/// Errors produced by session and service operations.
///
/// Every variant ends only the operation that raised it; the session stays
/// usable afterwards.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Upload { message: String },

    #[error("{}", SERVER_SEMANTIC_MESSAGE)]
    ServerSemantic { status: u16 },

    #[error("{message}")]
    Transport { message: String },

    #[error("No data available to download")]
    EmptyResult,

    #[error("Failed to prepare the download: {message}")]
    Export { message: String },

    #[error("Another {operation} is already in progress")]
    Busy { operation: &'static str },
}

impl QueryError {
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// True for the failures that move a session to `Failed`.
    pub fn is_generate_failure(&self) -> bool {
        matches!(self, Self::ServerSemantic { .. } | Self::Transport { .. })
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}

impl From<CodecError> for QueryError {
    fn from(err: CodecError) -> Self {
        Self::transport(err.to_string())
    }
}

pub type Result<T, E = QueryError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_user_notices() {
        assert_eq!(
            QueryError::from(ValidationError::MissingPrompt).to_string(),
            "Please enter a prompt"
        );
        assert_eq!(
            QueryError::from(ValidationError::MissingFile).to_string(),
            "Please upload a file"
        );
    }

    #[test]
    fn server_semantic_hides_status_from_message() {
        let err = QueryError::ServerSemantic { status: 503 };
        assert_eq!(err.to_string(), SERVER_SEMANTIC_MESSAGE);
        assert!(err.is_generate_failure());
    }

    #[test]
    fn codec_errors_become_transport_failures() {
        let err = QueryError::from(CodecError::Malformed {
            line: 4,
            message: "record truncated".into(),
        });
        assert!(matches!(err, QueryError::Transport { .. }));
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn busy_and_empty_are_not_generate_failures() {
        assert!(!QueryError::EmptyResult.is_generate_failure());
        assert!(!QueryError::Busy { operation: "submission" }.is_generate_failure());
    }
}
