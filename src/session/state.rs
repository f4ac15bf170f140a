use serde::Serialize;

use super::pagination::PaginationWindow;
use crate::error::QueryError;

/// Request lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Submitting,
    Loaded,
    Failed(SessionFailure),
}

impl SessionStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    pub fn failure(&self) -> Option<&SessionFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Generate answered with status >= 500.
    ServerSide,
    /// No usable answer: network, timeout or undecodable body.
    Transport,
}

/// Why the last submission failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&QueryError> for SessionFailure {
    fn from(err: &QueryError) -> Self {
        let kind = match err {
            QueryError::ServerSemantic { .. } => FailureKind::ServerSide,
            _ => FailureKind::Transport,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

/// Which user controls a front end should enable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ControlState {
    pub submit_enabled: bool,
    pub upload_enabled: bool,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub export_enabled: bool,
}

/// One data row with its 1-based position on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRow {
    pub index: usize,
    pub cells: Vec<String>,
}

/// Render-ready snapshot of the loaded page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub header: Vec<String>,
    pub rows: Vec<PageRow>,
    pub window: PaginationWindow,
    pub total_rows: usize,
}
