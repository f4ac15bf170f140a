//! querygrid: natural-language queries over an uploaded tabular file.
//!
//! Upload a CSV, describe the query in plain words, page through the table the
//! remote service generates, and export the current page back to CSV.
//!
//! ```no_run
//! use querygrid::{Config, QuerySession, SourceFile, TracingNotifier};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let session = QuerySession::connect(&Config::from_env()?, TracingNotifier)?;
//! session.upload(&SourceFile::from_path("~/orders.csv").await?).await?;
//! session.set_prompt("Find the top 10 customers with the most orders");
//! session.submit().await?;
//! session.next_page().await?;
//! session.export_current()?.save_to("~/Downloads").await?;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod files;
pub mod grid;
pub mod logging;
pub mod notify;
pub mod service;
pub mod session;

pub use codec::{CodecError, TabularCodec};
pub use config::{Config, ConfigError, ServiceConfig, SessionConfig};
pub use error::{QueryError, ValidationError};
pub use export::ExportArtifact;
pub use files::{FileReference, SourceFile};
pub use grid::{Grid, Row};
pub use logging::init_logging;
pub use notify::{ChannelNotifier, Notice, NoticeLevel, Notifier, TracingNotifier};
pub use service::{GenerateRequest, GenerateResponse, HttpQueryService, QueryService};
pub use session::{
    ControlState, FailureKind, PageRow, PageView, PaginationWindow, QuerySession, SessionFailure,
    SessionStatus,
};
