//! Source files and the reference to the most recent upload.
//!
//! Handles loading a local tabular file, MIME guessing, the accepted-extension
//! check, and the `FileReference` the service hands back after an upload.

pub mod mime;
pub mod schema;
pub mod storage;

pub use mime::{guess_mime_type, has_accepted_extension};
pub use schema::{FileReference, UploadErrorBody, UploadResponse};
pub use storage::SourceFile;
