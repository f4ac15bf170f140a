//! Query session: prompt, uploaded-file reference, pagination window and the
//! request lifecycle `Idle → Submitting → Loaded | Failed`.
//!
//! The session is shared by reference. State sits behind a mutex that is never
//! held across an `.await`; overlapping submissions or uploads are rejected by
//! two independent in-flight guards rather than queued.

pub mod pagination;
pub mod state;

pub use pagination::PaginationWindow;
pub use state::{ControlState, FailureKind, PageRow, PageView, SessionFailure, SessionStatus};

use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::codec::TabularCodec;
use crate::config::{Config, SessionConfig};
use crate::error::{QueryError, Result, ValidationError};
use crate::export::{export_grid, ExportArtifact};
use crate::files::{has_accepted_extension, FileReference, SourceFile};
use crate::grid::Grid;
use crate::notify::{Notice, Notifier};
use crate::service::{GenerateRequest, GenerateResponse, HttpQueryService, QueryService};

const SUBMISSION: &str = "submission";
const UPLOAD: &str = "upload";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully!";

#[derive(Debug)]
struct SessionState {
    prompt: String,
    file_reference: Option<FileReference>,
    window: PaginationWindow,
    status: SessionStatus,
    grid: Grid,
    results_visible: bool,
}

impl SessionState {
    fn new(limit: NonZeroUsize) -> Self {
        Self {
            prompt: String::new(),
            file_reference: None,
            window: PaginationWindow::first_page(limit),
            status: SessionStatus::Idle,
            grid: Grid::new(),
            results_visible: false,
        }
    }

    /// Validate and, on success, enter `Submitting` with the grid cleared.
    fn begin_submission(&mut self) -> Result<GenerateRequest, ValidationError> {
        if self.prompt.is_empty() {
            return Err(ValidationError::MissingPrompt);
        }
        let file = self
            .file_reference
            .as_ref()
            .ok_or(ValidationError::MissingFile)?;
        let request = GenerateRequest {
            text: self.prompt.clone(),
            file_path: file.id().to_string(),
            limit: self.window.limit(),
            offset: self.window.offset(),
        };
        self.status = SessionStatus::Submitting;
        self.grid = Grid::new();
        self.results_visible = true;
        Ok(request)
    }

    fn finish_loaded(&mut self, grid: Grid) {
        self.grid = grid;
        self.status = SessionStatus::Loaded;
    }

    fn finish_failed(&mut self, err: &QueryError) {
        self.grid = Grid::new();
        self.results_visible = matches!(err, QueryError::ServerSemantic { .. });
        self.status = SessionStatus::Failed(SessionFailure::from(err));
    }
}

#[derive(Debug, Default)]
struct InFlight(AtomicBool);

impl InFlight {
    fn try_acquire(&self, operation: &'static str) -> Result<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| QueryError::Busy { operation })?;
        Ok(InFlightGuard(&self.0))
    }

    fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Puts a session back to `Idle`, with the results panel as it was before,
/// if a submission future is dropped mid-flight.
struct AbandonedSubmission<'a> {
    state: &'a Mutex<SessionState>,
    results_visible: bool,
    armed: bool,
}

impl Drop for AbandonedSubmission<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            if state.status == SessionStatus::Submitting {
                tracing::debug!("submission abandoned before completion");
                state.status = SessionStatus::Idle;
                state.results_visible = self.results_visible;
            }
        }
    }
}

pub struct QuerySession<S> {
    service: S,
    notifier: Arc<dyn Notifier>,
    codec: TabularCodec,
    config: SessionConfig,
    state: Mutex<SessionState>,
    submitting: InFlight,
    uploading: InFlight,
}

impl QuerySession<HttpQueryService> {
    /// Session talking to the configured HTTP service.
    pub fn connect(config: &Config, notifier: impl Notifier + 'static) -> Result<Self> {
        let service = HttpQueryService::new(&config.service)?;
        Self::new(service, config.session.clone(), notifier)
    }
}

impl<S: QueryService> QuerySession<S> {
    pub fn new(
        service: S,
        config: SessionConfig,
        notifier: impl Notifier + 'static,
    ) -> Result<Self> {
        let limit =
            NonZeroUsize::new(config.page_limit).ok_or(ValidationError::InvalidPageLimit)?;
        Ok(Self {
            service,
            notifier: Arc::new(notifier),
            codec: TabularCodec::new(),
            state: Mutex::new(SessionState::new(limit)),
            config,
            submitting: InFlight::default(),
            uploading: InFlight::default(),
        })
    }

    /// Use a non-default codec, e.g. another delimiter.
    #[must_use]
    pub fn with_codec(mut self, codec: TabularCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // --- prompt and file reference -------------------------------------

    /// Editing the prompt is allowed at any time, uploads and submissions
    /// included; the next submission reads whatever is current.
    pub fn set_prompt(&self, text: impl Into<String>) {
        self.state.lock().prompt = text.into();
    }

    pub fn prompt(&self) -> String {
        self.state.lock().prompt.clone()
    }

    pub fn file_reference(&self) -> Option<FileReference> {
        self.state.lock().file_reference.clone()
    }

    /// Upload a source file and make it the session's file reference.
    ///
    /// On failure the previous reference, if any, is kept.
    pub async fn upload(&self, file: &SourceFile) -> Result<FileReference> {
        let _in_flight = self.uploading.try_acquire(UPLOAD)?;

        if !has_accepted_extension(&file.name, &self.config.accepted_extensions) {
            let err = QueryError::upload(format!(
                "Unsupported file type: {}. Accepted: {}",
                file.name,
                self.config.accepted_extensions.join(", ")
            ));
            self.notifier.notify(Notice::warning(err.to_string()));
            return Err(err);
        }

        match self.service.upload_file(file).await {
            Ok(id) => {
                let reference = FileReference::new(id);
                self.state.lock().file_reference = Some(reference.clone());
                tracing::info!(
                    file = %file.name,
                    bytes = file.len(),
                    file_path = %reference.id(),
                    "source file uploaded"
                );
                self.notifier.notify(Notice::info(UPLOAD_SUCCESS_MESSAGE));
                Ok(reference)
            }
            Err(err) => {
                let err = match err {
                    QueryError::Upload { .. } => err,
                    other => QueryError::upload(other.to_string()),
                };
                tracing::warn!(file = %file.name, error = %err, "upload failed");
                self.notifier.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    // --- submission ----------------------------------------------------

    /// Send the current prompt, file reference and window to the service.
    pub async fn submit(&self) -> Result<()> {
        let _in_flight = self.submitting.try_acquire(SUBMISSION)?;
        self.run_submission(None).await
    }

    /// Advance one page and re-submit. The window stays put when the
    /// submission fails validation.
    pub async fn next_page(&self) -> Result<()> {
        let _in_flight = self.submitting.try_acquire(SUBMISSION)?;
        let previous = {
            let mut state = self.state.lock();
            let previous = state.window;
            state.window.advance();
            previous
        };
        self.run_submission(Some(previous)).await
    }

    /// Go back one page and re-submit. Returns `false`, without submitting,
    /// when already on the first page.
    pub async fn prev_page(&self) -> Result<bool> {
        let _in_flight = self.submitting.try_acquire(SUBMISSION)?;
        let previous = {
            let mut state = self.state.lock();
            let previous = state.window;
            if !state.window.retreat() {
                return Ok(false);
            }
            previous
        };
        self.run_submission(Some(previous)).await.map(|()| true)
    }

    /// Caller must hold the submission guard. `restore` is the window to go
    /// back to if validation rejects the submission.
    async fn run_submission(&self, restore: Option<PaginationWindow>) -> Result<()> {
        let (prepared, results_visible) = {
            let mut state = self.state.lock();
            let results_visible = state.results_visible;
            let prepared = state.begin_submission();
            if let (Err(_), Some(window)) = (&prepared, restore) {
                state.window = window;
            }
            (prepared, results_visible)
        };
        let request = match prepared {
            Ok(request) => request,
            Err(err) => {
                self.notifier.notify(Notice::warning(err.to_string()));
                return Err(err.into());
            }
        };
        tracing::info!(
            limit = request.limit,
            offset = request.offset,
            file_path = %request.file_path,
            "submitting query"
        );

        let mut abandoned = AbandonedSubmission {
            state: &self.state,
            results_visible,
            armed: true,
        };
        let outcome = match self.service.generate(&request).await {
            Ok(response) => self.decode_response(response),
            Err(err) => Err(err),
        };
        abandoned.armed = false;

        match outcome {
            Ok(grid) => {
                let rows = grid.data_row_count();
                self.state.lock().finish_loaded(grid);
                tracing::info!(rows, offset = request.offset, "query results loaded");
                Ok(())
            }
            Err(err) => {
                self.state.lock().finish_failed(&err);
                tracing::warn!(error = %err, offset = request.offset, "query failed");
                self.notifier.notify(Notice::error(err.to_string()));
                Err(err)
            }
        }
    }

    fn decode_response(&self, response: GenerateResponse) -> Result<Grid> {
        if response.is_server_failure() {
            return Err(QueryError::ServerSemantic {
                status: response.status,
            });
        }
        let grid = self.codec.decode(&response.body)?;
        tracing::debug!(
            status = response.status,
            bytes = response.body.len(),
            rows = grid.len(),
            "decoded tabular response"
        );
        Ok(grid)
    }

    // --- pagination ----------------------------------------------------

    pub fn window(&self) -> PaginationWindow {
        self.state.lock().window
    }

    /// Change the page size. The window returns to the first page; nothing is
    /// re-submitted.
    pub fn set_page_limit(&self, limit: usize) -> Result<()> {
        let _in_flight = self.submitting.try_acquire(SUBMISSION)?;
        let limit = NonZeroUsize::new(limit).ok_or(ValidationError::InvalidPageLimit)?;
        let mut state = self.state.lock();
        state.window = state.window.with_limit(limit);
        Ok(())
    }

    // --- results -------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.state.lock().status.clone()
    }

    /// The loaded grid, header first. Empty unless `Loaded`.
    pub fn grid(&self) -> Grid {
        self.state.lock().grid.clone()
    }

    /// Data rows of the loaded page, header excluded.
    pub fn total_rows(&self) -> usize {
        self.state.lock().grid.data_row_count()
    }

    /// Whether a results panel should be shown.
    pub fn is_results_visible(&self) -> bool {
        self.state.lock().results_visible
    }

    pub fn page_view(&self) -> Option<PageView> {
        let state = self.state.lock();
        if !state.status.is_loaded() {
            return None;
        }
        let header = state.grid.header().map(<[String]>::to_vec).unwrap_or_default();
        let rows = state
            .grid
            .data_rows()
            .iter()
            .enumerate()
            .map(|(i, cells)| PageRow {
                index: i + 1,
                cells: cells.clone(),
            })
            .collect();
        Some(PageView {
            header,
            rows,
            window: state.window,
            total_rows: state.grid.data_row_count(),
        })
    }

    pub fn controls(&self) -> ControlState {
        let submitting = self.submitting.is_active();
        let uploading = self.uploading.is_active();
        let state = self.state.lock();
        ControlState {
            submit_enabled: !submitting,
            upload_enabled: !uploading,
            previous_enabled: !submitting && state.window.has_previous(),
            next_enabled: !submitting && state.window.has_next(state.grid.data_row_count()),
            export_enabled: !submitting && !state.grid.is_empty(),
        }
    }

    /// Encode the loaded grid for download.
    pub fn export_current(&self) -> Result<ExportArtifact> {
        let grid = self.grid();
        export_grid(&grid, &self.codec, &self.config.export_file_name).inspect_err(|err| {
            self.notifier.notify(Notice::warning(err.to_string()));
        })
    }

    /// Forget prompt, file reference and results. Rejected while anything is
    /// in flight.
    pub fn reset(&self) -> Result<()> {
        let _submitting = self.submitting.try_acquire(SUBMISSION)?;
        let _uploading = self.uploading.try_acquire(UPLOAD)?;
        let mut state = self.state.lock();
        let limit = NonZeroUsize::new(self.config.page_limit).unwrap_or(NonZeroUsize::MIN);
        *state = SessionState::new(limit);
        tracing::debug!("session reset");
        Ok(())
    }
}
