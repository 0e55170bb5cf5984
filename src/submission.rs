//! Upload state machine
//!
//! ```text
//!   Idle ──submit──▶ Uploading ──ok──▶ Succeeded(result)
//!    ▲                   │
//!    │                   └──err──▶ Failed(info)
//!    └──────reset─────── Succeeded / Failed
//! ```
//!
//! The controller runs on a single cooperative thread. The only suspension
//! point is the transport call inside [`SubmissionController::submit`]; the
//! `Uploading` tag is the whole concurrency control, so a second submit that
//! arrives while the first is suspended sees it and backs off.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::cell::{Cell, RefCell};

use crate::analysis::AnalysisResult;
use crate::normalize::{normalize_json, MalformedPayload};
use crate::selection::VideoFile;
use crate::transport::{TransportError, UploadTransport};

/// Why a submission ended in `Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    MalformedPayload,
}

/// What the user is told about a failed submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub kind: FailureKind,
    pub message: String,
}

impl From<TransportError> for ErrorInfo {
    fn from(e: TransportError) -> Self {
        ErrorInfo {
            kind: FailureKind::Transport,
            message: e.to_string(),
        }
    }
}

impl From<MalformedPayload> for ErrorInfo {
    fn from(e: MalformedPayload) -> Self {
        ErrorInfo {
            kind: FailureKind::MalformedPayload,
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Uploading,
    Succeeded(AnalysisResult),
    Failed(ErrorInfo),
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Uploading => "uploading",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Succeeded(_) | SubmissionState::Failed(_))
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            SubmissionState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            SubmissionState::Failed(info) => Some(info),
            _ => None,
        }
    }
}

/// Errors returned by the controller itself. None of them changes state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("no video selected")]
    NoFileSelected,

    #[error("the last submission failed; reset before submitting again")]
    ResetRequired,

    #[error("an upload is in flight; wait for it to settle before resetting")]
    ResetWhileUploading,
}

/// How a `submit` call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// Another submission was already in flight; nothing was sent
    AlreadyUploading,
}

/// Owner of the single live [`SubmissionState`]
#[derive(Debug)]
pub struct SubmissionController<T> {
    transport: T,
    state: RefCell<SubmissionState>,
    requests_issued: Cell<u64>,
    started_at: Cell<Option<DateTime<Local>>>,
    settled_at: Cell<Option<DateTime<Local>>>,
}

impl<T> SubmissionController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: RefCell::new(SubmissionState::Idle),
            requests_issued: Cell::new(0),
            started_at: Cell::new(None),
            settled_at: Cell::new(None),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn is_uploading(&self) -> bool {
        matches!(*self.state.borrow(), SubmissionState::Uploading)
    }

    /// Number of requests sent over the controller's lifetime
    pub fn requests_issued(&self) -> u64 {
        self.requests_issued.get()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.started_at.get()
    }

    pub fn settled_at(&self) -> Option<DateTime<Local>> {
        self.settled_at.get()
    }

    /// Return to `Idle`, dropping any held result or error.
    ///
    /// Refused while uploading: the pending response would otherwise land on
    /// a state the user already moved past.
    pub fn reset(&self) -> Result<(), SubmissionError> {
        if self.is_uploading() {
            return Err(SubmissionError::ResetWhileUploading);
        }
        self.transition(SubmissionState::Idle);
        self.started_at.set(None);
        self.settled_at.set(None);
        Ok(())
    }

    fn transition(&self, next: SubmissionState) {
        let previous = self.state.replace(next);
        let current = self.state.borrow();
        if previous.name() != current.name() {
            tracing::info!(from = previous.name(), to = current.name(), "submission state");
        }
    }
}

impl<T: UploadTransport> SubmissionController<T> {
    /// Send `file` for analysis and wait for the outcome.
    ///
    /// Exactly one request is issued per accepted call. Transport and payload
    /// errors end in `Failed`; they are not returned as `Err`.
    pub async fn submit(&self, file: Option<&VideoFile>) -> Result<SubmitOutcome, SubmissionError> {
        let file = file.ok_or(SubmissionError::NoFileSelected)?;

        match *self.state.borrow() {
            SubmissionState::Uploading => {
                tracing::debug!("submit ignored, upload already in flight");
                return Ok(SubmitOutcome::AlreadyUploading);
            }
            SubmissionState::Failed(_) => return Err(SubmissionError::ResetRequired),
            SubmissionState::Idle | SubmissionState::Succeeded(_) => {}
        }

        self.transition(SubmissionState::Uploading);
        self.requests_issued.set(self.requests_issued.get() + 1);
        self.started_at.set(Some(Local::now()));
        self.settled_at.set(None);

        let settled = match self.transport.upload(file).await {
            Ok(body) => normalize_json(&body).map_err(ErrorInfo::from),
            Err(e) => Err(ErrorInfo::from(e)),
        };

        self.settled_at.set(Some(Local::now()));
        match settled {
            Ok(result) => {
                tracing::info!(
                    frames = result.frames.len(),
                    anomalies = result.anomaly_count(),
                    warnings = result.warnings.len(),
                    "analysis received"
                );
                self.transition(SubmissionState::Succeeded(result));
                Ok(SubmitOutcome::Succeeded)
            }
            Err(info) => {
                tracing::warn!(kind = ?info.kind, "submission failed: {}", info.message);
                self.transition(SubmissionState::Failed(info));
                Ok(SubmitOutcome::Failed)
            }
        }
    }
}
