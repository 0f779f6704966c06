//! Engine errors.
//!
//! A missed recognition is not an error (it drives the soft-retry path);
//! everything here is either fatal (`UnknownTask`, `NoProgress`) or a
//! transient collaborator failure the caller's retry policy decides about.

use pixelbot_core::UnknownTask;
use thiserror::Error;

/// Frame capture failures.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("capture transport failed: {0}")]
    Transport(String),
    #[error("frame decode failed: {0}")]
    Decode(String),
}

impl CaptureError {
    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CaptureError::Transport(_))
    }
}

/// Synthetic input failures.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("click dispatch failed: {0}")]
    Dispatch(String),
    #[error("control surface lost: {0}")]
    SurfaceLost(String),
}

impl ControlError {
    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ControlError::Dispatch(_))
    }
}

/// Recognition backend failures (distinct from a plain miss, which is `None`).
#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("template '{0}' not available to the recognition backend")]
    MissingTemplate(String),
    #[error("recognition backend failed: {0}")]
    Backend(String),
}

/// Screenshot storage failure.
#[derive(Error, Debug)]
#[error("failed to save screenshot: {0}")]
pub struct SinkError(pub String);

/// Failures while executing a matched task's action.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Screenshot(#[from] SinkError),
    #[error("task '{0}' clicks its matched region but the match carried no location")]
    MissingAnchor(String),
    #[error("task '{0}' clicks a fixed region but has none configured")]
    MissingRegion(String),
    #[error("resolved surface has no clickable area for task '{0}'")]
    EmptySurface(String),
}

impl ActionError {
    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ActionError::Control(e) => e.is_retryable(),
            ActionError::Capture(e) => e.is_retryable(),
            ActionError::Screenshot(_) => true,
            ActionError::MissingAnchor(_)
            | ActionError::MissingRegion(_)
            | ActionError::EmptySurface(_) => false,
        }
    }
}

/// Run-level errors surfaced by the scheduler, with enough context (task,
/// cycle) for the caller to decide whether to retry, pause or abort.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    UnknownTask(#[from] UnknownTask),
    #[error("capture failed at cycle {cycle}: {source}")]
    Capture {
        cycle: u64,
        #[source]
        source: CaptureError,
    },
    #[error("recognition failed at cycle {cycle}: {source}")]
    Recognize {
        cycle: u64,
        #[source]
        source: RecognizeError,
    },
    #[error("action for task '{task}' failed at cycle {cycle}: {source}")]
    Action {
        task: String,
        cycle: u64,
        #[source]
        source: ActionError,
    },
    #[error("no candidate matched at cycle {cycle} after {attempts} attempts (candidates: {candidates:?})")]
    NoProgress {
        cycle: u64,
        attempts: u32,
        candidates: Vec<String>,
    },
}

impl EngineError {
    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::Capture { source, .. } => source.is_retryable(),
            EngineError::Action { source, .. } => source.is_retryable(),
            EngineError::UnknownTask(_)
            | EngineError::Recognize { .. }
            | EngineError::NoProgress { .. } => false,
        }
    }

    /// The cycle the error occurred in, when it occurred inside the loop.
    pub fn cycle(&self) -> Option<u64> {
        match self {
            EngineError::Capture { cycle, .. }
            | EngineError::Recognize { cycle, .. }
            | EngineError::Action { cycle, .. }
            | EngineError::NoProgress { cycle, .. } => Some(*cycle),
            EngineError::UnknownTask(_) => None,
        }
    }
}
