//! The task-graph execution engine.
//!
//! Given a captured frame, the engine decides which candidate task matches,
//! executes its action, updates per-task execution counters (with cross-task
//! decrements), and advances to the task's candidate list, repeating until a
//! terminal task fires or the caller's retry policy gives up.
//!
//! Pixel matching, window enumeration, ADB transport and screenshot storage
//! are collaborator traits ([`backend`]); the engine owns only the
//! bookkeeping and ordering invariants.

#![deny(clippy::all)]

pub mod backend;
pub mod context;
pub mod error;
pub mod executor;
pub mod frame;
pub mod recognize;
pub mod scheduler;

#[cfg(test)]
pub mod test_support;

pub use backend::CaptureSource;
pub use backend::Collaborators;
pub use backend::HistogramComparer;
pub use backend::InputController;
pub use backend::ScreenshotSink;
pub use backend::TemplateMatch;
pub use backend::TemplateMatcher;
pub use context::ExecutionContext;
pub use context::TaskFired;
pub use error::ActionError;
pub use error::CaptureError;
pub use error::ControlError;
pub use error::EngineError;
pub use error::RecognizeError;
pub use error::SinkError;
pub use executor::ActionExecutor;
pub use frame::Frame;
pub use recognize::MatchOutcome;
pub use recognize::Recognizer;
pub use scheduler::RetryPolicy;
pub use scheduler::RunSummary;
pub use scheduler::Scheduler;
pub use scheduler::StopReason;
