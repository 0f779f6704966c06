//! Load-time errors for the task graph and runtime options.
//!
//! Everything here is fatal: a run never starts from a config that fails
//! validation, and an [`UnknownTask`] lookup is a programming error in the
//! caller, not a recoverable condition.

use thiserror::Error;

/// Malformed or inconsistent configuration, detected at registry build time.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate task name: {0}")]
    DuplicateTask(String),
    #[error("task '{task}' references unknown task '{target}' in {field}")]
    UnresolvedReference {
        task: String,
        field: &'static str,
        target: String,
    },
    #[error("task '{0}' has no template but its algorithm requires one")]
    MissingTemplate(String),
    #[error("task '{task}' has {field} {value} outside [0.0, 1.0]")]
    InvalidThreshold {
        task: String,
        field: &'static str,
        value: f64,
    },
    #[error("click_rect task '{0}' has a missing or empty action_region")]
    InvalidActionRegion(String),
    #[error("control delay bounds inverted: lower {lower}ms > upper {upper}ms")]
    InvalidDelayBounds { lower: u64, upper: u64 },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Returns a helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> String {
        match self {
            ConfigError::DuplicateTask(name) => {
                format!("Rename one of the tasks called '{}'; names are the graph's keys.", name)
            }
            ConfigError::UnresolvedReference { target, .. } => format!(
                "Define a task named '{}' or remove the reference. The sentinel 'stop' is always available.",
                target
            ),
            ConfigError::MissingTemplate(name) => format!(
                "Give task '{}' a template image, or set its algorithm to 'just_return'.",
                name
            ),
            ConfigError::InvalidThreshold { .. } => {
                "Thresholds are match scores and must lie in [0.0, 1.0].".to_string()
            }
            ConfigError::InvalidActionRegion(name) => format!(
                "Task '{}' clicks inside a fixed rectangle; give it an action_region with positive width and height.",
                name
            ),
            ConfigError::InvalidDelayBounds { .. } => {
                "Swap control_delay_lower_ms and control_delay_upper_ms.".to_string()
            }
            ConfigError::Parse(_) => "Check the JSON syntax of the config file.".to_string(),
        }
    }
}

/// A task name was looked up that the registry does not contain.
#[derive(Error, Debug)]
#[error("unknown task: {0}")]
pub struct UnknownTask(pub String);
