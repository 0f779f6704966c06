//! Device-layer errors.

use thiserror::Error;

use crate::resolver::HandleKind;

/// Handle resolution failures. Fatal for the run: without a resolved
/// surface there is nothing to click.
#[derive(Error, Debug)]
pub enum HandleError {
    #[error("no {kind} handle matched for profile '{profile}'")]
    NotFound { kind: HandleKind, profile: String },
    #[error("profile '{profile}' has invalid display pattern '{pattern}': {reason}")]
    BadPattern {
        profile: String,
        pattern: String,
        reason: String,
    },
}

impl HandleError {
    /// Returns a helpful suggestion for resolving the error.
    pub fn suggestion(&self) -> String {
        match self {
            HandleError::NotFound { kind, profile } => format!(
                "Check that the target is running and that profile '{}' lists the right {} class/title matchers.",
                profile, kind
            ),
            HandleError::BadPattern { .. } => {
                "The display pattern must be a regex with two capture groups (width, height)."
                    .to_string()
            }
        }
    }
}

/// ADB transport failures. Command failures are transient (the device may be
/// rebooting or busy); a missing executable is not.
#[derive(Error, Debug)]
pub enum AdbError {
    #[error("failed to run adb '{path}': {reason}")]
    Spawn { path: String, reason: String },
    #[error("adb {operation} failed: {reason}")]
    CommandFailed { operation: String, reason: String },
    #[error("adb display output did not match the configured pattern")]
    DisplayParse,
}

impl AdbError {
    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdbError::CommandFailed { .. } | AdbError::DisplayParse
        )
    }
}
