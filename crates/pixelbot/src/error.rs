//! Top-level CLI errors, aggregating every layer's failures with a
//! suggestion and a conventional sysexits code.

use std::path::PathBuf;

use pixelbot_core::ConfigError;
use pixelbot_device::{AdbError, HandleError};
use pixelbot_engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("profile '{0}' not found in the configuration")]
    UnknownProfile(String),
    #[error("profile '{0}' has no adb endpoint; native window capture is not wired into this binary")]
    NativeUnsupported(String),
    #[error(transparent)]
    Handle(#[from] HandleError),
    #[error(transparent)]
    Adb(#[from] AdbError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CliError {
    /// Returns a helpful suggestion for resolving the error, when one exists.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CliError::Io { path, .. } => Some(format!(
                "Check that '{}' exists and is readable.",
                path.display()
            )),
            CliError::Config(e) => Some(e.suggestion()),
            CliError::UnknownProfile(_) => {
                Some("List configured profiles with 'pixelbot check'.".to_string())
            }
            CliError::NativeUnsupported(_) => {
                Some("Add an 'adb' section to the profile and run through the emulator's adb port.".to_string())
            }
            CliError::Handle(e) => Some(e.suggestion()),
            CliError::Adb(AdbError::Spawn { .. }) => {
                Some("Check the profile's adb path; is adb installed?".to_string())
            }
            CliError::Adb(_) => None,
            CliError::Engine(EngineError::NoProgress { .. }) => Some(
                "No candidate task matched the screen for the whole retry budget. Is the game on the expected screen?"
                    .to_string(),
            ),
            CliError::Engine(_) => None,
        }
    }

    /// Returns whether this error is potentially transient and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            CliError::Adb(e) => e.is_retryable(),
            CliError::Engine(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Process exit code, following sysexits conventions.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => 66,                                        // EX_NOINPUT
            CliError::Config(_) | CliError::UnknownProfile(_) => 64,          // EX_USAGE
            CliError::NativeUnsupported(_) | CliError::Handle(_) => 69,       // EX_UNAVAILABLE
            CliError::Adb(_) => 74,                                           // EX_IOERR
            CliError::Engine(EngineError::NoProgress { .. }) => 75,           // EX_TEMPFAIL
            CliError::Engine(_) => 74,                                        // EX_IOERR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_carries_suggestion() {
        let err = CliError::from(ConfigError::DuplicateTask("a".into()));
        assert!(err.suggestion().is_some());
        assert_eq!(err.exit_code(), 64);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_adb_retryability_propagates() {
        let err = CliError::from(AdbError::CommandFailed {
            operation: "click".into(),
            reason: "device offline".into(),
        });
        assert!(err.is_retryable());
        assert_eq!(err.exit_code(), 74);
    }

    #[test]
    fn test_no_progress_is_tempfail() {
        let err = CliError::from(EngineError::NoProgress {
            cycle: 10,
            attempts: 120,
            candidates: vec!["a".into()],
        });
        assert_eq!(err.exit_code(), 75);
        assert!(err.suggestion().is_some());
    }
}
