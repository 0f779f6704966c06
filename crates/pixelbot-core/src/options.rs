//! Runtime options read by the recognizer and the action executor.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Run-wide tuning knobs. Immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Allow histogram-compare recognition as a cheap pre-filter. When off,
    /// histogram tasks fall back to template matching.
    pub identify_cache: bool,
    /// Delay between recognition attempts after a miss.
    pub identify_delay_ms: u64,
    /// Lower bound of the random post-click delay (humanized timing).
    pub control_delay_lower_ms: u64,
    /// Upper bound of the random post-click delay.
    pub control_delay_upper_ms: u64,
    /// Whether capture_screen tasks actually save a screenshot.
    pub screenshot_enabled: bool,
    /// Settle time before the screenshot is taken, for result screens that
    /// animate in.
    pub screenshot_settle_ms: u64,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            identify_cache: false,
            identify_delay_ms: 500,
            control_delay_lower_ms: 100,
            control_delay_upper_ms: 400,
            screenshot_enabled: false,
            screenshot_settle_ms: 1500,
        }
    }
}

impl RuntimeOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_delay_lower_ms > self.control_delay_upper_ms {
            return Err(ConfigError::InvalidDelayBounds {
                lower: self.control_delay_lower_ms,
                upper: self.control_delay_upper_ms,
            });
        }
        Ok(())
    }
}
