//! ADB endpoint descriptors and the process transport built on them.
//!
//! Command templates come from the device profile; this module only
//! substitutes coordinates, splits arguments and runs the adb executable.

use std::process::Command;

use pixelbot_core::Point;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{AdbError, HandleError};
use crate::profile::AdbSpec;

/// A validated ADB connection descriptor, produced by handle resolution.
#[derive(Debug, Clone)]
pub struct AdbEndpoint {
    path: String,
    connect: String,
    click: String,
    capture: String,
    display: String,
    display_pattern: Regex,
    display_width: u32,
    display_height: u32,
}

impl AdbEndpoint {
    /// Validate an [`AdbSpec`], compiling its display pattern.
    pub fn from_spec(spec: &AdbSpec, profile: &str) -> Result<Self, HandleError> {
        let display_pattern =
            Regex::new(&spec.display_pattern).map_err(|e| HandleError::BadPattern {
                profile: profile.to_string(),
                pattern: spec.display_pattern.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path: spec.path.clone(),
            connect: spec.connect.clone(),
            click: spec.click.clone(),
            capture: spec.capture.clone(),
            display: spec.display.clone(),
            display_pattern,
            display_width: spec.display_width,
            display_height: spec.display_height,
        })
    }

    pub fn executable(&self) -> &str {
        &self.path
    }

    pub fn connect_args(&self) -> Vec<String> {
        split_args(&self.connect)
    }

    pub fn capture_args(&self) -> Vec<String> {
        split_args(&self.capture)
    }

    pub fn display_args(&self) -> Vec<String> {
        split_args(&self.display)
    }

    /// Click command arguments with `{x}`/`{y}` substituted. The point must
    /// already be in device coordinates.
    pub fn click_args(&self, point: Point) -> Vec<String> {
        let rendered = self
            .click
            .replace("{x}", &point.x.to_string())
            .replace("{y}", &point.y.to_string());
        split_args(&rendered)
    }

    /// Extract `(width, height)` from a display dump using the configured
    /// pattern's first two capture groups.
    pub fn parse_display_size(&self, output: &str) -> Option<(u32, u32)> {
        let captures = self.display_pattern.captures(output)?;
        let width = captures.get(1)?.as_str().parse().ok()?;
        let height = captures.get(2)?.as_str().parse().ok()?;
        Some((width, height))
    }

    /// Display size the profile's coordinates assume.
    pub fn nominal_display(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    /// Coordinate scale factor for an actual display width.
    pub fn scale_for(&self, actual_width: u32) -> f64 {
        if self.display_width == 0 {
            return 1.0;
        }
        actual_width as f64 / self.display_width as f64
    }
}

fn split_args(template: &str) -> Vec<String> {
    template.split_whitespace().map(str::to_string).collect()
}

/// Runs adb commands for one endpoint.
pub struct AdbTransport {
    endpoint: AdbEndpoint,
}

impl AdbTransport {
    pub fn new(endpoint: AdbEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &AdbEndpoint {
        &self.endpoint
    }

    /// Establish the connection (e.g. `adb connect <addr>`).
    pub fn connect(&self) -> Result<(), AdbError> {
        self.run("connect", &self.endpoint.connect_args())?;
        Ok(())
    }

    /// Issue a click at device coordinates.
    pub fn click(&self, device_point: Point) -> Result<(), AdbError> {
        trace!(x = device_point.x, y = device_point.y, "adb click");
        self.run("click", &self.endpoint.click_args(device_point))?;
        Ok(())
    }

    /// Capture the screen; returns the raw bytes the capture command wrote
    /// to stdout (typically PNG data).
    pub fn capture(&self) -> Result<Vec<u8>, AdbError> {
        self.run("capture", &self.endpoint.capture_args())
    }

    /// Query the actual display size through the display dump command.
    pub fn display_size(&self) -> Result<(u32, u32), AdbError> {
        let output = self.run("display", &self.endpoint.display_args())?;
        let text = String::from_utf8_lossy(&output);
        self.endpoint
            .parse_display_size(&text)
            .ok_or(AdbError::DisplayParse)
    }

    fn run(&self, operation: &str, args: &[String]) -> Result<Vec<u8>, AdbError> {
        debug!(operation, ?args, "running adb command");
        let output = Command::new(self.endpoint.executable())
            .args(args)
            .output()
            .map_err(|e| AdbError::Spawn {
                path: self.endpoint.executable().to_string(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(AdbError::CommandFailed {
                operation: operation.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}
