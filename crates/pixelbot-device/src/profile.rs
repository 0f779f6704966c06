//! Device profiles: how to find a target's windows, how to talk to it over
//! ADB, and how its chrome offsets map device pixels to game-surface pixels.

use pixelbot_core::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Class/title matcher for a native window, view or control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleSpec {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub title: String,
}

/// ADB connection descriptor. All command fields are whitespace-split
/// argument templates passed to the configured adb executable; click
/// templates may contain `{x}`/`{y}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdbSpec {
    /// Path to the adb executable.
    pub path: String,
    /// Arguments that establish the connection, e.g. `connect 127.0.0.1:7555`.
    pub connect: String,
    /// Click command template, e.g. `shell input tap {x} {y}`.
    pub click: String,
    /// Screen capture command, e.g. `exec-out screencap -p`.
    #[serde(default = "default_capture_args")]
    pub capture: String,
    /// Display size dump command.
    pub display: String,
    /// Regex with two capture groups extracting width and height from the
    /// display dump output.
    pub display_pattern: String,
    /// Display size the click/capture coordinates in the profile assume.
    pub display_width: u32,
    pub display_height: u32,
}

fn default_capture_args() -> String {
    "exec-out screencap -p".to_string()
}

/// One supported emulator or device. Loaded once, immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub window: Vec<HandleSpec>,
    #[serde(default)]
    pub view: Vec<HandleSpec>,
    #[serde(default)]
    pub control: Vec<HandleSpec>,
    #[serde(default)]
    pub adb: Option<AdbSpec>,
    /// Full device surface size in pixels.
    pub width: u32,
    pub height: u32,
    /// Emulator chrome not part of the game surface, in device pixels.
    #[serde(default)]
    pub left_offset: i32,
    #[serde(default)]
    pub top_offset: i32,
    #[serde(default)]
    pub right_offset: i32,
    #[serde(default)]
    pub bottom_offset: i32,
}

impl DeviceProfile {
    /// Game-surface bounds after offset correction, origin at (0, 0).
    pub fn surface_bounds(&self) -> Rect {
        Rect::new(
            0,
            0,
            self.width as i32 - self.left_offset - self.right_offset,
            self.height as i32 - self.top_offset - self.bottom_offset,
        )
    }

    /// Translation from game-surface coordinates to device coordinates.
    pub fn surface_offset(&self) -> Point {
        Point::new(self.left_offset, self.top_offset)
    }
}
