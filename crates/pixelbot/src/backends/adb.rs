//! Capture and input collaborators backed by the ADB process transport.

use pixelbot_core::Point;
use pixelbot_device::{AdbError, AdbTransport, ResolvedSurface};
use pixelbot_engine::{CaptureError, CaptureSource, ControlError, Frame, InputController};

/// Captures frames through the profile's screencap command and decodes the
/// PNG bytes it writes to stdout.
pub struct AdbCapture {
    transport: AdbTransport,
}

impl AdbCapture {
    pub fn new(transport: AdbTransport) -> Self {
        Self { transport }
    }
}

impl CaptureSource for AdbCapture {
    fn capture(&mut self, _surface: &ResolvedSurface) -> Result<Frame, CaptureError> {
        let bytes = self
            .transport
            .capture()
            .map_err(|e| CaptureError::Transport(e.to_string()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| CaptureError::Decode(e.to_string()))?
            .to_rgba8();
        Ok(Frame::new(image.width(), image.height(), image.into_raw()))
    }
}

/// Issues clicks through the profile's tap command, translating surface
/// coordinates to device coordinates first.
pub struct AdbInput {
    transport: AdbTransport,
}

impl AdbInput {
    pub fn new(transport: AdbTransport) -> Self {
        Self { transport }
    }
}

impl InputController for AdbInput {
    fn click(&mut self, surface: &ResolvedSurface, point: Point) -> Result<(), ControlError> {
        let device_point = surface.to_device(point);
        self.transport.click(device_point).map_err(|e| match e {
            AdbError::Spawn { .. } => ControlError::SurfaceLost(e.to_string()),
            _ => ControlError::Dispatch(e.to_string()),
        })
    }
}
