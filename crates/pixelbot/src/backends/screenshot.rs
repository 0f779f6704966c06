//! Screenshot storage: frames land as PNG files in a directory.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbaImage;
use pixelbot_engine::{Frame, ScreenshotSink, SinkError};

/// Writes frames to `dir` as `<epoch-seconds>-<sequence>.png`. The directory
/// is created on first save.
pub struct FileSink {
    dir: PathBuf,
    sequence: u32,
}

impl FileSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, sequence: 0 }
    }
}

impl ScreenshotSink for FileSink {
    fn save(&mut self, frame: &Frame) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| SinkError(e.to_string()))?;
        self.sequence += 1;
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let path = self.dir.join(format!("{stamp}-{:04}.png", self.sequence));

        let image = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
            .ok_or_else(|| {
                SinkError(format!(
                    "frame buffer does not hold {}x{} rgba pixels",
                    frame.width, frame.height
                ))
            })?;
        image.save(&path).map_err(|e| SinkError(e.to_string()))?;
        Ok(path)
    }
}
