//! Mock collaborators for engine tests.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pixelbot_common::mutex_lock_or_recover;
use pixelbot_core::{Point, Rect};
use pixelbot_device::{NativeHandle, ResolvedSurface, SurfaceTarget};

use crate::backend::{
    CaptureSource, HistogramComparer, InputController, ScreenshotSink, TemplateMatch,
    TemplateMatcher,
};
use crate::error::{CaptureError, ControlError, RecognizeError, SinkError};
use crate::frame::Frame;

pub fn frame_1x1() -> Frame {
    Frame::new(1, 1, vec![0, 0, 0, 255])
}

pub fn test_surface(width: i32, height: i32) -> ResolvedSurface {
    ResolvedSurface::new(
        SurfaceTarget::Native(NativeHandle(1)),
        Rect::new(0, 0, width, height),
        Point::new(0, 0),
    )
}

/// Matcher backed by a template-name table. Tests insert hits up front (or
/// mid-run through a cloned handle) and the matcher honors thresholds the
/// way a real backend would.
#[derive(Default)]
pub struct MapMatcher {
    hits: Arc<Mutex<HashMap<String, TemplateMatch>>>,
}

impl MapMatcher {
    pub fn insert(&self, template: &str, hit: TemplateMatch) {
        mutex_lock_or_recover(&self.hits).insert(template.to_string(), hit);
    }

    pub fn remove(&self, template: &str) {
        mutex_lock_or_recover(&self.hits).remove(template);
    }

    pub fn handle(&self) -> Self {
        Self {
            hits: Arc::clone(&self.hits),
        }
    }
}

impl TemplateMatcher for MapMatcher {
    fn find(
        &self,
        _frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<TemplateMatch>, RecognizeError> {
        Ok(mutex_lock_or_recover(&self.hits)
            .get(template)
            .copied()
            .filter(|hit| hit.score >= threshold))
    }
}

/// Histogram comparer backed by a score table.
#[derive(Default)]
pub struct MapComparer {
    scores: Arc<Mutex<HashMap<String, f64>>>,
}

impl MapComparer {
    pub fn insert(&self, template: &str, score: f64) {
        mutex_lock_or_recover(&self.scores).insert(template.to_string(), score);
    }
}

impl HistogramComparer for MapComparer {
    fn compare(
        &self,
        _frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<f64>, RecognizeError> {
        Ok(mutex_lock_or_recover(&self.scores)
            .get(template)
            .copied()
            .filter(|score| *score >= threshold))
    }
}

/// Records click points; can be primed with failures to exercise the retry
/// path.
#[derive(Default)]
pub struct RecordingController {
    clicks: Arc<Mutex<Vec<Point>>>,
    failures: Arc<Mutex<VecDeque<ControlError>>>,
}

impl RecordingController {
    pub fn clicks(&self) -> Arc<Mutex<Vec<Point>>> {
        Arc::clone(&self.clicks)
    }

    pub fn fail_next(&self, error: ControlError) {
        mutex_lock_or_recover(&self.failures).push_back(error);
    }
}

impl InputController for RecordingController {
    fn click(&mut self, _surface: &ResolvedSurface, point: Point) -> Result<(), ControlError> {
        if let Some(error) = mutex_lock_or_recover(&self.failures).pop_front() {
            return Err(error);
        }
        mutex_lock_or_recover(&self.clicks).push(point);
        Ok(())
    }
}

/// Remembers every frame it was asked to save.
#[derive(Default)]
pub struct RecordingSink {
    saved: Arc<Mutex<Vec<Frame>>>,
}

impl RecordingSink {
    pub fn saved(&self) -> Arc<Mutex<Vec<Frame>>> {
        Arc::clone(&self.saved)
    }
}

impl ScreenshotSink for RecordingSink {
    fn save(&mut self, frame: &Frame) -> Result<PathBuf, SinkError> {
        let mut saved = mutex_lock_or_recover(&self.saved);
        saved.push(frame.clone());
        Ok(PathBuf::from(format!("screenshot-{}.png", saved.len())))
    }
}

/// Capture source that always produces a 1x1 frame.
pub struct NullCapture;

impl CaptureSource for NullCapture {
    fn capture(&mut self, _surface: &ResolvedSurface) -> Result<Frame, CaptureError> {
        Ok(frame_1x1())
    }
}

/// Capture source that fails transiently a fixed number of times before
/// succeeding.
pub struct FlakyCapture {
    pub failures_left: u32,
    pub attempts: Arc<Mutex<u32>>,
}

impl FlakyCapture {
    pub fn new(failures: u32) -> Self {
        Self {
            failures_left: failures,
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    pub fn attempts(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.attempts)
    }
}

impl CaptureSource for FlakyCapture {
    fn capture(&mut self, _surface: &ResolvedSurface) -> Result<Frame, CaptureError> {
        *mutex_lock_or_recover(&self.attempts) += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(CaptureError::Transport("connection reset".into()));
        }
        Ok(frame_1x1())
    }
}
