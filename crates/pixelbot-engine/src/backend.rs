//! Collaborator traits at the engine's seams.
//!
//! Each trait mirrors one external contract: frame capture, template
//! matching, histogram comparison, input control, screenshot storage. The
//! engine addresses every implementation uniformly through a
//! [`ResolvedSurface`], native window and ADB endpoint alike.

use std::path::PathBuf;

use pixelbot_core::{Point, Rect};
use pixelbot_device::ResolvedSurface;

use crate::error::{CaptureError, ControlError, RecognizeError, SinkError};
use crate::frame::Frame;

/// A successful template match: score plus the matched bounding box in
/// game-surface coordinates. The box is what lets click-self tasks click
/// their own match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
    pub score: f64,
    pub bounds: Rect,
}

/// Frame capture collaborator. Consumed once per scheduler cycle, plus once
/// more per capture_screen task.
pub trait CaptureSource: Send {
    fn capture(&mut self, surface: &ResolvedSurface) -> Result<Frame, CaptureError>;
}

/// Template matching collaborator.
pub trait TemplateMatcher: Send {
    /// Find `template` in `frame`; `None` when the best score is below
    /// `threshold`.
    fn find(
        &self,
        frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<TemplateMatch>, RecognizeError>;
}

/// Histogram comparison collaborator; cheaper and coarser than template
/// matching.
pub trait HistogramComparer: Send {
    /// Compare `frame` against `template`'s histogram; `None` when the score
    /// is below `threshold`.
    fn compare(
        &self,
        frame: &Frame,
        template: &str,
        threshold: f64,
    ) -> Result<Option<f64>, RecognizeError>;
}

/// Synthetic input collaborator. `point` is in game-surface coordinates;
/// implementations translate via [`ResolvedSurface::to_device`].
pub trait InputController: Send {
    fn click(&mut self, surface: &ResolvedSurface, point: Point) -> Result<(), ControlError>;
}

/// Screenshot storage collaborator, invoked only by capture_screen tasks.
pub trait ScreenshotSink: Send {
    /// Persist the frame; returns where it was written.
    fn save(&mut self, frame: &Frame) -> Result<PathBuf, SinkError>;
}

/// The full set of collaborator implementations the scheduler is wired with.
pub struct Collaborators {
    pub capture: Box<dyn CaptureSource>,
    pub matcher: Box<dyn TemplateMatcher>,
    pub comparer: Box<dyn HistogramComparer>,
    pub controller: Box<dyn InputController>,
    pub sink: Box<dyn ScreenshotSink>,
}
