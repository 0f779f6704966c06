//! Translates a matched task into a concrete input action with humanized
//! timing.

use std::sync::Arc;
use std::time::Duration;

use pixelbot_common::Sleeper;
use pixelbot_core::{ClickStyle, Point, Rect, RuntimeOptions, TaskDefinition, TaskKind};
use pixelbot_device::ResolvedSurface;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::backend::{CaptureSource, InputController, ScreenshotSink};
use crate::error::ActionError;
use crate::recognize::MatchOutcome;

/// Uniformly random point inside `rect`. The rectangle must be non-empty.
pub fn pick_point_in(rect: Rect, rng: &mut impl Rng) -> Point {
    Point::new(
        rng.gen_range(rect.x..rect.x + rect.width),
        rng.gen_range(rect.y..rect.y + rect.height),
    )
}

/// Executes matched tasks: picks a click point per style, issues the click
/// through the input collaborator, and applies pre/post delays plus a
/// uniform random extra delay so the timing looks human.
pub struct ActionExecutor {
    controller: Box<dyn InputController>,
    sink: Box<dyn ScreenshotSink>,
    sleeper: Arc<dyn Sleeper>,
    options: RuntimeOptions,
    rng: StdRng,
}

impl ActionExecutor {
    pub fn new(
        controller: Box<dyn InputController>,
        sink: Box<dyn ScreenshotSink>,
        sleeper: Arc<dyn Sleeper>,
        options: RuntimeOptions,
    ) -> Self {
        Self {
            controller,
            sink,
            sleeper,
            options,
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the random seed, for deterministic tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Execute `task`'s action on `surface`.
    ///
    /// `capture` is only consulted for capture_screen tasks, which request a
    /// fresh frame after the settle delay.
    pub fn execute(
        &mut self,
        task: &TaskDefinition,
        outcome: &MatchOutcome,
        surface: &ResolvedSurface,
        capture: &mut dyn CaptureSource,
    ) -> Result<(), ActionError> {
        if task.pre_delay_ms > 0 {
            self.sleeper.sleep(Duration::from_millis(task.pre_delay_ms));
        }

        match task.kind {
            TaskKind::Click(style) => {
                let point = self.pick_click_point(task, outcome, surface, style)?;
                debug!(task = %task.name, x = point.x, y = point.y, "clicking");
                self.controller.click(surface, point)?;
            }
            TaskKind::CaptureScreen => {
                if self.options.screenshot_enabled {
                    self.sleeper
                        .sleep(Duration::from_millis(self.options.screenshot_settle_ms));
                    let frame = capture.capture(surface)?;
                    let path = self.sink.save(&frame)?;
                    info!(task = %task.name, path = %path.display(), "screenshot saved");
                }
            }
            TaskKind::DoNothing | TaskKind::Stop => {}
        }

        let jitter = self.rng.gen_range(
            self.options.control_delay_lower_ms..=self.options.control_delay_upper_ms,
        );
        let post = task.post_delay_ms + jitter;
        if post > 0 {
            self.sleeper.sleep(Duration::from_millis(post));
        }
        Ok(())
    }

    fn pick_click_point(
        &mut self,
        task: &TaskDefinition,
        outcome: &MatchOutcome,
        surface: &ResolvedSurface,
        style: ClickStyle,
    ) -> Result<Point, ActionError> {
        match style {
            ClickStyle::SelfCenter => outcome
                .bounds
                .map(|b| b.center())
                .ok_or_else(|| ActionError::MissingAnchor(task.name.clone())),
            ClickStyle::InRegion => {
                let region = task
                    .action_region
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| ActionError::MissingRegion(task.name.clone()))?;
                Ok(pick_point_in(region, &mut self.rng))
            }
            ClickStyle::Anywhere => {
                let bounds = surface.bounds();
                if bounds.is_empty() {
                    return Err(ActionError::EmptySurface(task.name.clone()));
                }
                Ok(pick_point_in(bounds, &mut self.rng))
            }
        }
    }
}
