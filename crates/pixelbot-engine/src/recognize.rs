//! Recognition dispatch: classify a frame against an ordered candidate list.

use std::sync::Arc;

use pixelbot_core::{MatchAlgorithm, Rect, RuntimeOptions, TaskDefinition};
use tracing::{debug, trace};

use crate::backend::{HistogramComparer, TemplateMatcher};
use crate::error::RecognizeError;
use crate::frame::Frame;

/// A positive classification: which task matched, how well, and where
/// (template matches only; unconditional and histogram matches carry no
/// location).
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub task: String,
    pub score: f64,
    pub bounds: Option<Rect>,
}

/// Dispatches recognition per task algorithm, first match wins.
///
/// Candidates are tried strictly in list order; a candidate earlier in the
/// list wins over a later one regardless of score. Task authors rely on that
/// ordering to express priority.
pub struct Recognizer {
    matcher: Box<dyn TemplateMatcher>,
    comparer: Box<dyn HistogramComparer>,
    cache_enabled: bool,
}

impl Recognizer {
    pub fn new(
        matcher: Box<dyn TemplateMatcher>,
        comparer: Box<dyn HistogramComparer>,
        options: &RuntimeOptions,
    ) -> Self {
        Self {
            matcher,
            comparer,
            cache_enabled: options.identify_cache,
        }
    }

    /// Classify `frame` against the candidates. `Ok(None)` is a plain miss.
    pub fn classify(
        &self,
        frame: &Frame,
        candidates: &[Arc<TaskDefinition>],
    ) -> Result<Option<MatchOutcome>, RecognizeError> {
        for task in candidates {
            if let Some(outcome) = self.try_task(frame, task)? {
                debug!(task = %outcome.task, score = outcome.score, "candidate matched");
                return Ok(Some(outcome));
            }
            trace!(task = %task.name, "candidate missed");
        }
        Ok(None)
    }

    fn try_task(
        &self,
        frame: &Frame,
        task: &TaskDefinition,
    ) -> Result<Option<MatchOutcome>, RecognizeError> {
        match task.algorithm {
            MatchAlgorithm::JustReturn => Ok(Some(MatchOutcome {
                task: task.name.clone(),
                score: 1.0,
                bounds: None,
            })),
            MatchAlgorithm::TemplateMatch => self.try_template(frame, task, task.match_threshold),
            MatchAlgorithm::HistogramCompare => {
                if !self.cache_enabled {
                    // The histogram path is a CPU-saving cache; with the
                    // cache off the task still matches, just precisely.
                    return self.try_template(frame, task, task.match_threshold);
                }
                let template = self.template_of(task)?;
                let score = self.comparer.compare(frame, template, task.cache_threshold)?;
                Ok(score.map(|score| MatchOutcome {
                    task: task.name.clone(),
                    score,
                    bounds: None,
                }))
            }
        }
    }

    fn try_template(
        &self,
        frame: &Frame,
        task: &TaskDefinition,
        threshold: f64,
    ) -> Result<Option<MatchOutcome>, RecognizeError> {
        let template = self.template_of(task)?;
        let hit = self.matcher.find(frame, template, threshold)?;
        Ok(hit.map(|m| MatchOutcome {
            task: task.name.clone(),
            score: m.score,
            bounds: Some(m.bounds),
        }))
    }

    fn template_of<'t>(&self, task: &'t TaskDefinition) -> Result<&'t str, RecognizeError> {
        task.template
            .as_deref()
            .ok_or_else(|| RecognizeError::MissingTemplate(task.name.clone()))
    }
}
