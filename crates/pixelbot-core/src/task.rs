//! Task definitions: the immutable vocabulary of the task graph.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;

/// Default template-match acceptance threshold.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.8;
/// Default histogram-compare acceptance threshold. Histogram comparison is
/// coarser than template matching, so the bar is higher.
pub const DEFAULT_CACHE_THRESHOLD: f64 = 0.9;

/// Where a click-kind task places its click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickStyle {
    /// Center of the region the recognizer matched for this task.
    SelfCenter,
    /// Uniformly random point inside the task's `action_region`.
    InRegion,
    /// Uniformly random point anywhere on the resolved game surface.
    Anywhere,
}

/// What a task does once it matches.
///
/// Any `Click` variant satisfies the generic "this task clicks something"
/// capability ([`TaskKind::is_click`]); callers that only care about that
/// capability must not enumerate the styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TaskKind {
    /// Match only; no input is produced.
    DoNothing,
    /// Terminal: the scheduler halts after this task executes.
    Stop,
    /// Request a screenshot from the capture collaborator.
    CaptureScreen,
    Click(ClickStyle),
}

impl TaskKind {
    /// True for every click-capable variant, regardless of style.
    pub fn is_click(&self) -> bool {
        matches!(self, TaskKind::Click(_))
    }

    /// True when the scheduler must halt after executing this task.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskKind::Stop)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::DoNothing => "do_nothing",
            TaskKind::Stop => "stop",
            TaskKind::CaptureScreen => "capture_screen",
            TaskKind::Click(ClickStyle::SelfCenter) => "click_self",
            TaskKind::Click(ClickStyle::InRegion) => "click_rect",
            TaskKind::Click(ClickStyle::Anywhere) => "click_rand",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized task kind string in configuration.
#[derive(Debug, Error)]
#[error("unknown task kind: {0}")]
pub struct ParseKindError(String);

impl std::str::FromStr for TaskKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "do_nothing" => Ok(TaskKind::DoNothing),
            "stop" => Ok(TaskKind::Stop),
            "capture_screen" => Ok(TaskKind::CaptureScreen),
            "click_self" => Ok(TaskKind::Click(ClickStyle::SelfCenter)),
            "click_rect" => Ok(TaskKind::Click(ClickStyle::InRegion)),
            "click_rand" => Ok(TaskKind::Click(ClickStyle::Anywhere)),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}

impl TryFrom<String> for TaskKind {
    type Error = ParseKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaskKind> for String {
    fn from(kind: TaskKind) -> Self {
        kind.as_str().to_string()
    }
}

/// How the recognizer decides whether a task matches a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAlgorithm {
    /// Always matches with score 1.0. For tasks with no visual precondition.
    JustReturn,
    /// Template matching against the task's template image.
    #[default]
    TemplateMatch,
    /// Histogram comparison; cheaper and coarser than template matching.
    HistogramCompare,
}

impl MatchAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchAlgorithm::JustReturn => "just_return",
            MatchAlgorithm::TemplateMatch => "template_match",
            MatchAlgorithm::HistogramCompare => "histogram_compare",
        }
    }
}

impl std::fmt::Display for MatchAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_match_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_cache_threshold() -> f64 {
    DEFAULT_CACHE_THRESHOLD
}

fn default_max_executions() -> u32 {
    u32::MAX
}

/// One named node of the task graph. Immutable after registry construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    /// Unique name. Filled from the config map key by the registry loader.
    #[serde(default)]
    pub name: String,
    /// Template image reference, resolved by the recognition backend.
    /// Required unless the algorithm is `just_return`.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f64,
    #[serde(default = "default_cache_threshold")]
    pub cache_threshold: f64,
    pub kind: TaskKind,
    #[serde(default)]
    pub algorithm: MatchAlgorithm,
    /// Candidates tried after this task executes, in priority order.
    #[serde(default)]
    pub next: Vec<String>,
    /// Execution ceiling; once exceeded, `exceeded_next` replaces `next`.
    #[serde(default = "default_max_executions")]
    pub max_executions: u32,
    #[serde(default)]
    pub exceeded_next: Vec<String>,
    /// Tasks whose execution counters are decremented (floored at zero) when
    /// this task fires. Compensates for an earlier task whose click did not
    /// actually take effect.
    #[serde(default)]
    pub decrement_on_execute: Vec<String>,
    /// Click target for `click_rect` tasks.
    #[serde(default)]
    pub action_region: Option<Rect>,
    #[serde(default)]
    pub pre_delay_ms: u64,
    #[serde(default)]
    pub post_delay_ms: u64,
}

impl TaskDefinition {
    /// A minimal definition used for built-in sentinel tasks and tests.
    pub fn unconditional(name: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            name: name.into(),
            template: None,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            cache_threshold: DEFAULT_CACHE_THRESHOLD,
            kind,
            algorithm: MatchAlgorithm::JustReturn,
            next: Vec::new(),
            max_executions: u32::MAX,
            exceeded_next: Vec::new(),
            decrement_on_execute: Vec::new(),
            action_region: None,
            pre_delay_ms: 0,
            post_delay_ms: 0,
        }
    }

    /// Every task name this definition refers to, with the referring field
    /// name for error reporting.
    pub fn references(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.next
            .iter()
            .map(|n| ("next", n.as_str()))
            .chain(self.exceeded_next.iter().map(|n| ("exceeded_next", n.as_str())))
            .chain(
                self.decrement_on_execute
                    .iter()
                    .map(|n| ("decrement_on_execute", n.as_str())),
            )
    }
}
