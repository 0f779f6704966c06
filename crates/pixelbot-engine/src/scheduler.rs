//! The orchestrating control loop: capture, recognize, count, act, advance.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pixelbot_common::Sleeper;
use pixelbot_core::{RuntimeOptions, TaskDefinition, TaskRegistry};
use pixelbot_device::ResolvedSurface;
use tracing::{debug, info, warn};

use crate::backend::{CaptureSource, Collaborators};
use crate::context::ExecutionContext;
use crate::error::EngineError;
use crate::executor::ActionExecutor;
use crate::frame::Frame;
use crate::recognize::{MatchOutcome, Recognizer};

/// Caller-supplied retry and give-up policy.
///
/// The engine owns no retry ceiling of its own; whoever starts the run
/// decides how patient it is with transient collaborator failures and with
/// recognition misses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries for transient capture/control failures within one cycle.
    pub max_transient_retries: u32,
    /// Wait between transient retries.
    pub retry_backoff: Duration,
    /// Consecutive recognition misses tolerated before giving up.
    pub max_no_match_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_transient_retries: 3,
            retry_backoff: Duration::from_millis(500),
            max_no_match_attempts: 120,
        }
    }
}

/// Why a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A terminal task matched and executed.
    StopTask(String),
    /// The external stop signal was observed at the top of a cycle.
    Aborted,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub executions: u64,
    pub reason: StopReason,
}

/// The scheduler loop. One instance drives one resolved surface.
///
/// Strictly sequential: no step begins before the previous one completes,
/// and all counter mutation goes through the single [`ExecutionContext`]
/// owned here.
pub struct Scheduler {
    registry: Arc<TaskRegistry>,
    surface: ResolvedSurface,
    capture: Box<dyn CaptureSource>,
    recognizer: Recognizer,
    executor: ActionExecutor,
    context: ExecutionContext,
    options: RuntimeOptions,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    stop: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<TaskRegistry>,
        surface: ResolvedSurface,
        collaborators: Collaborators,
        options: RuntimeOptions,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let Collaborators {
            capture,
            matcher,
            comparer,
            controller,
            sink,
        } = collaborators;
        let recognizer = Recognizer::new(matcher, comparer, &options);
        let executor =
            ActionExecutor::new(controller, sink, Arc::clone(&sleeper), options.clone());
        Self {
            registry,
            surface,
            capture,
            recognizer,
            executor,
            context: ExecutionContext::new(),
            options,
            policy,
            sleeper,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Fix the executor's random seed, for deterministic tests.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.executor = self.executor.with_rng_seed(seed);
        self
    }

    /// Flag observed at the top of each cycle; set it to abort the run.
    /// An in-flight action completes before shutdown takes effect.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Times the named task has executed in this run.
    pub fn executions(&self, name: &str) -> u32 {
        self.context.executions(name)
    }

    /// Run the loop from `start` until a terminal task fires, the stop flag
    /// is raised, or the retry policy gives up.
    pub fn run(&mut self, start: &str) -> Result<RunSummary, EngineError> {
        self.registry.lookup(start)?;
        let mut candidates: Vec<String> = vec![start.to_string()];
        let mut cycle: u64 = 0;
        let mut executions: u64 = 0;
        let mut misses: u32 = 0;

        info!(start, "run started");
        loop {
            if self.stop.load(Ordering::SeqCst) {
                info!(cycle, "stop signal observed, run aborted");
                return Ok(RunSummary {
                    cycles: cycle,
                    executions,
                    reason: StopReason::Aborted,
                });
            }
            if candidates.is_empty() {
                return Err(EngineError::NoProgress {
                    cycle,
                    attempts: 0,
                    candidates,
                });
            }
            cycle += 1;

            let frame = self.capture_with_retry(cycle)?;
            let defs: Vec<Arc<TaskDefinition>> = candidates
                .iter()
                .map(|name| self.registry.lookup(name).map(Arc::clone))
                .collect::<Result<_, _>>()?;

            let outcome = self
                .recognizer
                .classify(&frame, &defs)
                .map_err(|source| EngineError::Recognize { cycle, source })?;

            let Some(outcome) = outcome else {
                misses += 1;
                if misses > self.policy.max_no_match_attempts {
                    return Err(EngineError::NoProgress {
                        cycle,
                        attempts: misses,
                        candidates,
                    });
                }
                debug!(cycle, misses, ?candidates, "no candidate matched, retrying");
                self.sleeper
                    .sleep(Duration::from_millis(self.options.identify_delay_ms));
                continue;
            };
            misses = 0;

            let task = Arc::clone(self.registry.lookup(&outcome.task)?);

            // Counters record intent, not confirmed effect: increment before
            // the action runs, and never roll back. Tasks that list this one
            // in decrement_on_execute compensate for clicks that silently
            // failed to register in the target.
            self.context.record_execution(&task);
            executions += 1;
            let next = self.context.next_candidates(&task).to_vec();

            info!(task = %task.name, score = outcome.score, cycle, "task matched");
            self.execute_with_retry(&task, &outcome, cycle)?;

            if task.kind.is_terminal() {
                info!(task = %task.name, cycle, "terminal task reached");
                return Ok(RunSummary {
                    cycles: cycle,
                    executions,
                    reason: StopReason::StopTask(task.name.clone()),
                });
            }
            candidates = next;
        }
    }

    fn capture_with_retry(&mut self, cycle: u64) -> Result<Frame, EngineError> {
        let mut attempts = 0;
        loop {
            match self.capture.capture(&self.surface) {
                Ok(frame) => return Ok(frame),
                Err(source) if source.is_retryable() && attempts < self.policy.max_transient_retries => {
                    attempts += 1;
                    warn!(cycle, attempts, %source, "capture failed, retrying");
                    self.sleeper.sleep(self.policy.retry_backoff);
                }
                Err(source) => return Err(EngineError::Capture { cycle, source }),
            }
        }
    }

    fn execute_with_retry(
        &mut self,
        task: &TaskDefinition,
        outcome: &MatchOutcome,
        cycle: u64,
    ) -> Result<(), EngineError> {
        let mut attempts = 0;
        loop {
            match self
                .executor
                .execute(task, outcome, &self.surface, &mut *self.capture)
            {
                Ok(()) => return Ok(()),
                Err(source) if source.is_retryable() && attempts < self.policy.max_transient_retries => {
                    attempts += 1;
                    warn!(task = %task.name, cycle, attempts, %source, "action failed, retrying");
                    self.sleeper.sleep(self.policy.retry_backoff);
                }
                Err(source) => {
                    return Err(EngineError::Action {
                        task: task.name.clone(),
                        cycle,
                        source,
                    });
                }
            }
        }
    }
}
