//! Mutable per-run state: execution counters and the current-task pointer.
//!
//! Counters are owned exclusively by this type. Cross-task decrements are
//! modeled as an explicit [`TaskFired`] event applied to the interested
//! counters, so the dependency stays declarative (visible in the task
//! definition) rather than hidden in imperative updates.

use std::collections::HashMap;

use pixelbot_core::TaskDefinition;
use tracing::trace;

/// A task-execution event: the fired task plus the counters it decrements.
#[derive(Debug, Clone, Copy)]
pub struct TaskFired<'a> {
    pub task: &'a str,
    pub decrements: &'a [String],
}

impl<'a> TaskFired<'a> {
    pub fn from_task(task: &'a TaskDefinition) -> Self {
        Self {
            task: &task.name,
            decrements: &task.decrement_on_execute,
        }
    }
}

/// Per-run execution counters and current-task pointer.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    counters: HashMap<String, u32>,
    current: Option<String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Times the named task has executed (zero for tasks never fired).
    pub fn executions(&self, name: &str) -> u32 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Record one execution of `task`: increments its counter, then applies
    /// the task's declared decrements, floored at zero.
    pub fn record_execution(&mut self, task: &TaskDefinition) {
        self.apply(TaskFired::from_task(task));
        self.current = Some(task.name.clone());
    }

    /// Apply a task-fired event to the counters.
    pub fn apply(&mut self, event: TaskFired<'_>) {
        let counter = self.counters.entry(event.task.to_string()).or_insert(0);
        *counter = counter.saturating_add(1);
        trace!(task = event.task, count = *counter, "execution recorded");

        for name in event.decrements {
            let counter = self.counters.entry(name.clone()).or_insert(0);
            *counter = counter.saturating_sub(1);
            trace!(task = %name, count = *counter, "counter decremented");
        }
    }

    /// The candidate list to try after `task` fired: `exceeded_next` once
    /// its counter is strictly above `max_executions`, `next` otherwise.
    pub fn next_candidates<'t>(&self, task: &'t TaskDefinition) -> &'t [String] {
        if self.executions(&task.name) > task.max_executions {
            &task.exceeded_next
        } else {
            &task.next
        }
    }

    /// Name of the most recently executed task.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelbot_core::TaskKind;
    use proptest::prelude::*;

    fn task(name: &str) -> TaskDefinition {
        TaskDefinition::unconditional(name, TaskKind::DoNothing)
    }

    #[test]
    fn test_counters_start_at_zero() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.executions("anything"), 0);
        assert_eq!(ctx.current(), None);
    }

    #[test]
    fn test_record_execution_increments_and_sets_current() {
        let mut ctx = ExecutionContext::new();
        let a = task("a");
        ctx.record_execution(&a);
        ctx.record_execution(&a);
        assert_eq!(ctx.executions("a"), 2);
        assert_eq!(ctx.current(), Some("a"));
    }

    #[test]
    fn test_decrement_floors_at_zero() {
        let mut ctx = ExecutionContext::new();
        let a = task("a");
        let mut d = task("d");
        d.decrement_on_execute = vec!["a".into()];

        ctx.record_execution(&a);
        assert_eq!(ctx.executions("a"), 1);

        ctx.record_execution(&d);
        assert_eq!(ctx.executions("a"), 0);

        // Firing again must not push the counter negative.
        ctx.record_execution(&d);
        assert_eq!(ctx.executions("a"), 0);
        assert_eq!(ctx.executions("d"), 2);
    }

    #[test]
    fn test_candidate_switch_is_strictly_greater_than() {
        let mut ctx = ExecutionContext::new();
        let mut a = task("a");
        a.max_executions = 1;
        a.next = vec!["b".into()];
        a.exceeded_next = vec!["c".into()];

        // Cycle 1: counter reaches the limit exactly; normal path still used.
        ctx.record_execution(&a);
        assert_eq!(ctx.executions("a"), 1);
        assert_eq!(ctx.next_candidates(&a), &["b".to_string()]);

        // Cycle 2: counter exceeds the limit; exceeded path takes over.
        ctx.record_execution(&a);
        assert_eq!(ctx.executions("a"), 2);
        assert_eq!(ctx.next_candidates(&a), &["c".to_string()]);
    }

    #[test]
    fn test_decrement_restores_normal_candidates() {
        let mut ctx = ExecutionContext::new();
        let mut a = task("a");
        a.max_executions = 1;
        a.next = vec!["b".into()];
        a.exceeded_next = vec!["c".into()];
        let mut d = task("d");
        d.decrement_on_execute = vec!["a".into()];

        ctx.record_execution(&a);
        ctx.record_execution(&a);
        assert_eq!(ctx.next_candidates(&a), &["c".to_string()]);

        ctx.record_execution(&d);
        assert_eq!(ctx.executions("a"), 1);
        assert_eq!(ctx.next_candidates(&a), &["b".to_string()]);
    }

    #[test]
    fn test_unbounded_task_never_switches() {
        let mut ctx = ExecutionContext::new();
        let mut a = task("a");
        a.next = vec!["b".into()];
        a.exceeded_next = vec!["c".into()];
        for _ in 0..1000 {
            ctx.record_execution(&a);
        }
        assert_eq!(ctx.next_candidates(&a), &["b".to_string()]);
    }

    proptest! {
        /// Counters never go below zero, whatever order events fire in.
        #[test]
        fn prop_counters_never_negative(events in proptest::collection::vec(0usize..4, 0..64)) {
            let names = ["a", "b", "c", "d"];
            let mut tasks: Vec<TaskDefinition> = names.iter().map(|n| task(n)).collect();
            // Every task decrements the next one, forming a cycle.
            for i in 0..tasks.len() {
                let target = names[(i + 1) % names.len()].to_string();
                tasks[i].decrement_on_execute = vec![target];
            }

            let mut ctx = ExecutionContext::new();
            for index in events {
                ctx.record_execution(&tasks[index]);
            }
            for name in names {
                // u32 counters cannot be negative; the invariant worth
                // checking is that a decremented counter saturates rather
                // than wrapping around to a huge value.
                prop_assert!(ctx.executions(name) < 1000);
            }
        }

        /// Without decrements, counters are non-decreasing.
        #[test]
        fn prop_counters_monotonic_without_decrements(events in proptest::collection::vec(0usize..3, 1..64)) {
            let tasks = [task("a"), task("b"), task("c")];
            let mut ctx = ExecutionContext::new();
            let mut previous = [0u32; 3];
            for index in events {
                ctx.record_execution(&tasks[index]);
                for (i, t) in tasks.iter().enumerate() {
                    let now = ctx.executions(&t.name);
                    prop_assert!(now >= previous[i]);
                    previous[i] = now;
                }
            }
        }
    }
}
