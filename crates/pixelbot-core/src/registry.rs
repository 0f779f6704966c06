//! Name-indexed task store, validated once and read-only afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ConfigError, UnknownTask};
use crate::task::{ClickStyle, MatchAlgorithm, TaskDefinition, TaskKind};

/// Sentinel task name that is always resolvable. Candidate lists may point
/// at it without the config declaring it.
pub const STOP_TASK: &str = "stop";

/// Immutable, name-indexed store of task definitions.
///
/// Safe for concurrent read access: there is no writer after construction.
#[derive(Debug)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Arc<TaskDefinition>>,
}

impl TaskRegistry {
    /// Build a registry from named definitions, injecting the built-in
    /// `stop` sentinel when absent, and validate the whole graph.
    pub fn from_definitions(definitions: Vec<TaskDefinition>) -> Result<Self, ConfigError> {
        let mut tasks: BTreeMap<String, Arc<TaskDefinition>> = BTreeMap::new();
        for task in definitions {
            let name = task.name.clone();
            if tasks.insert(name.clone(), Arc::new(task)).is_some() {
                return Err(ConfigError::DuplicateTask(name));
            }
        }
        tasks
            .entry(STOP_TASK.to_string())
            .or_insert_with(|| Arc::new(TaskDefinition::unconditional(STOP_TASK, TaskKind::Stop)));

        let registry = Self { tasks };
        registry.validate()?;
        Ok(registry)
    }

    /// Parse a `{ name: task }` JSON object into a registry.
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, TaskDefinition> = serde_json::from_str(source)?;
        let definitions = raw
            .into_iter()
            .map(|(name, mut task)| {
                task.name = name;
                task
            })
            .collect();
        Self::from_definitions(definitions)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for task in self.tasks.values() {
            for (field, target) in task.references() {
                if !self.tasks.contains_key(target) {
                    return Err(ConfigError::UnresolvedReference {
                        task: task.name.clone(),
                        field,
                        target: target.to_string(),
                    });
                }
            }

            for (field, value) in [
                ("match_threshold", task.match_threshold),
                ("cache_threshold", task.cache_threshold),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidThreshold {
                        task: task.name.clone(),
                        field,
                        value,
                    });
                }
            }

            if task.algorithm != MatchAlgorithm::JustReturn && task.template.is_none() {
                return Err(ConfigError::MissingTemplate(task.name.clone()));
            }

            if task.kind == TaskKind::Click(ClickStyle::InRegion)
                && !task.action_region.is_some_and(|r| !r.is_empty())
            {
                return Err(ConfigError::InvalidActionRegion(task.name.clone()));
            }
        }
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&Arc<TaskDefinition>, UnknownTask> {
        self.tasks
            .get(name)
            .ok_or_else(|| UnknownTask(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task names in deterministic (sorted) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<TaskDefinition>> {
        self.tasks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn click_task(name: &str, next: &[&str]) -> TaskDefinition {
        let mut task = TaskDefinition::unconditional(name, TaskKind::Click(ClickStyle::SelfCenter));
        task.algorithm = MatchAlgorithm::TemplateMatch;
        task.template = Some(format!("{name}.png"));
        task.next = next.iter().map(|s| s.to_string()).collect();
        task
    }

    #[test]
    fn test_stop_sentinel_always_resolvable() {
        let registry = TaskRegistry::from_definitions(vec![click_task("a", &["stop"])]).unwrap();
        assert!(registry.contains(STOP_TASK));
        assert_eq!(registry.lookup(STOP_TASK).unwrap().kind, TaskKind::Stop);
    }

    #[test]
    fn test_explicit_stop_task_is_kept() {
        let mut stop = TaskDefinition::unconditional(STOP_TASK, TaskKind::Stop);
        stop.pre_delay_ms = 250;
        let registry = TaskRegistry::from_definitions(vec![stop]).unwrap();
        assert_eq!(registry.lookup(STOP_TASK).unwrap().pre_delay_ms, 250);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result =
            TaskRegistry::from_definitions(vec![click_task("a", &[]), click_task("a", &[])]);
        assert!(matches!(result, Err(ConfigError::DuplicateTask(name)) if name == "a"));
    }

    #[test]
    fn test_unresolved_reference_rejected() {
        let result = TaskRegistry::from_definitions(vec![click_task("a", &["ghost"])]);
        match result {
            Err(ConfigError::UnresolvedReference {
                task,
                field,
                target,
            }) => {
                assert_eq!(task, "a");
                assert_eq!(field, "next");
                assert_eq!(target, "ghost");
            }
            other => panic!("expected UnresolvedReference, got {other:?}"),
        }
    }

    #[test]
    fn test_unresolved_decrement_reference_rejected() {
        let mut task = click_task("a", &[]);
        task.decrement_on_execute = vec!["ghost".into()];
        let result = TaskRegistry::from_definitions(vec![task]);
        assert!(matches!(
            result,
            Err(ConfigError::UnresolvedReference { field: "decrement_on_execute", .. })
        ));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let mut task = click_task("a", &[]);
        task.match_threshold = 1.5;
        let result = TaskRegistry::from_definitions(vec![task]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidThreshold { field: "match_threshold", .. })
        ));
    }

    #[test]
    fn test_template_required_unless_just_return() {
        let mut task = click_task("a", &[]);
        task.template = None;
        assert!(matches!(
            TaskRegistry::from_definitions(vec![task]),
            Err(ConfigError::MissingTemplate(name)) if name == "a"
        ));

        let no_visual = TaskDefinition::unconditional("b", TaskKind::DoNothing);
        assert!(TaskRegistry::from_definitions(vec![no_visual]).is_ok());
    }

    #[test]
    fn test_region_click_needs_nonempty_region() {
        let mut task = click_task("a", &[]);
        task.kind = TaskKind::Click(ClickStyle::InRegion);
        assert!(matches!(
            TaskRegistry::from_definitions(vec![task.clone()]),
            Err(ConfigError::InvalidActionRegion(_))
        ));

        task.action_region = Some(Rect::new(0, 0, 10, 0));
        assert!(matches!(
            TaskRegistry::from_definitions(vec![task.clone()]),
            Err(ConfigError::InvalidActionRegion(_))
        ));

        task.action_region = Some(Rect::new(0, 0, 10, 10));
        assert!(TaskRegistry::from_definitions(vec![task]).is_ok());
    }

    #[test]
    fn test_lookup_unknown_task() {
        let registry = TaskRegistry::from_definitions(vec![]).unwrap();
        let err = registry.lookup("nope").unwrap_err();
        assert_eq!(err.0, "nope");
    }

    #[test]
    fn test_from_json_fills_names() {
        let registry = TaskRegistry::from_json(
            r#"{
                "start": { "kind": "click_self", "template": "start.png", "next": ["stop"] }
            }"#,
        )
        .unwrap();
        let task = registry.lookup("start").unwrap();
        assert_eq!(task.name, "start");
        assert_eq!(task.next, vec!["stop".to_string()]);
    }
}
