//! Immutable registry snapshot used for one detection pass.

use std::collections::HashMap;

use super::builtins::BUILTIN_RUNNERS;
use super::runner::RunnerDef;

/// Built-in runners with user overrides applied.
///
/// A snapshot is assembled once per request so segmentation always observes a
/// consistent mapping, however the settings change in between.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerRegistry {
    runners: HashMap<String, RunnerDef>,
}

impl RunnerRegistry {
    /// Registry containing only the built-in runners.
    pub fn builtin() -> Self {
        Self::snapshot(&HashMap::new())
    }

    /// Built-ins overwritten by `overrides`.
    ///
    /// An override replaces the whole entry for its key; fields are never
    /// merged with the built-in definition.
    pub fn snapshot(overrides: &HashMap<String, RunnerDef>) -> Self {
        let mut runners: HashMap<String, RunnerDef> = BUILTIN_RUNNERS
            .iter()
            .map(|(id, runner)| (id.to_string(), runner.clone()))
            .collect();
        runners.extend(
            overrides
                .iter()
                .map(|(id, runner)| (id.clone(), runner.clone())),
        );
        Self { runners }
    }

    /// Registry with exactly the given runners and no built-ins.
    pub fn from_runners(runners: impl IntoIterator<Item = (String, RunnerDef)>) -> Self {
        Self {
            runners: runners.into_iter().collect(),
        }
    }

    pub fn get(&self, language_id: &str) -> Option<&RunnerDef> {
        self.runners.get(language_id)
    }

    pub fn contains(&self, language_id: &str) -> bool {
        self.runners.contains_key(language_id)
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}
