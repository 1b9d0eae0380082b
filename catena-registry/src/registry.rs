//! Name → step lookup.

use catena::StepRef;
use std::collections::HashMap;
use std::sync::Arc;

/// Steps registered under names.
///
/// Lookups hand out clones of the registered [`StepRef`], so every chain
/// built from the same name shares one step and identity searches
/// (`uses_step`, `using_step`) find it across chains.
#[derive(Clone)]
pub struct StepRegistry {
    steps: HashMap<String, StepRef>,
}

impl StepRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// Register `step` under `name`, replacing any previous step with
    /// that name.
    pub fn register(&mut self, name: impl Into<String>, step: StepRef) {
        let name = name.into();
        tracing::debug!(name = %name, "registering step");
        self.steps.insert(name, step);
    }

    /// Builder form of [`StepRegistry::register`].
    pub fn with(mut self, name: impl Into<String>, step: StepRef) -> Self {
        self.register(name, step);
        self
    }

    /// The step registered under `name`.
    pub fn get(&self, name: &str) -> Option<StepRef> {
        self.steps.get(name).map(Arc::clone)
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.steps.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepRegistry")
            .field("names", &self.names())
            .finish()
    }
}
