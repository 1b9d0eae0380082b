//! Counter: counts invocations of the steps it hands out.

use crate::step::{self, StepRef, StepResult};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A shared invocation counter. Clones share the count.
#[derive(Clone, Default)]
pub struct Counter {
    count: Arc<AtomicUsize>,
}

impl Counter {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A step that bumps the counter and returns `returns`.
    pub fn step(&self, returns: Value) -> StepRef {
        let count = Arc::clone(&self.count);
        step::from_fn(move |_ctx, _args| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(StepResult::Value(returns.clone()))
        })
    }

    /// Invocations so far.
    pub fn get(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Back to zero.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}
