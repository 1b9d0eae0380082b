//! CallLog: records which steps ran, with what, in order.

use crate::step::{self, StepRef, StepResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    /// Name the recording step was created with.
    pub name: String,
    /// Arguments the step received.
    pub args: Vec<Value>,
}

/// A shared, ordered log of step invocations.
///
/// Steps made with [`CallLog::step`] append to the log and then return a
/// fixed value. Clones share the same log.
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<Recorded>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A step that records itself as `name` and returns `returns`.
    pub fn step(&self, name: &str, returns: Value) -> StepRef {
        let log = self.clone();
        let name = name.to_string();
        step::from_fn(move |_ctx, args| {
            log.entries.lock().push(Recorded {
                name: name.clone(),
                args: args.to_vec(),
            });
            Ok(StepResult::Value(returns.clone()))
        })
    }

    /// Snapshot of every recorded invocation.
    pub fn entries(&self) -> Vec<Recorded> {
        self.entries.lock().clone()
    }

    /// Names of the recorded steps, in invocation order.
    pub fn names(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.name.clone()).collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
