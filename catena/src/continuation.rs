//! Suspended traversals.

use crate::chain::Chain;
use crate::engine::Outcome;
use crate::engine::strategy::Strategy;
use crate::engine::trampoline::{Traversal, drive};
use crate::error::StepError;
use crate::step::identity_of;
use serde_json::Value;

/// A traversal suspended by a step that returned the pause sentinel.
///
/// Holds the node after the pausing step, the arguments the pausing step
/// received, the receiver for the next node, and the latest value a
/// broadcast or predicate traversal produced. Running it continues the
/// traversal as if the pausing step had passed its arguments through.
/// Clones share nothing mutable, and every run starts again from the same
/// suspension point.
#[derive(Clone)]
pub struct Continuation {
    strategy: Strategy,
    resume_at: Option<Chain>,
    args: Vec<Value>,
    previous: Chain,
    context: Option<Value>,
    latest: Value,
}

impl Continuation {
    pub(crate) fn new(
        strategy: Strategy,
        resume_at: Option<Chain>,
        args: Vec<Value>,
        previous: Chain,
        context: Option<Value>,
        latest: Value,
    ) -> Self {
        Self {
            strategy,
            resume_at,
            args,
            previous,
            context,
            latest,
        }
    }

    /// Resume the traversal.
    ///
    /// `args` and `receiver` replace the captured arguments and context
    /// when given. The result is whatever the rest of the traversal
    /// produces, which may be another suspension.
    pub fn run(
        &self,
        args: Option<Vec<Value>>,
        receiver: Option<Value>,
    ) -> Result<Outcome, StepError> {
        let args = args.unwrap_or_else(|| self.args.clone());
        let context = receiver.or_else(|| self.context.clone());
        let Some(node) = self.resume_at.clone() else {
            return Ok(Outcome::Done(self.strategy.exhausted(&args, self.latest.clone())));
        };
        tracing::debug!(strategy = ?self.strategy, at = ?node, "resuming continuation");
        drive(Traversal {
            strategy: self.strategy,
            node,
            args,
            previous: self.previous.clone(),
            context,
            latest: self.latest.clone(),
        })
    }

    /// The captured arguments: the single argument itself, or the whole
    /// list when there are several.
    pub fn value(&self) -> Value {
        identity_of(&self.args)
    }

    /// The captured argument list.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The node the traversal resumes at, if any remain.
    pub fn resume_at(&self) -> Option<&Chain> {
        self.resume_at.as_ref()
    }
}

impl std::fmt::Debug for Continuation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Continuation")
            .field("strategy", &self.strategy)
            .field("resume_at", &self.resume_at)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
