//! The trampoline: one bounce per visited node, driven by a flat loop.
//!
//! A traversal is plain data (node, arguments, previous node, context,
//! latest value).
//! [`bounce`] runs one step and reports either the next traversal state or
//! a finished [`Outcome`]; [`drive`] repeats until it finishes. Nothing
//! recurses per node, so chain length never becomes call depth.

use super::Outcome;
use super::strategy::Strategy;
use crate::awaiting::Awaiting;
use crate::chain::Chain;
use crate::continuation::Continuation;
use crate::deferred::Deferred;
use crate::error::StepError;
use crate::step::{StepContext, StepResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Where a traversal stands before visiting `node`.
#[derive(Clone)]
pub(crate) struct Traversal {
    pub(crate) strategy: Strategy,
    pub(crate) node: Chain,
    pub(crate) args: Vec<Value>,
    /// Receiver for `node` when no context is given.
    pub(crate) previous: Chain,
    pub(crate) context: Option<Value>,
    /// The last value produced that did not feed the next argument list.
    pub(crate) latest: Value,
}

impl Traversal {
    /// A traversal starting at `node`, which is its own receiver.
    pub(crate) fn start(
        strategy: Strategy,
        node: &Chain,
        args: Vec<Value>,
        context: Option<Value>,
    ) -> Self {
        Self {
            strategy,
            node: node.clone(),
            args,
            previous: node.clone(),
            context,
            latest: Value::Null,
        }
    }
}

pub(crate) enum Bounce {
    Continue(Traversal),
    Finish(Outcome),
}

/// Run traversals until one finishes.
pub(crate) fn drive(traversal: Traversal) -> Result<Outcome, StepError> {
    drive_parked(traversal, None)
}

/// Run traversals until one finishes. A traversal resumed from a deferred
/// value passes its handle in `parked`, so parking again reuses it.
fn drive_parked(
    mut traversal: Traversal,
    parked: Option<&Awaiting>,
) -> Result<Outcome, StepError> {
    let mut bounces: u64 = 0;
    loop {
        bounces += 1;
        match bounce(traversal, parked)? {
            Bounce::Continue(next) => traversal = next,
            Bounce::Finish(outcome) => {
                trace!(bounces, "traversal finished");
                return Ok(outcome);
            }
        }
    }
}

/// Visit one node.
fn bounce(traversal: Traversal, parked: Option<&Awaiting>) -> Result<Bounce, StepError> {
    let Traversal {
        strategy,
        node,
        args,
        previous,
        context,
        latest,
    } = traversal;

    trace!(?strategy, ?node, "bounce");
    let result = {
        let ctx = StepContext::new(&node, &previous, context.as_ref());
        node.step().invoke(&ctx, strategy.arguments(&args))?
    };

    match result {
        StepResult::Value(value) => Ok(advance(strategy, node, args, value, context)),
        StepResult::Redirect(target) => {
            debug!(?strategy, from = ?node, to = ?target, "redirect");
            Ok(Bounce::Continue(Traversal {
                strategy,
                node: target,
                args,
                previous: node,
                context,
                latest,
            }))
        }
        StepResult::Pause => {
            debug!(?strategy, at = ?node, "traversal suspended");
            let continuation =
                Continuation::new(strategy, node.next(), args, node, context, latest);
            Ok(Bounce::Finish(Outcome::Suspended(continuation)))
        }
        StepResult::Pending(deferred) => {
            Ok(wait(deferred, strategy, node, args, context, parked))
        }
    }
}

/// Move past `node` with the value it produced.
fn advance(
    strategy: Strategy,
    node: Chain,
    args: Vec<Value>,
    value: Value,
    context: Option<Value>,
) -> Bounce {
    if strategy.stops(&value) {
        debug!(?strategy, at = ?node, "short-circuit");
        return Bounce::Finish(Outcome::Done(value));
    }
    match node.next() {
        Some(next) => {
            let (args, latest) = strategy.accumulate(value, args);
            Bounce::Continue(Traversal {
                strategy,
                node: next,
                args,
                previous: node,
                context,
                latest,
            })
        }
        None => Bounce::Finish(Outcome::Done(strategy.conclude(value))),
    }
}

/// Who takes the settled value: the bounce that registered the callback,
/// or the callback itself once that bounce has parked the traversal.
enum Handoff {
    Waiting,
    Settled(Value),
    Parked,
}

/// Handle a deferred value returned by `node`.
///
/// A value delivered while `on_settle` is still running is consumed in
/// this bounce. Otherwise the traversal parks on `parked` (or a new
/// handle) and the callback resumes it.
fn wait(
    deferred: Arc<dyn Deferred>,
    strategy: Strategy,
    node: Chain,
    args: Vec<Value>,
    context: Option<Value>,
    parked: Option<&Awaiting>,
) -> Bounce {
    let pending = deferred.is_pending();
    let awaiting = parked.cloned().unwrap_or_else(Awaiting::new);
    let handoff = Arc::new(Mutex::new(Handoff::Waiting));

    let callback = {
        let handoff = Arc::clone(&handoff);
        let awaiting = awaiting.clone();
        let (node, args, context) = (node.clone(), args.clone(), context.clone());
        move |value: Value| {
            {
                let mut state = handoff.lock();
                if let Handoff::Waiting = *state {
                    *state = Handoff::Settled(value);
                    return;
                }
            }
            debug!(?strategy, at = ?node, "deferred value settled, resuming");
            resume(strategy, node, args, value, context, &awaiting);
        }
    };
    deferred.on_settle(Box::new(callback));

    let handed = std::mem::replace(&mut *handoff.lock(), Handoff::Parked);
    match handed {
        Handoff::Settled(value) => advance(strategy, node, args, value, context),
        Handoff::Waiting | Handoff::Parked => {
            if !pending {
                debug!(?strategy, at = ?node, "deferred reported settled without calling back");
            }
            debug!(?strategy, at = ?node, "awaiting deferred value");
            Bounce::Finish(Outcome::Awaiting(awaiting))
        }
    }
}

/// Continue a parked traversal with its settled value and hand the
/// result to `awaiting`, unless the traversal parked on it again.
fn resume(
    strategy: Strategy,
    node: Chain,
    args: Vec<Value>,
    value: Value,
    context: Option<Value>,
    awaiting: &Awaiting,
) {
    let completion = match advance(strategy, node, args, value, context) {
        Bounce::Continue(traversal) => drive_parked(traversal, Some(awaiting)),
        Bounce::Finish(outcome) => Ok(outcome),
    };
    match completion {
        Ok(Outcome::Awaiting(_)) => trace!("traversal parked again"),
        completion => awaiting.complete(completion),
    }
}
