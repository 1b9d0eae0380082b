//! Executing chains.
//!
//! | Operation | Step sees | Next node sees | Stops on |
//! |-----------|-----------|----------------|----------|
//! | [`Chain::call`] | one value | the value returned | never |
//! | [`Chain::apply`] | an argument list | the value returned, as a list | never |
//! | [`Chain::distribute`] | one value | the original value | never |
//! | [`Chain::distribute_all`] | an argument list | the original list | never |
//! | [`Chain::some`] | one value | the original value | `true` |
//! | [`Chain::every`] | one value | the original value | `false` |
//!
//! Nodes run head to tail. A `false` from a `call` or `apply` step is an
//! ordinary value and does not stop the traversal.
//!
//! The receiver rule holds for all of them: with an explicit receiver
//! every step sees that value; without one every step sees the node that
//! ran before it, and the first node sees itself.

pub(crate) mod strategy;
pub(crate) mod trampoline;

use crate::awaiting::Awaiting;
use crate::chain::Chain;
use crate::continuation::Continuation;
use crate::error::StepError;
use serde_json::Value;
use strategy::Strategy;
use trampoline::{Traversal, drive};

/// How a traversal ended.
#[derive(Debug)]
pub enum Outcome {
    /// The traversal ran to completion or short-circuited.
    Done(Value),
    /// A step returned the pause sentinel.
    Suspended(Continuation),
    /// A step returned a deferred value that is still pending.
    Awaiting(Awaiting),
}

impl Outcome {
    /// The final value, if the traversal is done.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Done(value) => Some(value),
            Self::Suspended(_) | Self::Awaiting(_) => None,
        }
    }

    /// Consume into the final value, if the traversal is done.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Done(value) => Some(value),
            Self::Suspended(_) | Self::Awaiting(_) => None,
        }
    }

    /// Consume into the continuation, if the traversal was suspended.
    pub fn into_continuation(self) -> Option<Continuation> {
        match self {
            Self::Suspended(continuation) => Some(continuation),
            Self::Done(_) | Self::Awaiting(_) => None,
        }
    }

    /// Consume into the awaiting handle, if the traversal is parked.
    pub fn into_awaiting(self) -> Option<Awaiting> {
        match self {
            Self::Awaiting(awaiting) => Some(awaiting),
            Self::Done(_) | Self::Suspended(_) => None,
        }
    }

    /// Whether the traversal finished.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }
}

impl Chain {
    fn run(
        &self,
        strategy: Strategy,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> Result<Outcome, StepError> {
        drive(Traversal::start(strategy, self, args, receiver))
    }

    /// Thread `arg` through the chain, head to tail: each step gets the
    /// value returned by the step before it.
    pub fn call(&self, arg: Value, receiver: Option<Value>) -> Result<Outcome, StepError> {
        self.run(Strategy::Call, vec![arg], receiver)
    }

    /// Thread an argument list through the chain. Each returned value
    /// becomes the next list: arrays are spread, null becomes an empty
    /// list, anything else a one-element list.
    pub fn apply(&self, args: Vec<Value>, receiver: Option<Value>) -> Result<Outcome, StepError> {
        self.run(Strategy::Apply, args, receiver)
    }

    /// Alias of [`Chain::apply`].
    pub fn spread(&self, args: Vec<Value>, receiver: Option<Value>) -> Result<Outcome, StepError> {
        self.apply(args, receiver)
    }

    /// Invoke every step with the same `arg`. Returns the last step's value.
    pub fn distribute(&self, arg: Value, receiver: Option<Value>) -> Result<Outcome, StepError> {
        self.run(Strategy::Distribute, vec![arg], receiver)
    }

    /// Invoke every step with the same argument list. Returns the last
    /// step's value.
    pub fn distribute_all(
        &self,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> Result<Outcome, StepError> {
        self.run(Strategy::DistributeAll, args, receiver)
    }

    /// `true` as soon as a step returns `true`, `false` if none does.
    pub fn some(&self, arg: Value, receiver: Option<Value>) -> Result<Outcome, StepError> {
        self.run(Strategy::Some, vec![arg], receiver)
    }

    /// `false` as soon as a step returns `false`, `true` if none does.
    pub fn every(&self, arg: Value, receiver: Option<Value>) -> Result<Outcome, StepError> {
        self.run(Strategy::Every, vec![arg], receiver)
    }
}
