//! Traversal strategies: what each execution operation hands to a step,
//! how the next argument list is formed, and when to stop.

use crate::step::identity_of;
use serde_json::Value;

/// How a traversal treats arguments and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Thread one value through the chain.
    Call,
    /// Thread an argument list through the chain.
    Apply,
    /// Give every node the same single argument.
    Distribute,
    /// Give every node the same argument list.
    DistributeAll,
    /// Stop at the first `true`.
    Some,
    /// Stop at the first `false`.
    Every,
}

impl Strategy {
    /// The slice a step is invoked with.
    pub(crate) fn arguments(self, args: &[Value]) -> &[Value] {
        match self {
            Self::Apply | Self::DistributeAll => args,
            Self::Call | Self::Distribute | Self::Some | Self::Every => &args[..args.len().min(1)],
        }
    }

    /// Split the value just produced into the argument list for the next
    /// node and the latest value kept aside. Threading strategies feed the
    /// value forward and keep nothing; the others keep it.
    pub(crate) fn accumulate(self, value: Value, args: Vec<Value>) -> (Vec<Value>, Value) {
        match self {
            Self::Call => (vec![value], Value::Null),
            Self::Apply => (spread(value), Value::Null),
            Self::Distribute | Self::DistributeAll | Self::Some | Self::Every => (args, value),
        }
    }

    /// Whether `value` ends the traversal early.
    pub(crate) fn stops(self, value: &Value) -> bool {
        match self {
            Self::Some => *value == Value::Bool(true),
            Self::Every => *value == Value::Bool(false),
            Self::Call | Self::Apply | Self::Distribute | Self::DistributeAll => false,
        }
    }

    /// The result when the tail produced `value` without stopping.
    pub(crate) fn conclude(self, value: Value) -> Value {
        match self {
            Self::Some => Value::Bool(false),
            Self::Every => Value::Bool(true),
            Self::Call | Self::Apply | Self::Distribute | Self::DistributeAll => value,
        }
    }

    /// The result when a resumed traversal has no node left to visit:
    /// what the tail would have concluded with had the pausing step not
    /// been there.
    pub(crate) fn exhausted(self, args: &[Value], latest: Value) -> Value {
        match self {
            Self::Call => args.first().cloned().unwrap_or(Value::Null),
            Self::Apply => identity_of(args),
            Self::Distribute | Self::DistributeAll | Self::Some | Self::Every => {
                self.conclude(latest)
            }
        }
    }
}

/// Coerce a returned value into an argument list.
fn spread(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
