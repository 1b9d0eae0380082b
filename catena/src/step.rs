//! The Step interface, the unit of work held by every node.

use crate::chain::Chain;
use crate::deferred::Deferred;
use crate::error::StepError;
use serde_json::Value;
use std::sync::Arc;

/// Shared handle to a step. Identity comparisons (`uses_step`,
/// `using_step`, `composed_with`, `before`) compare these allocations.
pub type StepRef = Arc<dyn Step>;

/// What a step hands back to the engine.
///
/// The engine inspects the variant to decide where the traversal goes
/// next. Only [`StepResult::Value`] takes part in threading, short-circuit
/// checks and tail returns.
#[derive(Clone)]
pub enum StepResult {
    /// A plain value.
    Value(Value),
    /// Continue the traversal at this chain with the same arguments,
    /// abandoning the rest of the current chain.
    Redirect(Chain),
    /// Suspend the traversal and hand the caller a continuation.
    Pause,
    /// Resume once this deferred value settles.
    Pending(Arc<dyn Deferred>),
}

impl std::fmt::Debug for StepResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Redirect(chain) => f.debug_tuple("Redirect").field(chain).finish(),
            Self::Pause => f.write_str("Pause"),
            Self::Pending(deferred) => f
                .debug_tuple("Pending")
                .field(&deferred.is_pending())
                .finish(),
        }
    }
}

impl From<Value> for StepResult {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Chain> for StepResult {
    fn from(chain: Chain) -> Self {
        Self::Redirect(chain)
    }
}

/// The receiver a step is invoked with.
#[derive(Debug, Clone, Copy)]
pub enum Receiver<'a> {
    /// The caller supplied an explicit context; every step sees it.
    Context(&'a Value),
    /// No context was supplied; the step sees the node executed before it.
    Node(&'a Chain),
}

/// Everything a step can see about where it runs.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    current: &'a Chain,
    previous: &'a Chain,
    context: Option<&'a Value>,
}

impl<'a> StepContext<'a> {
    pub(crate) fn new(current: &'a Chain, previous: &'a Chain, context: Option<&'a Value>) -> Self {
        Self {
            current,
            previous,
            context,
        }
    }

    /// The receiver: the explicit context if the caller gave one,
    /// otherwise the previously executed node. The first node of a
    /// traversal is its own previous node.
    pub fn receiver(&self) -> Receiver<'a> {
        match self.context {
            Some(context) => Receiver::Context(context),
            None => Receiver::Node(self.previous),
        }
    }

    /// The explicit context, if one was supplied.
    pub fn context(&self) -> Option<&'a Value> {
        self.context
    }

    /// The node executed immediately before this one.
    pub fn previous(&self) -> &'a Chain {
        self.previous
    }

    /// The node whose step is running.
    pub fn current(&self) -> &'a Chain {
        self.current
    }

    /// The pause sentinel. Returning it suspends the traversal.
    pub fn pause(&self) -> StepResult {
        StepResult::Pause
    }
}

/// A unit of computation held by a chain node.
///
/// Implementations receive the arguments chosen by the traversal
/// strategy: a one-element slice for `call`, `distribute`, `some` and
/// `every`, the whole list for `apply` and `distribute_all`.
pub trait Step: Send + Sync {
    /// Run the step.
    fn invoke(&self, ctx: &StepContext<'_>, args: &[Value]) -> Result<StepResult, StepError>;
}

impl<F> Step for F
where
    F: Fn(&StepContext<'_>, &[Value]) -> Result<StepResult, StepError> + Send + Sync,
{
    fn invoke(&self, ctx: &StepContext<'_>, args: &[Value]) -> Result<StepResult, StepError> {
        self(ctx, args)
    }
}

struct Identity;

impl Step for Identity {
    fn invoke(&self, _ctx: &StepContext<'_>, args: &[Value]) -> Result<StepResult, StepError> {
        Ok(StepResult::Value(identity_of(args)))
    }
}

/// The identity of an argument list: its only element, or the whole list
/// as an array when there are several. No arguments yields null.
pub(crate) fn identity_of(args: &[Value]) -> Value {
    match args {
        [] => Value::Null,
        [single] => single.clone(),
        many => Value::Array(many.to_vec()),
    }
}

/// A fresh identity step. Every call allocates a distinct step, so two
/// identity nodes never match each other in identity searches.
pub fn identity() -> StepRef {
    Arc::new(Identity)
}

/// Wrap a full step function.
pub fn from_fn<F>(f: F) -> StepRef
where
    F: Fn(&StepContext<'_>, &[Value]) -> Result<StepResult, StepError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap an infallible unary function. It sees the first argument, or null.
pub fn map<F>(f: F) -> StepRef
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    from_fn(move |_ctx, args| Ok(StepResult::Value(f(args.first().unwrap_or(&Value::Null)))))
}

/// Wrap an infallible function of the whole argument list.
pub fn map_all<F>(f: F) -> StepRef
where
    F: Fn(&[Value]) -> Value + Send + Sync + 'static,
{
    from_fn(move |_ctx, args| Ok(StepResult::Value(f(args))))
}

/// Wrap a unary test, for use with `some` and `every`.
pub fn predicate<F>(f: F) -> StepRef
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    map(move |value| Value::Bool(f(value)))
}

/// Whether two step handles point at the same step.
pub(crate) fn same_step(a: &StepRef, b: &StepRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
