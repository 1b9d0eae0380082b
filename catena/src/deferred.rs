//! The Deferred interface: values that are not settled yet.
//!
//! A step returns [`StepResult::Pending`](crate::StepResult::Pending) with
//! a deferred value to make the traversal wait for it. The engine only
//! asks two things of a deferred: whether it is still pending, and to be
//! called back with the settled value. Resolution and rejection policy
//! belong to whoever implements the trait.

use parking_lot::Mutex;
use serde_json::Value;

/// Callback run exactly once with the settled value.
pub type SettleCallback = Box<dyn FnOnce(Value) + Send>;

/// A promise-like value the engine can wait on.
pub trait Deferred: Send + Sync {
    /// Whether the value is still unsettled.
    fn is_pending(&self) -> bool;

    /// Register a callback for settlement. Implementations must run the
    /// callback immediately when the value has already settled.
    fn on_settle(&self, callback: SettleCallback);
}

enum LatchState {
    Pending(Vec<SettleCallback>),
    Settled(Value),
}

/// A settle-once cell.
///
/// The first call to [`Latch::settle`] wins; later calls are ignored.
/// Callbacks run on the thread that settles the latch, outside the lock.
pub struct Latch {
    state: Mutex<LatchState>,
}

impl Latch {
    /// Create a pending latch.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LatchState::Pending(Vec::new())),
        }
    }

    /// Create a latch that has already settled with `value`.
    pub fn settled(value: Value) -> Self {
        Self {
            state: Mutex::new(LatchState::Settled(value)),
        }
    }

    /// Settle the latch and run every registered callback.
    /// Returns `false` if the latch had already settled.
    pub fn settle(&self, value: Value) -> bool {
        let callbacks = {
            let mut state = self.state.lock();
            match &mut *state {
                LatchState::Settled(_) => return false,
                LatchState::Pending(callbacks) => {
                    let callbacks = std::mem::take(callbacks);
                    *state = LatchState::Settled(value.clone());
                    callbacks
                }
            }
        };
        tracing::debug!(callbacks = callbacks.len(), "latch settled");
        for callback in callbacks {
            callback(value.clone());
        }
        true
    }

    /// The settled value, if any.
    pub fn value(&self) -> Option<Value> {
        match &*self.state.lock() {
            LatchState::Settled(value) => Some(value.clone()),
            LatchState::Pending(_) => None,
        }
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}

impl Deferred for Latch {
    fn is_pending(&self) -> bool {
        matches!(&*self.state.lock(), LatchState::Pending(_))
    }

    fn on_settle(&self, callback: SettleCallback) {
        let settled = {
            let mut state = self.state.lock();
            match &mut *state {
                LatchState::Pending(callbacks) => {
                    callbacks.push(callback);
                    return;
                }
                LatchState::Settled(value) => value.clone(),
            }
        };
        callback(settled);
    }
}

/// Run `future` on the current tokio runtime and settle the returned
/// latch with its output.
///
/// Must be called from within a tokio runtime.
#[cfg(feature = "tokio")]
pub fn spawn<F>(future: F) -> std::sync::Arc<Latch>
where
    F: std::future::Future<Output = Value> + Send + 'static,
{
    let latch = std::sync::Arc::new(Latch::new());
    let settle = std::sync::Arc::clone(&latch);
    tokio::spawn(async move {
        let value = future.await;
        settle.settle(value);
    });
    latch
}
