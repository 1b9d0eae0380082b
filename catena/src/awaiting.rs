//! Traversals parked on a pending deferred value.

use crate::engine::Outcome;
use crate::error::StepError;
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

type Completion = Result<Outcome, StepError>;

#[derive(Default)]
struct State {
    completion: Option<Completion>,
    waker: Option<Waker>,
}

/// Handle to a traversal waiting for a deferred value.
///
/// The traversal resumes on whichever thread settles the deferred value
/// and runs to its end, then leaves its result here. Take it with
/// [`Awaiting::try_take`] or by awaiting the handle. If the resumed
/// traversal parks on another deferred value, this handle follows it and
/// completes only when the final result is known. One handle serves the
/// whole traversal however many times it parks.
///
/// The result can be taken once. Clones observe the same slot.
#[derive(Clone)]
pub struct Awaiting {
    state: Arc<Mutex<State>>,
}

impl Awaiting {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub(crate) fn complete(&self, completion: Completion) {
        let waker = {
            let mut state = self.state.lock();
            state.completion = Some(completion);
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Whether a result is waiting to be taken.
    pub fn is_settled(&self) -> bool {
        self.state.lock().completion.is_some()
    }

    /// Take the result if the traversal has finished.
    pub fn try_take(&self) -> Option<Completion> {
        self.state.lock().completion.take()
    }
}

impl Future for Awaiting {
    type Output = Completion;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.state.lock();
        match state.completion.take() {
            Some(completion) => Poll::Ready(completion),
            None => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl std::fmt::Debug for Awaiting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Awaiting")
            .field("settled", &self.is_settled())
            .finish_non_exhaustive()
    }
}
