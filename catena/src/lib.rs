//! # catena: stack-safe step chains
//!
//! A [`Chain`] is a singly-linked list of [`Step`]s. Chains can be
//! composed and rewritten in place, searched by step identity or position,
//! and executed with one of six traversal strategies.
//!
//! ## Execution
//!
//! | Operation | What it does |
//! |-----------|-------------|
//! | [`Chain::call`] / [`Chain::apply`] | Thread a value (or argument list) head to tail |
//! | [`Chain::distribute`] / [`Chain::distribute_all`] | Broadcast the same input to every node |
//! | [`Chain::some`] / [`Chain::every`] | Short-circuiting predicates |
//!
//! Every traversal runs on a trampoline, so a chain of any length
//! executes, searches and drops in constant stack.
//!
//! ## Control transfer
//!
//! A step returns a [`StepResult`]. Besides plain values it can:
//!
//! - redirect the traversal into another chain ([`StepResult::Redirect`]);
//! - suspend it, handing the caller a [`Continuation`] ([`StepResult::Pause`]);
//! - park it on a [`Deferred`] value until that settles
//!   ([`StepResult::Pending`]), handing the caller an [`Awaiting`] handle.
//!
//! ## Aliasing
//!
//! Nodes are shared, not copied. `push` allocates a new head, but
//! `insert`, `before`, `remove`, `pop`, `shift` and `unshift` rewrite
//! `next` pointers of existing nodes, and every chain sharing those nodes
//! sees the result.
//!
//! ## Threading
//!
//! Steps are `Send + Sync` and nodes guard their links with a mutex, but
//! a traversal runs on one thread and there is no ordering guarantee
//! between a traversal and a concurrent mutation of the same chain.

#![deny(missing_docs)]

pub mod awaiting;
pub mod chain;
pub mod continuation;
pub mod deferred;
pub mod engine;
pub mod error;
mod search;
pub mod step;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use awaiting::Awaiting;
pub use chain::{Chain, Link};
pub use continuation::Continuation;
pub use deferred::{Deferred, Latch, SettleCallback};
pub use engine::Outcome;
pub use error::{ChainError, StepError};
pub use step::{Receiver, Step, StepContext, StepRef, StepResult};
