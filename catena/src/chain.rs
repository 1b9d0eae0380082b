//! Chain nodes and their mutation primitives.
//!
//! A [`Chain`] is a handle to one node. Handles are cheap to clone and
//! compare by node identity, so several heads can share one tail. The
//! destructive operations (`insert`, `before`, `remove`, `pop`, `shift`,
//! `unshift`) rewrite `next` pointers in place: every handle that can
//! reach the rewritten node observes the change.

use crate::error::ChainError;
use crate::step::{self, StepRef};
use parking_lot::Mutex;
use std::sync::Arc;

struct Node {
    step: StepRef,
    next: Mutex<Option<Chain>>,
}

impl Drop for Node {
    // Unlink uniquely owned successors one at a time so that dropping a
    // long chain does not recurse once per node.
    fn drop(&mut self) {
        let mut next = self.next.get_mut().take();
        while let Some(chain) = next {
            match Arc::try_unwrap(chain.node) {
                Ok(mut node) => next = node.next.get_mut().take(),
                Err(_) => break,
            }
        }
    }
}

/// A handle to a chain node, and through it to every node downstream.
#[derive(Clone)]
pub struct Chain {
    node: Arc<Node>,
}

/// Something that can be linked into a chain: a single step, or an
/// existing chain that is linked in as a contiguous fragment.
#[derive(Clone)]
pub enum Link {
    /// A step, wrapped in a fresh node.
    Step(StepRef),
    /// An existing chain, relinked in place.
    Chain(Chain),
}

impl From<StepRef> for Link {
    fn from(step: StepRef) -> Self {
        Self::Step(step)
    }
}

impl From<&StepRef> for Link {
    fn from(step: &StepRef) -> Self {
        Self::Step(Arc::clone(step))
    }
}

impl From<Chain> for Link {
    fn from(chain: Chain) -> Self {
        Self::Chain(chain)
    }
}

impl From<&Chain> for Link {
    fn from(chain: &Chain) -> Self {
        Self::Chain(chain.clone())
    }
}

impl Chain {
    /// A single node wrapping `step`, with no successor.
    pub fn new(step: StepRef) -> Self {
        Self::with_next(step, None)
    }

    /// A single node wrapping `step` in front of `next`.
    pub fn with_next(step: StepRef, next: Option<Chain>) -> Self {
        Self {
            node: Arc::new(Node {
                step,
                next: Mutex::new(next),
            }),
        }
    }

    /// A single identity node.
    pub fn identity() -> Self {
        Self::new(step::identity())
    }

    /// Build a chain from an ordered list of steps and chains.
    ///
    /// Equivalent to pushing every element in turn onto the first, so the
    /// first element ends up at the tail and the last element is the head
    /// returned. Chain elements are linked in with their own order intact.
    pub fn from_items<I>(items: I) -> Result<Self, ChainError>
    where
        I: IntoIterator,
        I::Item: Into<Link>,
    {
        let mut items = items.into_iter().map(Into::into);
        let mut head = match items.next() {
            Some(Link::Step(step)) => Self::new(step),
            Some(Link::Chain(chain)) => chain,
            None => return Err(ChainError::invalid_step("an empty list")),
        };
        for item in items {
            head = head.push(item);
        }
        Ok(head)
    }

    /// The step held by this node.
    pub fn step(&self) -> &StepRef {
        &self.node.step
    }

    /// The node immediately after this one.
    pub fn next(&self) -> Option<Chain> {
        self.node.next.lock().clone()
    }

    pub(crate) fn set_next(&self, next: Option<Chain>) {
        *self.node.next.lock() = next;
    }

    /// The tail-most node reachable from here (this node when it has no
    /// successor).
    pub fn last(&self) -> Chain {
        let mut current = self.clone();
        while let Some(next) = current.next() {
            current = next;
        }
        current
    }

    /// Iterate over this node and everything downstream, head to tail.
    pub fn iter(&self) -> Iter {
        Iter {
            cursor: Some(self.clone()),
        }
    }

    /// A new node with this node's step and successor, unless
    /// replacements are given. The original node is untouched.
    pub fn fork(&self, step: Option<StepRef>, next: Option<Chain>) -> Chain {
        Chain::with_next(
            step.unwrap_or_else(|| Arc::clone(self.step())),
            next.or_else(|| self.next()),
        )
    }

    /// Put a step or chain in front of this one and return the new head.
    ///
    /// A step gets a fresh node pointing here; this chain is unchanged.
    /// A chain has its tail relinked to this node (mutating that chain)
    /// and is returned as the head.
    pub fn push(&self, item: impl Into<Link>) -> Chain {
        match item.into() {
            Link::Step(step) => Chain::with_next(step, Some(self.clone())),
            Link::Chain(chain) => {
                chain.last().set_next(Some(self.clone()));
                chain
            }
        }
    }

    /// Splice a step or chain in right after this node and return the
    /// inserted head. The inserted fragment's tail takes over this
    /// node's previous successor.
    pub fn insert(&self, item: impl Into<Link>) -> Chain {
        let rest = self.next();
        let inserted = match item.into() {
            Link::Step(step) => Chain::with_next(step, rest),
            Link::Chain(chain) => {
                chain.last().set_next(rest);
                chain
            }
        };
        self.set_next(Some(inserted.clone()));
        inserted
    }

    /// Append at the tail end and return the appended head.
    pub fn unshift(&self, item: impl Into<Link>) -> Chain {
        self.last().insert(item)
    }

    /// Insert `item` (an identity step when `None`) right after the first
    /// node using `matching`. When `matching` is `None` or nothing uses
    /// it, the insertion point is this node. Returns the inserted head.
    pub fn before(&self, matching: Option<&StepRef>, item: Option<Link>) -> Chain {
        let anchor = matching
            .and_then(|step| self.using_step(step))
            .unwrap_or_else(|| self.clone());
        anchor.insert(item.unwrap_or_else(|| Link::Step(step::identity())))
    }

    /// Splice out the node after this one and return this node.
    pub fn remove(&self) -> Chain {
        let skipped = self.next().and_then(|next| next.next());
        self.set_next(skipped);
        self.clone()
    }

    /// Cut everything after this node and return this node.
    pub fn pop(&self) -> Chain {
        self.set_next(None);
        self.clone()
    }

    /// Detach and return the tail-most node. A single node has nothing to
    /// detach from and yields `None`.
    pub fn shift(&self) -> Option<Chain> {
        let penultimate = self.iter().find(|node| {
            node.next()
                .is_some_and(|next| next.node.next.lock().is_none())
        })?;
        let last = penultimate.next();
        penultimate.set_next(None);
        last
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::identity()
    }
}

impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Chain {}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Chain")
            .field(&Arc::as_ptr(&self.node))
            .finish()
    }
}

/// Iterator over the nodes of a chain. See [`Chain::iter`].
pub struct Iter {
    cursor: Option<Chain>,
}

impl Iterator for Iter {
    type Item = Chain;

    fn next(&mut self) -> Option<Chain> {
        let current = self.cursor.take()?;
        self.cursor = current.next();
        Some(current)
    }
}

impl IntoIterator for &Chain {
    type Item = Chain;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        self.iter()
    }
}
