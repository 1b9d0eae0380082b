//! Identity and position lookups.
//!
//! Every lookup walks the chain with [`Chain::iter`], so chain length
//! never shows up as call depth. Absence is an ordinary `None`.

use crate::chain::Chain;
use crate::step::{StepRef, same_step};

impl Chain {
    /// The node `n` steps downstream; `index(0)` is this node.
    pub fn index(&self, n: usize) -> Option<Chain> {
        self.iter().nth(n)
    }

    /// Whether this node holds exactly `step`.
    pub fn uses_step(&self, step: &StepRef) -> bool {
        same_step(self.step(), step)
    }

    /// The first node, starting here, that holds `step`.
    pub fn using_step(&self, step: &StepRef) -> Option<Chain> {
        self.iter().find(|node| node.uses_step(step))
    }

    /// The node immediately before the first downstream node holding
    /// `step`. `None` when only this node holds it.
    pub fn composed_with(&self, step: &StepRef) -> Option<Chain> {
        self.iter()
            .find(|node| node.next().is_some_and(|next| next.uses_step(step)))
    }

    /// The node whose successor is `node`. With `None`, the node that has
    /// no successor.
    pub fn precedent(&self, node: Option<&Chain>) -> Option<Chain> {
        self.iter().find(|candidate| candidate.precedes(node))
    }

    /// The node two hops before `node`. With `None`, the node two hops
    /// before the end.
    pub fn super_precedent(&self, node: Option<&Chain>) -> Option<Chain> {
        self.iter()
            .find(|candidate| candidate.next().is_some_and(|next| next.precedes(node)))
    }

    /// Whether `node` is this node's successor. With `None`, whether this
    /// node is the tail.
    pub fn precedes(&self, node: Option<&Chain>) -> bool {
        self.next().as_ref() == node
    }
}
