//! Error types for steps and chain construction.

use thiserror::Error;

/// Errors raised by a step while it runs.
///
/// The engine never catches or retries these. A failing step ends the
/// traversal and the error is returned to whoever drove the chain.
/// Nodes already visited are not rolled back.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StepError {
    /// The step failed with a message.
    #[error("step failed: {0}")]
    Failed(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl StepError {
    /// Convenience constructor for [`StepError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors raised while building chains.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ChainError {
    /// The input was neither a step, a chain, nor a non-empty list of them.
    #[error("invalid step: expected a step, a chain or a list of them, found {found}")]
    InvalidStep {
        /// Description of what was supplied instead.
        found: String,
    },

    /// A named step was requested but nothing is registered under that name.
    #[error("unknown step: {0}")]
    UnknownStep(String),

    /// A step error propagated through chain construction.
    #[error("step error: {0}")]
    Step(#[from] StepError),
}

impl ChainError {
    /// Convenience constructor for [`ChainError::InvalidStep`].
    pub fn invalid_step(found: impl Into<String>) -> Self {
        Self::InvalidStep {
            found: found.into(),
        }
    }
}
