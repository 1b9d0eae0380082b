//! Declarative chain layouts.

use crate::registry::StepRegistry;
use catena::chain::Link;
use catena::{Chain, ChainError, step};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chain layout.
///
/// Serialized untagged: `null` is [`ChainSpec::Identity`], a string is
/// [`ChainSpec::Step`], a list is [`ChainSpec::Chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainSpec {
    /// A fresh identity step.
    Identity,
    /// The step registered under this name.
    Step(String),
    /// A chain of layouts, first element at the tail.
    Chain(Vec<ChainSpec>),
}

impl ChainSpec {
    /// Validate raw JSON into a layout.
    ///
    /// Numbers, booleans, objects and empty lists are rejected with
    /// [`ChainError::InvalidStep`], at any nesting depth.
    pub fn from_value(value: &Value) -> Result<Self, ChainError> {
        match value {
            Value::Null => Ok(Self::Identity),
            Value::String(name) => Ok(Self::Step(name.clone())),
            Value::Array(items) if items.is_empty() => {
                Err(ChainError::invalid_step("an empty list"))
            }
            Value::Array(items) => items
                .iter()
                .map(Self::from_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Chain),
            Value::Bool(_) => Err(ChainError::invalid_step(format!("boolean {value}"))),
            Value::Number(_) => Err(ChainError::invalid_step(format!("number {value}"))),
            Value::Object(_) => Err(ChainError::invalid_step("an object")),
        }
    }

    /// Resolve names against `registry` and build the chain. Returns the
    /// head.
    pub fn build(&self, registry: &StepRegistry) -> Result<Chain, ChainError> {
        match self.link(registry)? {
            Link::Step(step) => Ok(Chain::new(step)),
            Link::Chain(chain) => Ok(chain),
        }
    }

    /// Every step name the layout mentions, in layout order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Identity => Vec::new(),
            Self::Step(name) => vec![name.as_str()],
            Self::Chain(items) => items.iter().flat_map(Self::names).collect(),
        }
    }

    fn link(&self, registry: &StepRegistry) -> Result<Link, ChainError> {
        match self {
            Self::Identity => Ok(Link::Step(step::identity())),
            Self::Step(name) => registry
                .get(name)
                .map(Link::Step)
                .ok_or_else(|| ChainError::UnknownStep(name.clone())),
            Self::Chain(items) => {
                let links = items
                    .iter()
                    .map(|item| item.link(registry))
                    .collect::<Result<Vec<_>, _>>()?;
                Chain::from_items(links).map(Link::Chain)
            }
        }
    }
}

impl TryFrom<&Value> for ChainSpec {
    type Error = ChainError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}
