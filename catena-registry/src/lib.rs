#![deny(missing_docs)]
//! Named steps and declarative chain layouts for catena.
//!
//! A [`StepRegistry`] maps names to steps. A [`ChainSpec`] describes a
//! chain in terms of those names and can be read from any serde format,
//! so chain layouts can live in configuration instead of code:
//!
//! ```text
//! ["trim", ["lower", null], "greet"]
//! ```
//!
//! Lists follow [`catena::Chain::from_items`] ordering: the first element
//! ends up at the tail, nested lists are linked in as sub-chains, and
//! `null` stands for a fresh identity step.

mod registry;
mod spec;

pub use registry::StepRegistry;
pub use spec::ChainSpec;
