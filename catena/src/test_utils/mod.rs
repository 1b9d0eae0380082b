//! Step helpers for tests.
//!
//! Available behind the `test-utils` feature flag.

mod call_log;
mod counter;

pub use call_log::{CallLog, Recorded};
pub use counter::Counter;

use crate::step::{self, StepRef};
use serde_json::Value;

/// A step that prepends `prefix` to its argument: `tag("a")` turns `1`
/// into `"a1"` and `"b1"` into `"ab1"`.
pub fn tag(prefix: &str) -> StepRef {
    let prefix = prefix.to_string();
    step::map(move |value| Value::String(format!("{prefix}{}", plain(value))))
}

/// Render a value without JSON quoting for strings.
pub fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
