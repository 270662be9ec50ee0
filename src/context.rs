//! Run Context - per-call data threaded through experiment hooks
//!
//! A `RunContext` is an open mapping from string keys to JSON-shaped values,
//! supplied by the caller for a single `run` and passed by reference into
//! `enabled`, `control`, `candidate`, and `select_observation`. It is never
//! stored on the experiment, so a single experiment instance can serve
//! concurrent callers without any shared mutable state: the context is owned
//! by `run` and dropped when the call returns, on every exit path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied data for a single experiment run.
///
/// Keys are unique and unordered. Values are [`serde_json::Value`], which
/// keeps the context serializable end to end (useful when a publish sink
/// wants to record the inputs alongside the outcome).
///
/// # Example
///
/// ```rust
/// use ensayo::RunContext;
///
/// let ctx = RunContext::new()
///     .with("user_id", 42)
///     .with("rollout", true);
///
/// assert_eq!(ctx.get_i64("user_id"), Some(42));
/// assert_eq!(ctx.get_bool("rollout"), Some(true));
/// assert!(ctx.get("missing").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
}

impl RunContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, builder-style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Insert a key, returning the previous value if the key was present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Get the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a key as a boolean, if present and boolean-valued.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Get a key as an integer, if present and integer-valued.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    /// Get a key as a string slice, if present and string-valued.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of entries in the context.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<BTreeMap<String, Value>> for RunContext {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, Value)> for RunContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_default_is_empty() {
        let ctx = RunContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.len(), 0);
        assert!(ctx.get("anything").is_none());
    }

    #[test]
    fn test_context_with_and_typed_accessors() {
        let ctx = RunContext::new()
            .with("num", 7)
            .with("label", "shadow")
            .with("flag", true);

        assert_eq!(ctx.len(), 3);
        assert_eq!(ctx.get_i64("num"), Some(7));
        assert_eq!(ctx.get_str("label"), Some("shadow"));
        assert_eq!(ctx.get_bool("flag"), Some(true));

        // Wrong-type access returns None rather than coercing.
        assert_eq!(ctx.get_bool("num"), None);
        assert_eq!(ctx.get_str("flag"), None);
    }

    #[test]
    fn test_context_insert_overwrites() {
        let mut ctx = RunContext::new();
        assert!(ctx.insert("key", 1).is_none());
        let previous = ctx.insert("key", 2);
        assert_eq!(previous, Some(Value::from(1)));
        assert_eq!(ctx.get_i64("key"), Some(2));
    }

    #[test]
    fn test_context_serializes_flat() {
        let ctx = RunContext::new().with("num", 2).with("flag", false);
        let json = serde_json::to_value(&ctx).expect("serialization failed");
        assert_eq!(json, serde_json::json!({"num": 2, "flag": false}));
    }

    #[test]
    fn test_context_from_map() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::from("v"));
        let ctx = RunContext::from(map);
        assert_eq!(ctx.get_str("k"), Some("v"));
    }
}
