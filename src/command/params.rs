// src/command/params.rs

//! Ordered parameter list attached to a [`Command`](super::Command).
//!
//! Keys are either a position (an unnamed argument) or a name (a flag or
//! option). Insertion order is kept and becomes the rendered argument order.

use std::fmt;

use serde_json::Value;

/// Key of a single parameter entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Unnamed argument; rendered as the bare value.
    Position(usize),
    /// Named argument; rendered as `--name=value` or `name value`
    /// depending on the invocation kind.
    Named(String),
}

impl ParamKey {
    pub fn is_positional(&self) -> bool {
        matches!(self, ParamKey::Position(_))
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Position(idx) => write!(f, "{idx}"),
            ParamKey::Named(name) => f.write_str(name),
        }
    }
}

/// Insertion-ordered `(key, value)` pairs.
///
/// Values are JSON values so that arrays and objects can be passed through
/// to the target command as a single encoded argument.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(ParamKey, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list of unnamed arguments, in order.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values.into_iter().fold(Self::new(), |params, v| params.arg(v))
    }

    /// Append an unnamed argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.push_arg(value);
        self
    }

    /// Append a named argument.
    pub fn named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_named(key, value);
        self
    }

    /// Append an unnamed argument using the next free position.
    ///
    /// Positions continue after the highest position already present.
    pub fn push_arg(&mut self, value: impl Into<Value>) {
        let next = self
            .entries
            .iter()
            .filter_map(|(key, _)| match key {
                ParamKey::Position(idx) => Some(idx + 1),
                ParamKey::Named(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.entries.push((ParamKey::Position(next), value.into()));
    }

    pub fn push_named(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((ParamKey::Named(key.into()), value.into()));
    }

    pub fn push(&mut self, key: ParamKey, value: Value) {
        self.entries.push((key, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ParamKey, Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(ParamKey, Value)> for Params {
    fn from_iter<T: IntoIterator<Item = (ParamKey, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a (ParamKey, Value);
    type IntoIter = std::slice::Iter<'a, (ParamKey, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_insertion_order_across_key_kinds() {
        let params = Params::new().arg("a").named("flag", 1).arg("b");
        let keys: Vec<String> = params.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["0", "flag", "1"]);
    }

    #[test]
    fn positions_continue_after_highest_index() {
        let mut params: Params = vec![(ParamKey::Position(4), json!("x"))].into_iter().collect();
        params.push_arg("y");
        let last = params.iter().last().map(|(k, _)| k.clone());
        assert_eq!(last, Some(ParamKey::Position(5)));
    }

    #[test]
    fn positional_constructor_accepts_mixed_values() {
        let params = Params::positional([json!("bar"), json!(123)]);
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|(k, _)| k.is_positional()));
    }
}
