//! Binding targets: anything with named, settable properties.
//!
//! A target is typically a view or widget shim. The trait is deliberately
//! narrow: get, set, and an existence probe. The existence probe runs at
//! binding construction so a typo in a directive fails loudly (a
//! [`kudzu_core::ConfigError::UnknownProperty`]) instead of silently
//! binding to nothing.

use std::collections::{BTreeMap, BTreeSet};

use kudzu_observe::Value;

/// Named mutable properties on a binding target.
pub trait PropertyTarget {
    /// The current value of `property`, or `None` when the target does not
    /// expose it. A declared-but-unset property reads as `Value::Null`, not
    /// `None`.
    fn get_property(&self, property: &str) -> Option<Value>;

    /// Assign `property`. Assignments to undeclared properties are ignored.
    fn set_property(&mut self, property: &str, value: Value);

    /// Whether the target exposes `property` at all.
    fn has_property(&self, property: &str) -> bool {
        self.get_property(property).is_some()
    }
}

/// A plain property bag with a fixed set of declared properties.
///
/// Useful as a view stand-in and in tests; real widgets implement
/// [`PropertyTarget`] over their own state.
#[derive(Debug, Default)]
pub struct PropertySet {
    declared: BTreeSet<String>,
    values: BTreeMap<String, Value>,
}

impl PropertySet {
    /// A target exposing exactly the given property names, all unset.
    pub fn with_properties<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared: properties.into_iter().map(Into::into).collect(),
            values: BTreeMap::new(),
        }
    }
}

impl PropertyTarget for PropertySet {
    fn get_property(&self, property: &str) -> Option<Value> {
        if !self.declared.contains(property) {
            return None;
        }
        Some(self.values.get(property).cloned().unwrap_or(Value::Null))
    }

    fn set_property(&mut self, property: &str, value: Value) {
        if self.declared.contains(property) {
            self.values.insert(property.to_string(), value);
        }
    }

    fn has_property(&self, property: &str) -> bool {
        self.declared.contains(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_unset_reads_null() {
        let target = PropertySet::with_properties(["text"]);
        assert!(target.has_property("text"));
        assert_eq!(target.get_property("text"), Some(Value::Null));
        assert_eq!(target.get_property("missing"), None);
        assert!(!target.has_property("missing"));
    }

    #[test]
    fn set_and_get() {
        let mut target = PropertySet::with_properties(["text", "enabled"]);
        target.set_property("text", Value::from("hi"));
        assert_eq!(target.get_property("text"), Some(Value::from("hi")));

        // Undeclared assignment is dropped.
        target.set_property("color", Value::from("red"));
        assert_eq!(target.get_property("color"), None);
    }
}
