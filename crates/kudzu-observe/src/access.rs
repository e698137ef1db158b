//! The property accessor protocol.
//!
//! [`KeyAccess`] is the explicit capability interface replacing
//! convention-based accessor lookup: a type that can get and set named keys
//! implements the two required methods and receives key-path traversal for
//! free. [`ObsObject`] implements it; duck-typed domain types can implement
//! it themselves and keep their own storage, with the generic JSON adapter
//! (see [`crate::adapter`]) serving only as the boundary fallback.
//!
//! # Traversal semantics
//!
//! - **Read** through a missing or non-object intermediate: `None`, never
//!   an error.
//! - **Write** through a missing intermediate:
//!   [`KeyPathError::UnresolvableWrite`]. Through a scalar or array:
//!   [`KeyPathError::NotAContainer`]. The terminal key itself may be
//!   absent — the write creates it; only a missing terminal *container*
//!   fails.

use kudzu_core::{KeyPath, KeyPathError};

use crate::object::ObsObject;
use crate::value::Value;

/// Uniform get/set of named keys, plus dotted key-path traversal.
pub trait KeyAccess {
    /// The current value for a single key, or `None` when absent.
    fn value_for_key(&self, key: &str) -> Option<Value>;

    /// Set a single key.
    ///
    /// # Errors
    ///
    /// Implementations reject malformed keys with a [`KeyPathError`].
    fn set_value_for_key(&self, key: &str, value: Value) -> Result<(), KeyPathError>;

    /// Resolve a dotted path. Short-circuits to `None` on any missing or
    /// non-object intermediate.
    fn value_for_key_path(&self, path: &KeyPath) -> Option<Value> {
        let mut segments = path.segments();
        let first = segments.next()?;
        let mut current = self.value_for_key(first)?;
        for segment in segments {
            let Value::Object(obj) = current else {
                return None;
            };
            current = obj.value_for_key(segment)?;
        }
        Some(current)
    }

    /// Assign through a dotted path.
    ///
    /// # Errors
    ///
    /// [`KeyPathError::UnresolvableWrite`] when an intermediate segment is
    /// absent, [`KeyPathError::NotAContainer`] when one resolves to a
    /// scalar or array.
    fn set_value_for_key_path(&self, path: &KeyPath, value: Value) -> Result<(), KeyPathError> {
        let segments: Vec<&str> = path.segments().collect();
        // A KeyPath is never empty; guard anyway rather than panicking.
        let Some((terminal, intermediates)) = segments.split_last() else {
            return Err(KeyPathError::EmptyPath);
        };
        if intermediates.is_empty() {
            return self.set_value_for_key(terminal, value);
        }

        let mut current = match self.value_for_key(intermediates[0]) {
            Some(v) => v,
            None => {
                return Err(KeyPathError::UnresolvableWrite {
                    path: path.to_string(),
                    segment: intermediates[0].to_string(),
                });
            }
        };
        for segment in &intermediates[1..] {
            let Value::Object(obj) = current else {
                return Err(KeyPathError::NotAContainer {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            };
            current = match obj.value_for_key(segment) {
                Some(v) => v,
                None => {
                    return Err(KeyPathError::UnresolvableWrite {
                        path: path.to_string(),
                        segment: (*segment).to_string(),
                    });
                }
            };
        }
        let Value::Object(container) = current else {
            return Err(KeyPathError::NotAContainer {
                path: path.to_string(),
                segment: (*terminal).to_string(),
            });
        };
        container.set_value_for_key(terminal, value)
    }
}

impl KeyAccess for ObsObject {
    fn value_for_key(&self, key: &str) -> Option<Value> {
        self.get(key)
    }

    fn set_value_for_key(&self, key: &str, value: Value) -> Result<(), KeyPathError> {
        self.set_checked(key, value)
    }
}
