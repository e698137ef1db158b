//! The dynamic value model.
//!
//! [`Value`] is the uniform currency of the framework: every key of an
//! observable object holds a `Value`, every change record carries `Value`s,
//! and every binding moves `Value`s between model and view. Scalars are
//! owned; objects and arrays are shared handles, so cloning a `Value` never
//! copies a subtree.
//!
//! # Equality
//!
//! Scalars compare by value; handles compare by identity (`Rc::ptr_eq`).
//! Setting a key to a value equal to the current one is a no-op: no change
//! record is built and no observer runs.
//!
//! # Serialization
//!
//! [`Value::to_json`] reflects a value (and, through object handles, a whole
//! adapted tree) into a plain [`serde_json::Value`], preserving array order.
//! The inverse boundary lives in [`crate::adapter`].

use crate::array::ObsArray;
use crate::object::ObsObject;

/// A dynamic value: scalar, observable array, or observable object.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value; also what JSON `null` adapts to.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Int(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    Str(String),
    /// Shared handle to an observable ordered collection.
    Array(ObsArray),
    /// Shared handle to an observable keyed object.
    Object(ObsObject),
}

impl Value {
    /// Whether this value is an object or array handle.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// The object handle, if this value is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObsObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The array handle, if this value is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&ObsArray> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// The string slice, if this value is a string scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer, if this value is an integer scalar.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Reflect this value into a plain JSON value.
    ///
    /// Objects reflect every stored and derived key; arrays keep their
    /// order. Non-finite floats become `null` (JSON has no representation
    /// for them).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::Number((*i).into()),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Array(arr) => arr.to_json(),
            Self::Object(obj) => obj.to_json(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a.ptr_eq(b),
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<ObsArray> for Value {
    fn from(v: ObsArray) -> Self {
        Self::Array(v)
    }
}

impl From<ObsObject> for Value {
    fn from(v: ObsObject) -> Self {
        Self::Object(v)
    }
}
