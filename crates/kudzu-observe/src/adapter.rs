//! The boundary adapter: plain JSON trees in, observable trees out.
//!
//! [`adapt`] converts a `serde_json::Value` into the dynamic [`Value`]
//! model: JSON objects become [`ObsObject`]s, JSON arrays become
//! [`ObsArray`]s, scalars pass through. Adaptation is deep — every nested
//! object and every element of every nested collection comes out
//! observable, so a mutation anywhere in the tree can be heard along its
//! key path.
//!
//! [`adapted`] is the idempotent entry point for values that may already be
//! observable: handles pass through with the same identity (no re-wrapping,
//! no copying), scalars unchanged. Adapting a primitive is always a no-op.
//!
//! The inverse direction is [`Value::to_json`] / [`ObsObject::to_json`]:
//! an adapted tree reflects back into plain JSON with all keys present and
//! array order preserved.
//!
//! Foreign keys that are not path-addressable (empty or containing `.`)
//! are stored faithfully so serialization round-trips; they simply cannot
//! be reached by a [`kudzu_core::KeyPath`].

use crate::array::ObsArray;
use crate::object::ObsObject;
use crate::value::Value;

/// Deeply adapt a plain JSON value into the observable model.
#[must_use]
pub fn adapt(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            // The fresh array has no owner yet, so these pushes are silent.
            let arr = ObsArray::from_values(items.into_iter().map(adapt).collect());
            Value::Array(arr)
        }
        serde_json::Value::Object(map) => Value::Object(adapt_object(map)),
    }
}

/// Deeply adapt a JSON object into an [`ObsObject`].
#[must_use]
pub fn adapt_object(map: serde_json::Map<String, serde_json::Value>) -> ObsObject {
    let obj = ObsObject::new();
    for (key, json) in map {
        obj.insert_raw(key, adapt(json));
    }
    obj
}

/// Idempotent adaptation: already-observable handles are returned with the
/// same identity; primitives are returned unchanged.
#[must_use]
pub fn adapted(value: Value) -> Value {
    // The dynamic model is observable by construction; this is the
    // explicit no-op form the idempotence contract names.
    value
}
