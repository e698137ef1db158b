//! Value transformers: named, optionally reversible functions applied as
//! values cross a binding.
//!
//! A one-way transformer has only a forward function. Two-way bindings
//! require a reverse function; asking for one where none exists is a
//! [`ConfigError::NotReversible`], raised loudly at binding construction
//! rather than silently writing untransformed values back into the model.
//!
//! Transformers are looked up by name through a [`TransformerRegistry`] when
//! binding directives are resolved; the `"identity"` transformer is always
//! registered.

use std::collections::BTreeMap;
use std::rc::Rc;

use kudzu_core::ConfigError;
use kudzu_observe::Value;
use tracing::debug;

/// Name under which the built-in pass-through transformer is registered.
pub const IDENTITY: &str = "identity";

type TransformFn = Rc<dyn Fn(&Value) -> Value>;

/// A named value transformation, optionally reversible.
#[derive(Clone)]
pub struct Transformer {
    name: String,
    forward: TransformFn,
    reverse: Option<TransformFn>,
}

impl Transformer {
    /// A one-way transformer.
    pub fn new(name: impl Into<String>, forward: impl Fn(&Value) -> Value + 'static) -> Self {
        Self {
            name: name.into(),
            forward: Rc::new(forward),
            reverse: None,
        }
    }

    /// A transformer with both directions, usable in two-way bindings.
    pub fn reversible(
        name: impl Into<String>,
        forward: impl Fn(&Value) -> Value + 'static,
        reverse: impl Fn(&Value) -> Value + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            forward: Rc::new(forward),
            reverse: Some(Rc::new(reverse)),
        }
    }

    /// The built-in pass-through transformer. Reversible by definition.
    #[must_use]
    pub fn identity() -> Self {
        Self::reversible(IDENTITY, Value::clone, Value::clone)
    }

    /// The registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a reverse function exists.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.reverse.is_some()
    }

    /// Apply the forward direction (model to target).
    #[must_use]
    pub fn transform(&self, value: &Value) -> Value {
        (self.forward)(value)
    }

    /// Apply the reverse direction (target to model).
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotReversible`] when no reverse function was declared.
    pub fn reverse_transform(&self, value: &Value) -> Result<Value, ConfigError> {
        match &self.reverse {
            Some(reverse) => Ok(reverse(value)),
            None => Err(ConfigError::NotReversible {
                transformer: self.name.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer")
            .field("name", &self.name)
            .field("reversible", &self.is_reversible())
            .finish()
    }
}

/// Name-keyed transformer lookup for directive resolution.
///
/// Always contains [`IDENTITY`].
pub struct TransformerRegistry {
    by_name: BTreeMap<String, Transformer>,
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformerRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut by_name = BTreeMap::new();
        let identity = Transformer::identity();
        by_name.insert(identity.name().to_string(), identity);
        Self { by_name }
    }

    /// Register a transformer under its name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register(&mut self, transformer: Transformer) {
        debug!(name = transformer.name(), "transformer registered");
        self.by_name
            .insert(transformer.name().to_string(), transformer);
    }

    /// Look up a transformer by name.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownTransformer`] when nothing is registered under
    /// `name`.
    pub fn resolve(&self, name: &str) -> Result<&Transformer, ConfigError> {
        self.by_name
            .get(name)
            .ok_or_else(|| ConfigError::UnknownTransformer {
                name: name.to_string(),
            })
    }

    /// Registered transformer names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("names", &self.by_name.keys().collect::<Vec<_>>())
            .finish()
    }
}
