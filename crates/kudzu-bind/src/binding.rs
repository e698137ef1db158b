//! Live bindings from a model key path to a target property.
//!
//! A [`Binding`] registers one observer on the source object and pushes
//! every committed change, through its transformer, into the target
//! property. Construction pulls the current model value first, so the
//! target never shows a stale default.
//!
//! Two-way bindings also accept edits from the target side via
//! [`Binding::push_from_target`]; the reverse-transformed value is written
//! back through the key path. A shared `syncing` flag suppresses the echo:
//! the model write triggered by a target edit does not re-enter the target,
//! and vice versa.
//!
//! Lifecycle is RAII. Dropping a `Binding` drops its subscription and the
//! flow stops; [`BindingScope`] collects bindings that share a lifetime
//! (one scope per view, typically) so teardown is a single `clear`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use kudzu_core::{ConfigError, KeyPath, KeyPathError};
use kudzu_observe::{ChangeKind, KeyAccess, ObsObject, Subscription, Value};
use tracing::debug;

use crate::target::PropertyTarget;
use crate::transformer::Transformer;

/// Which way values flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Model to target only.
    OneWay,
    /// Model to target, plus target edits written back to the model.
    TwoWay,
}

/// Failures while establishing or driving a binding.
#[derive(Debug, Clone)]
pub enum BindError {
    /// Directive- or construction-time misconfiguration.
    Config(ConfigError),
    /// A write back through the source key path failed.
    KeyPath(KeyPathError),
    /// `push_from_target` was called on a one-way binding.
    NotTwoWay,
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => err.fmt(f),
            Self::KeyPath(err) => err.fmt(f),
            Self::NotTwoWay => write!(f, "binding is one-way; target edits do not flow back"),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::KeyPath(err) => Some(err),
            Self::NotTwoWay => None,
        }
    }
}

impl From<ConfigError> for BindError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<KeyPathError> for BindError {
    fn from(err: KeyPathError) -> Self {
        Self::KeyPath(err)
    }
}

/// One live model-to-target connection.
pub struct Binding {
    source: ObsObject,
    path: KeyPath,
    target: Rc<RefCell<dyn PropertyTarget>>,
    property: String,
    transformer: Transformer,
    direction: Direction,
    /// Set while a value is in flight in either direction; the opposite
    /// direction skips instead of echoing.
    syncing: Rc<Cell<bool>>,
    _sub: Subscription,
}

impl Binding {
    /// Establish a binding and perform the initial model-to-target pull.
    /// A missing source value pulls as `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotReversible`] for a two-way request over a
    ///   transformer with no reverse.
    /// - [`ConfigError::UnknownProperty`] when the target does not expose
    ///   `property`.
    /// - [`ConfigError::ObservationCycle`] if the source path loops (see
    ///   [`ObsObject::observe`]).
    pub fn bind(
        source: &ObsObject,
        path: KeyPath,
        target: Rc<RefCell<dyn PropertyTarget>>,
        property: impl Into<String>,
        transformer: Transformer,
        direction: Direction,
    ) -> Result<Self, ConfigError> {
        let property = property.into();
        if direction == Direction::TwoWay && !transformer.is_reversible() {
            return Err(ConfigError::NotReversible {
                transformer: transformer.name().to_string(),
            });
        }
        if !target.borrow().has_property(&property) {
            return Err(ConfigError::UnknownProperty { property });
        }

        let syncing = Rc::new(Cell::new(false));

        let initial = source.value_for_key_path(&path).unwrap_or(Value::Null);
        target
            .borrow_mut()
            .set_property(&property, transformer.transform(&initial));

        let sub = {
            let target = Rc::clone(&target);
            let property = property.clone();
            let transformer = transformer.clone();
            let syncing = Rc::clone(&syncing);
            source.observe(path.clone(), move |change| {
                if syncing.get() {
                    return;
                }
                // Collection records describe one element of a bound array;
                // the container handle in the property is unchanged. Only a
                // set replaces the bound value.
                if change.kind() != ChangeKind::Set {
                    return;
                }
                let value = change.new().cloned().unwrap_or(Value::Null);
                syncing.set(true);
                target
                    .borrow_mut()
                    .set_property(&property, transformer.transform(&value));
                syncing.set(false);
            })?
        };
        debug!(
            path = %path,
            property = %property,
            transformer = transformer.name(),
            two_way = direction == Direction::TwoWay,
            "binding established"
        );

        Ok(Self {
            source: source.clone(),
            path,
            target,
            property,
            transformer,
            direction,
            syncing,
            _sub: sub,
        })
    }

    /// The bound source key path.
    #[must_use]
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// The bound target property name.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The configured flow direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Write the target's current property value back into the model
    /// through the reverse transformer. The caller invokes this when the
    /// target side was edited (there is no change notification on plain
    /// property targets).
    ///
    /// # Errors
    ///
    /// - [`BindError::NotTwoWay`] on a one-way binding.
    /// - [`BindError::KeyPath`] when the write path no longer resolves.
    pub fn push_from_target(&self) -> Result<(), BindError> {
        if self.direction != Direction::TwoWay {
            return Err(BindError::NotTwoWay);
        }
        let raw = self
            .target
            .borrow()
            .get_property(&self.property)
            .unwrap_or(Value::Null);
        let value = self.transformer.reverse_transform(&raw)?;

        self.syncing.set(true);
        let result = self.source.set_value_for_key_path(&self.path, value);
        self.syncing.set(false);
        result?;
        Ok(())
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("path", &self.path.to_string())
            .field("property", &self.property)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// Owns a set of bindings with a shared lifetime.
#[derive(Debug, Default)]
pub struct BindingScope {
    bindings: Vec<Binding>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a binding; it stays live until the scope is
    /// cleared or dropped.
    pub fn hold(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Drop every held binding. All flows stop immediately.
    pub fn clear(&mut self) {
        let n = self.bindings.len();
        self.bindings.clear();
        debug!(count = n, "binding scope cleared");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Held bindings, in the order they were added.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PropertySet;

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    fn text_target() -> Rc<RefCell<PropertySet>> {
        Rc::new(RefCell::new(PropertySet::with_properties(["text"])))
    }

    #[test]
    fn initial_pull_on_bind() {
        let model = ObsObject::new();
        model.set("title", "hello");
        let target = text_target();

        let _b = Binding::bind(
            &model,
            path("title"),
            target.clone(),
            "text",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap();
        assert_eq!(
            target.borrow().get_property("text"),
            Some(Value::from("hello"))
        );
    }

    #[test]
    fn missing_source_pulls_null() {
        let model = ObsObject::new();
        let target = text_target();
        let _b = Binding::bind(
            &model,
            path("title"),
            target.clone(),
            "text",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap();
        assert_eq!(target.borrow().get_property("text"), Some(Value::Null));
    }

    #[test]
    fn model_change_flows_to_target() {
        let model = ObsObject::new();
        let target = text_target();
        let _b = Binding::bind(
            &model,
            path("title"),
            target.clone(),
            "text",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap();

        model.set("title", "updated");
        assert_eq!(
            target.borrow().get_property("text"),
            Some(Value::from("updated"))
        );
    }

    #[test]
    fn unknown_property_is_refused() {
        let model = ObsObject::new();
        let target = text_target();
        let err = Binding::bind(
            &model,
            path("title"),
            target,
            "nope",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProperty { property } if property == "nope"));
    }

    #[test]
    fn two_way_requires_reversible() {
        let model = ObsObject::new();
        let target = text_target();
        let one_way = Transformer::new("upper", |v| match v {
            Value::Str(s) => Value::Str(s.to_uppercase()),
            other => other.clone(),
        });
        let err = Binding::bind(
            &model,
            path("title"),
            target,
            "text",
            one_way,
            Direction::TwoWay,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotReversible { .. }));
    }

    #[test]
    fn push_from_target_writes_back() {
        let model = ObsObject::new();
        model.set("title", "old");
        let target = text_target();
        let binding = Binding::bind(
            &model,
            path("title"),
            target.clone(),
            "text",
            Transformer::identity(),
            Direction::TwoWay,
        )
        .unwrap();

        target
            .borrow_mut()
            .set_property("text", Value::from("edited"));
        binding.push_from_target().unwrap();
        assert_eq!(model.get("title"), Some(Value::from("edited")));
    }

    #[test]
    fn push_from_target_on_one_way_fails() {
        let model = ObsObject::new();
        let target = text_target();
        let binding = Binding::bind(
            &model,
            path("title"),
            target,
            "text",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap();
        assert!(matches!(
            binding.push_from_target(),
            Err(BindError::NotTwoWay)
        ));
    }

    #[test]
    fn write_back_does_not_echo_into_target() {
        // A target that counts assignments so the suppressed echo is
        // observable.
        struct Counting {
            inner: PropertySet,
            sets: Cell<u32>,
        }
        impl PropertyTarget for Counting {
            fn get_property(&self, property: &str) -> Option<Value> {
                self.inner.get_property(property)
            }
            fn set_property(&mut self, property: &str, value: Value) {
                self.sets.set(self.sets.get() + 1);
                self.inner.set_property(property, value);
            }
            fn has_property(&self, property: &str) -> bool {
                self.inner.has_property(property)
            }
        }

        let model = ObsObject::new();
        model.set("title", "a");
        let target = Rc::new(RefCell::new(Counting {
            inner: PropertySet::with_properties(["text"]),
            sets: Cell::new(0),
        }));
        let binding = Binding::bind(
            &model,
            path("title"),
            target.clone(),
            "text",
            Transformer::identity(),
            Direction::TwoWay,
        )
        .unwrap();
        assert_eq!(target.borrow().sets.get(), 1, "initial pull");

        target
            .borrow_mut()
            .set_property("text", Value::from("b"));
        assert_eq!(target.borrow().sets.get(), 2);

        // The model write must not bounce a third assignment back.
        binding.push_from_target().unwrap();
        assert_eq!(model.get("title"), Some(Value::from("b")));
        assert_eq!(target.borrow().sets.get(), 2, "echo suppressed");
    }

    #[test]
    fn array_mutation_keeps_the_bound_handle() {
        use kudzu_observe::ObsArray;

        let model = ObsObject::new();
        let items = ObsArray::new();
        items.push(1);
        model.set("items", items.clone());

        let target = Rc::new(RefCell::new(PropertySet::with_properties(["list"])));
        let _b = Binding::bind(
            &model,
            path("items"),
            target.clone(),
            "list",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap();
        assert_eq!(
            target.borrow().get_property("list"),
            Some(Value::Array(items.clone()))
        );

        // An insert record carries the element, not the container; the
        // property must still hold the array handle afterwards.
        items.push(2);
        let held = target.borrow().get_property("list").unwrap();
        let held = held.as_array().cloned().expect("property holds the array");
        assert!(held.ptr_eq(&items));
        assert_eq!(held.values(), vec![Value::Int(1), Value::Int(2)]);

        // Replacing the key wholesale still flows through.
        let fresh = ObsArray::new();
        model.set("items", fresh.clone());
        assert_eq!(
            target.borrow().get_property("list"),
            Some(Value::Array(fresh))
        );
    }

    #[test]
    fn drop_stops_the_flow() {
        let model = ObsObject::new();
        let target = text_target();
        let binding = Binding::bind(
            &model,
            path("title"),
            target.clone(),
            "text",
            Transformer::identity(),
            Direction::OneWay,
        )
        .unwrap();

        model.set("title", "one");
        drop(binding);
        model.set("title", "two");
        assert_eq!(
            target.borrow().get_property("text"),
            Some(Value::from("one"))
        );
    }

    #[test]
    fn scope_clear_tears_everything_down() {
        let model = ObsObject::new();
        let target = Rc::new(RefCell::new(PropertySet::with_properties([
            "text", "count",
        ])));

        let mut scope = BindingScope::new();
        scope.hold(
            Binding::bind(
                &model,
                path("title"),
                target.clone(),
                "text",
                Transformer::identity(),
                Direction::OneWay,
            )
            .unwrap(),
        );
        scope.hold(
            Binding::bind(
                &model,
                path("n"),
                target.clone(),
                "count",
                Transformer::identity(),
                Direction::OneWay,
            )
            .unwrap(),
        );
        assert_eq!(scope.len(), 2);

        model.set("title", "x");
        model.set("n", 1);
        assert_eq!(
            target.borrow().get_property("count"),
            Some(Value::Int(1))
        );

        scope.clear();
        assert!(scope.is_empty());
        model.set("n", 2);
        assert_eq!(
            target.borrow().get_property("count"),
            Some(Value::Int(1)),
            "cleared scope delivers nothing"
        );
    }
}
