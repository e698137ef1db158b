//! Observable keyed objects: storage, observer registry, and dispatch.
//!
//! [`ObsObject`] is a shared handle (`Rc<RefCell<..>>`) to a keyed value
//! store with an attached observer registry. Cloning the handle shares the
//! same object. Observers register for a [`KeyPath`]; entries are stored
//! under the path's first segment, and multi-segment paths install a
//! forwarding subscription on the current first-segment value so nested
//! changes climb back up with the full path reconstructed.
//!
//! # Dispatch
//!
//! Dispatch is synchronous and recursive on the mutating call stack:
//!
//! 1. The new value is committed (write-then-notify; callbacks always see
//!    the committed state).
//! 2. Entries registered directly on the key are invoked in registration
//!    order.
//! 3. Entries observing *through* the key rewire their forwarding
//!    subscription onto the new value and are notified for the full path,
//!    with old/new resolved against the old and new subtrees.
//! 4. Dependent keys affected by the mutation get synthesized records
//!    (see [`crate::schema`]).
//!
//! A change record carries a shared set of already-notified registrations,
//! so no registration hears one logical mutation twice, even through
//! diamond-shaped graphs.
//!
//! # Invariants
//!
//! 1. Write-then-notify: a callback reading the object observes the new
//!    value already committed.
//! 2. Equal-value writes (scalars by value, handles by identity) are
//!    no-ops: nothing is delivered.
//! 3. Entries are notified in registration order per key.
//! 4. Dead entries (dropped [`Subscription`] guards) are pruned lazily on
//!    the next dispatch touching their key.
//! 5. No `RefCell` borrow is held while a callback runs; callbacks may
//!    freely mutate the object (each such mutation is a new record).
//!
//! # Failure Modes
//!
//! - Registering a path that loops through its own observation chain fails
//!   with [`ConfigError::ObservationCycle`].
//! - If a later replacement would recreate such a loop, the forwarding hop
//!   is skipped with a `warn!`; delivery for the replaced segment itself
//!   still happens.
//! - Undisciplined retention of `Subscription` guards leaks entries; that
//!   is the caller's lifecycle to manage.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

use kudzu_core::{ConfigError, KeyPath, KeyPathError};
use tracing::{debug, warn};

use crate::change::{Change, ChangeKind, ObserverId, Uid, next_observer_id, next_uid};
use crate::schema::Schema;
use crate::value::Value;

/// Observer callback signature. Callbacks receive the committed change with
/// the full key path relative to the object they registered on.
pub type Callback = dyn Fn(&Change);

struct ObserverEntry {
    id: ObserverId,
    /// Full path relative to the owning object.
    path: KeyPath,
    /// The registry never owns the observer; the strong side lives in the
    /// [`Subscription`] guard.
    callback: Weak<Callback>,
    /// Subscription on the current first-segment value, for multi-segment
    /// paths. Rewired when that value is replaced.
    forward: Option<Subscription>,
}

pub(crate) struct ObjectInner {
    uid: Uid,
    values: BTreeMap<String, Value>,
    observers: HashMap<String, Vec<ObserverEntry>>,
    schema: Option<Rc<Schema>>,
}

/// A shared, observable keyed object.
///
/// Cloning an `ObsObject` clones the handle, not the object: both handles
/// see the same keys and share the same observers.
#[derive(Clone)]
pub struct ObsObject {
    inner: Rc<RefCell<ObjectInner>>,
}

/// RAII guard for one observer registration.
///
/// The registry holds the callback weakly; dropping the guard drops the
/// only strong reference, after which the entry (and any forwarding
/// subscriptions hanging off it) is pruned on the next dispatch that
/// touches its key.
pub struct Subscription {
    _strong: Rc<Callback>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

impl Default for ObsObject {
    fn default() -> Self {
        Self::new()
    }
}

impl ObsObject {
    /// Create an empty observable object with a fresh [`Uid`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                uid: next_uid(),
                values: BTreeMap::new(),
                observers: HashMap::new(),
                schema: None,
            })),
        }
    }

    /// Create an empty object carrying a dependent-key schema.
    #[must_use]
    pub fn with_schema(schema: Rc<Schema>) -> Self {
        let obj = Self::new();
        obj.inner.borrow_mut().schema = Some(schema);
        obj
    }

    /// This object's process-unique identity token.
    #[must_use]
    pub fn uid(&self) -> Uid {
        self.inner.borrow().uid
    }

    /// Whether two handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The attached dependent-key schema, if any.
    #[must_use]
    pub fn schema(&self) -> Option<Rc<Schema>> {
        self.inner.borrow().schema.clone()
    }

    /// Stored key names, in sorted order. Derived keys are not stored.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().values.keys().cloned().collect()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().values.len()
    }

    /// Whether no keys are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().values.is_empty()
    }

    /// Current value for `key`: the stored value, or the derived key's
    /// getter result when the schema declares one and nothing is stored.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let (stored, getter) = {
            let inner = self.inner.borrow();
            let stored = inner.values.get(key).cloned();
            let getter = if stored.is_none() {
                inner
                    .schema
                    .as_ref()
                    .and_then(|schema| schema.getter(key).cloned())
            } else {
                None
            };
            (stored, getter)
        };
        match (stored, getter) {
            (Some(value), _) => Some(value),
            // Getter runs with no borrow held; it reads back through `get`.
            (None, Some(getter)) => Some((*getter)(self)),
            (None, None) => None,
        }
    }

    /// Set `key` to `value`, committing first and then notifying observers
    /// on the key, observers through the key, and affected dependent keys.
    ///
    /// Setting a key to an equal value is a no-op. `key` must be a single
    /// non-empty segment; an invalid key is ignored with a `warn!` (use
    /// [`set_checked`](Self::set_checked) to surface the error).
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if let Err(err) = self.set_checked(&key, value.into()) {
            warn!(key, %err, "ignoring invalid set");
        }
    }

    /// Like [`set`](Self::set), returning the validation error for an
    /// empty or dotted key instead of logging it.
    pub fn set_checked(&self, key: &str, value: Value) -> Result<(), KeyPathError> {
        // Validates the key shape; also the path carried by the record.
        let path = KeyPath::key(key)?;

        let (old, schema) = {
            let inner = self.inner.borrow();
            (inner.values.get(key).cloned(), inner.schema.clone())
        };
        if old.as_ref() == Some(&value) {
            return Ok(());
        }

        // Old derived values are captured by re-invoking getters before the
        // commit; new values are re-invoked after.
        let affected: Vec<String> = schema
            .as_ref()
            .map(|s| s.affected(key))
            .unwrap_or_default();
        let mut derived_old: Vec<(String, Option<Value>)> = Vec::with_capacity(affected.len());
        for name in &affected {
            derived_old.push((name.clone(), self.get(name)));
        }

        // Arrays notify through their owning key; re-parent on assignment.
        if let Some(Value::Array(arr)) = &old {
            arr.clear_owner_if(self, key);
        }
        if let Value::Array(arr) = &value {
            arr.set_owner(self, key);
        }

        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.clone());

        let change = Change::record(ChangeKind::Set, path, old, Some(value), None);
        self.deliver(key, &change);

        for (name, old_value) in derived_old {
            let new_value = self.get(&name);
            if new_value == old_value {
                continue;
            }
            let Ok(derived_path) = KeyPath::key(&name) else {
                continue;
            };
            let derived_change = change.synthesized(derived_path, old_value, new_value);
            self.deliver(&name, &derived_change);
        }
        Ok(())
    }

    /// Register an observer for `path`.
    ///
    /// Single-segment paths watch the key directly. Multi-segment paths
    /// additionally install a forwarding subscription on the current
    /// first-segment value, so nested changes are delivered with the full
    /// path; when the first-segment value is replaced, the forwarding
    /// subscription moves to the new value.
    ///
    /// Deregistration is RAII: drop the returned [`Subscription`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::ObservationCycle`] when the path's observation chain
    /// would revisit an object already on it (an object observing itself
    /// through its own descendants).
    pub fn observe(
        &self,
        path: KeyPath,
        callback: impl Fn(&Change) + 'static,
    ) -> Result<Subscription, ConfigError> {
        self.check_observation_chain(&path)?;
        debug!(path = %path, object = %self.uid(), "observer registered");
        self.observe_raw(path, callback)
    }

    /// Number of registrations currently stored under `key`, including
    /// dead ones not yet pruned.
    #[must_use]
    pub fn observer_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .observers
            .get(key)
            .map_or(0, Vec::len)
    }

    /// Reflect the object into a plain JSON value.
    ///
    /// Every stored key is reflected; derived keys from the schema are
    /// computed and included unless shadowed by a stored key. Arrays keep
    /// their order. Cyclic object graphs are not supported here (the
    /// reflection recurses).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let (entries, derived_names) = {
            let inner = self.inner.borrow();
            let entries: Vec<(String, Value)> = inner
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            let derived_names: Vec<String> = inner
                .schema
                .as_ref()
                .map(|schema| {
                    schema
                        .derived_keys()
                        .filter(|name| !inner.values.contains_key(*name))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            (entries, derived_names)
        };
        let mut map = serde_json::Map::new();
        for (key, value) in entries {
            map.insert(key, value.to_json());
        }
        for name in derived_names {
            if let Some(value) = self.get(&name) {
                map.insert(name, value.to_json());
            }
        }
        serde_json::Value::Object(map)
    }

    /// Store without validation or dispatch. Only for tree adaptation,
    /// where no observers can exist yet and foreign keys (e.g. dotted JSON
    /// keys) must round-trip byte-for-byte.
    pub(crate) fn insert_raw(&self, key: String, value: Value) {
        if let Value::Array(arr) = &value {
            arr.set_owner(self, &key);
        }
        self.inner.borrow_mut().values.insert(key, value);
    }

    pub(crate) fn weak_inner(&self) -> Weak<RefCell<ObjectInner>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<ObjectInner>>) -> Self {
        Self { inner }
    }

    /// Walk the non-terminal segments of `path` from this object, rejecting
    /// any chain that revisits an object already on it.
    fn check_observation_chain(&self, path: &KeyPath) -> Result<(), ConfigError> {
        let mut seen = vec![self.uid()];
        let mut current = self.clone();
        let segments: Vec<&str> = path.segments().collect();
        for segment in &segments[..segments.len() - 1] {
            let Some(Value::Object(child)) = current.get(segment) else {
                // Chain ends at a missing or non-object value; nothing left
                // to loop through.
                return Ok(());
            };
            if seen.contains(&child.uid()) {
                return Err(ConfigError::ObservationCycle {
                    path: path.to_string(),
                });
            }
            seen.push(child.uid());
            current = child;
        }
        Ok(())
    }

    /// Register without the chain check (the caller has already walked it).
    fn observe_raw(
        &self,
        path: KeyPath,
        callback: impl Fn(&Change) + 'static,
    ) -> Result<Subscription, ConfigError> {
        let strong: Rc<Callback> = Rc::new(callback);
        let id = next_observer_id();
        let first = path.first().to_string();

        let forward = match path.rest() {
            Some(rest) => match self.get(&first) {
                Some(Value::Object(child)) => {
                    Some(self.forward_into(&child, &rest, id, &first, &strong)?)
                }
                _ => None,
            },
            None => None,
        };

        let entry = ObserverEntry {
            id,
            path,
            callback: Rc::downgrade(&strong),
            forward,
        };
        self.inner
            .borrow_mut()
            .observers
            .entry(first)
            .or_default()
            .push(entry);
        Ok(Subscription { _strong: strong })
    }

    /// Install a forwarding subscription on `child` for the rest of the
    /// path. The forwarding closure holds the outer callback weakly (so a
    /// dropped guard upstream kills the whole chain) and reconstructs the
    /// full path by prefixing `first_key` as the change climbs.
    fn forward_into(
        &self,
        child: &ObsObject,
        rest: &KeyPath,
        outer_id: ObserverId,
        first_key: &str,
        outer_cb: &Rc<Callback>,
    ) -> Result<Subscription, ConfigError> {
        if child.uid() == self.uid() {
            return Err(ConfigError::ObservationCycle {
                path: rest.prefixed(first_key).to_string(),
            });
        }
        child.check_observation_chain(rest)?;

        let weak = Rc::downgrade(outer_cb);
        let key = first_key.to_string();
        child.observe_raw(rest.clone(), move |change: &Change| {
            let Some(cb) = weak.upgrade() else { return };
            if change.mark(outer_id) {
                let climbed = change.climbed(&key);
                cb(&climbed);
            }
        })
    }

    /// Deliver `change` to every live registration under `key`:
    /// direct observers first, then path observers (rewire + resolve).
    pub(crate) fn deliver(&self, key: &str, change: &Change) {
        struct Snap {
            id: ObserverId,
            path: KeyPath,
            cb: Rc<Callback>,
        }

        // Prune and snapshot under the borrow; run callbacks outside it.
        let snaps: Vec<Snap> = {
            let mut inner = self.inner.borrow_mut();
            let Some(entries) = inner.observers.get_mut(key) else {
                return;
            };
            entries.retain(|entry| entry.callback.strong_count() > 0);
            let snaps = entries
                .iter()
                .filter_map(|entry| {
                    entry.callback.upgrade().map(|cb| Snap {
                        id: entry.id,
                        path: entry.path.clone(),
                        cb,
                    })
                })
                .collect();
            if entries.is_empty() {
                inner.observers.remove(key);
            }
            snaps
        };

        for snap in &snaps {
            if snap.path.is_single() && change.mark(snap.id) {
                (snap.cb)(change);
            }
        }

        // Path observers only react to replacement of the segment itself;
        // nested leaf changes reach them through their forwarding
        // subscription instead. Collection records never rewire (the
        // container identity is unchanged).
        if change.kind() != ChangeKind::Set {
            return;
        }
        for snap in &snaps {
            let Some(rest) = snap.path.rest() else {
                continue;
            };
            let forward = match change.new() {
                Some(Value::Object(new_child)) => {
                    match self.forward_into(new_child, &rest, snap.id, key, &snap.cb) {
                        Ok(sub) => Some(sub),
                        Err(err) => {
                            warn!(path = %snap.path, %err, "skipping forwarding resubscription");
                            None
                        }
                    }
                }
                _ => None,
            };
            {
                let mut inner = self.inner.borrow_mut();
                if let Some(entries) = inner.observers.get_mut(key) {
                    if let Some(entry) = entries.iter_mut().find(|entry| entry.id == snap.id) {
                        entry.forward = forward;
                    }
                }
            }

            let old_leaf = change.old().and_then(|v| resolve_value_path(v, &rest));
            let new_leaf = change.new().and_then(|v| resolve_value_path(v, &rest));
            if old_leaf != new_leaf && change.mark(snap.id) {
                let resolved = change.resolved(snap.path.clone(), old_leaf, new_leaf);
                (snap.cb)(&resolved);
            }
        }
    }
}

impl std::fmt::Debug for ObsObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObsObject")
            .field("uid", &inner.uid)
            .field("keys", &inner.values.len())
            .field("observed_keys", &inner.observers.len())
            .finish()
    }
}

/// Resolve `path` against a value by descending object keys. Any missing
/// or non-object intermediate short-circuits to `None`.
#[must_use]
pub fn resolve_value_path(value: &Value, path: &KeyPath) -> Option<Value> {
    let mut current = value.clone();
    let mut remaining: Vec<&str> = path.segments().collect();
    let last = remaining.pop()?;
    for segment in remaining {
        let Value::Object(obj) = current else {
            return None;
        };
        current = obj.get(segment)?;
    }
    match current {
        Value::Object(obj) => obj.get(last),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    #[test]
    fn get_set_basic() {
        let obj = ObsObject::new();
        assert!(obj.get("name").is_none());
        obj.set("name", "zelda");
        assert_eq!(obj.get("name"), Some(Value::from("zelda")));
        assert_eq!(obj.keys(), vec!["name".to_string()]);
    }

    #[test]
    fn clone_shares_state() {
        let a = ObsObject::new();
        let b = a.clone();
        a.set("n", 1);
        assert_eq!(b.get("n"), Some(Value::Int(1)));
        assert!(a.ptr_eq(&b));
        assert_eq!(a.uid(), b.uid());
    }

    #[test]
    fn uid_unique_per_object() {
        assert_ne!(ObsObject::new().uid(), ObsObject::new().uid());
    }

    #[test]
    fn set_notifies_direct_observer() {
        let obj = ObsObject::new();
        let count = Rc::new(Cell::new(0u32));
        let seen = Rc::new(RefCell::new(None));

        let c = Rc::clone(&count);
        let s = Rc::clone(&seen);
        let _sub = obj
            .observe(path("name"), move |change| {
                c.set(c.get() + 1);
                *s.borrow_mut() = change.new().cloned();
            })
            .unwrap();

        obj.set("name", "link");
        assert_eq!(count.get(), 1);
        assert_eq!(*seen.borrow(), Some(Value::from("link")));
    }

    #[test]
    fn observer_sees_committed_value() {
        let obj = ObsObject::new();
        let probe = obj.clone();
        let seen = Rc::new(RefCell::new(None));
        let s = Rc::clone(&seen);
        let _sub = obj
            .observe(path("n"), move |_| {
                // Write-then-notify: the registry must already hold the
                // new value when the callback runs.
                *s.borrow_mut() = probe.get("n");
            })
            .unwrap();
        obj.set("n", 7);
        assert_eq!(*seen.borrow(), Some(Value::Int(7)));
    }

    #[test]
    fn equal_value_set_is_noop() {
        let obj = ObsObject::new();
        obj.set("n", 3);
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let _sub = obj.observe(path("n"), move |_| c.set(c.get() + 1)).unwrap();
        obj.set("n", 3);
        assert_eq!(count.get(), 0);
        obj.set("n", 4);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscription_drop_deregisters() {
        let obj = ObsObject::new();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let sub = obj.observe(path("n"), move |_| c.set(c.get() + 1)).unwrap();

        obj.set("n", 1);
        assert_eq!(count.get(), 1);

        drop(sub);
        obj.set("n", 2);
        assert_eq!(count.get(), 1);
        // Dead entry pruned during that dispatch.
        assert_eq!(obj.observer_count("n"), 0);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obj = ObsObject::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let _a = obj.observe(path("k"), move |_| l1.borrow_mut().push('A')).unwrap();
        let l2 = Rc::clone(&log);
        let _b = obj.observe(path("k"), move |_| l2.borrow_mut().push('B')).unwrap();

        obj.set("k", 1);
        assert_eq!(*log.borrow(), vec!['A', 'B']);
    }

    #[test]
    fn nested_path_delivery_with_full_path() {
        let tree = ObsObject::new();
        let branch = ObsObject::new();
        tree.set("branch", branch.clone());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = tree
            .observe(path("branch.leaf"), move |change| {
                s.borrow_mut()
                    .push((change.key_path().to_string(), change.new().cloned()));
            })
            .unwrap();

        branch.set("leaf", 42);
        assert_eq!(
            *seen.borrow(),
            vec![("branch.leaf".to_string(), Some(Value::Int(42)))]
        );
    }

    #[test]
    fn nested_delivery_is_exactly_once() {
        let tree = ObsObject::new();
        let branch = ObsObject::new();
        tree.set("branch", branch.clone());

        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let _sub = tree
            .observe(path("branch.leaf"), move |_| c.set(c.get() + 1))
            .unwrap();

        branch.set("leaf", 1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn resubscription_on_replacement() {
        let tree = ObsObject::new();
        let old_branch = ObsObject::new();
        old_branch.set("leaf", 1);
        tree.set("branch", old_branch.clone());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = tree
            .observe(path("branch.leaf"), move |change| {
                s.borrow_mut().push(change.new().cloned());
            })
            .unwrap();

        // Replacing the intermediate notifies with the resolved leaf values.
        let new_branch = ObsObject::new();
        new_branch.set("leaf", 2);
        tree.set("branch", new_branch.clone());
        assert_eq!(*seen.borrow(), vec![Some(Value::Int(2))]);

        // The old branch is disconnected; the new one is live.
        old_branch.set("leaf", 99);
        assert_eq!(seen.borrow().len(), 1);

        new_branch.set("leaf", 3);
        assert_eq!(*seen.borrow(), vec![Some(Value::Int(2)), Some(Value::Int(3))]);
    }

    #[test]
    fn replacement_with_equal_leaf_is_silent() {
        let tree = ObsObject::new();
        let a = ObsObject::new();
        a.set("leaf", 5);
        tree.set("branch", a);

        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        let _sub = tree
            .observe(path("branch.leaf"), move |_| c.set(c.get() + 1))
            .unwrap();

        let b = ObsObject::new();
        b.set("leaf", 5);
        tree.set("branch", b.clone());
        assert_eq!(count.get(), 0, "leaf value unchanged across replacement");

        b.set("leaf", 6);
        assert_eq!(count.get(), 1, "rewired to the new branch");
    }

    #[test]
    fn missing_intermediate_then_assigned() {
        let tree = ObsObject::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        // Register while `branch` does not exist yet.
        let _sub = tree
            .observe(path("branch.leaf"), move |change| {
                s.borrow_mut().push(change.new().cloned());
            })
            .unwrap();

        let branch = ObsObject::new();
        branch.set("leaf", 10);
        tree.set("branch", branch.clone());
        assert_eq!(*seen.borrow(), vec![Some(Value::Int(10))]);

        branch.set("leaf", 11);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn observation_cycle_rejected_at_registration() {
        let root = ObsObject::new();
        let child = ObsObject::new();
        root.set("child", child.clone());
        child.set("back", root.clone());

        let err = root
            .observe(path("child.back.child.leaf"), |_| {})
            .unwrap_err();
        assert!(matches!(err, ConfigError::ObservationCycle { .. }));

        // A chain that terminates before looping is fine.
        assert!(root.observe(path("child.back"), |_| {}).is_ok());
    }

    #[test]
    fn recursive_mutation_from_callback_terminates() {
        let obj = ObsObject::new();
        let handle = obj.clone();
        let _sub = obj
            .observe(path("n"), move |change| {
                if let Some(Value::Int(n)) = change.new() {
                    if *n < 3 {
                        handle.set("n", n + 1);
                    }
                }
            })
            .unwrap();
        obj.set("n", 0);
        assert_eq!(obj.get("n"), Some(Value::Int(3)));
    }

    #[test]
    fn set_rejects_bad_keys() {
        let obj = ObsObject::new();
        assert!(obj.set_checked("", Value::Int(1)).is_err());
        assert!(obj.set_checked("a.b", Value::Int(1)).is_err());
        // The lenient form warns and drops.
        obj.set("", 1);
        assert!(obj.is_empty());
    }

    #[test]
    fn resolve_value_path_walks_objects() {
        let root = ObsObject::new();
        let mid = ObsObject::new();
        mid.set("leaf", 9);
        root.set("mid", mid);
        let v = Value::Object(root);
        assert_eq!(
            resolve_value_path(&v, &path("mid.leaf")),
            Some(Value::Int(9))
        );
        assert!(resolve_value_path(&v, &path("mid.nope")).is_none());
        assert!(resolve_value_path(&v, &path("nope.leaf")).is_none());
    }

    #[test]
    fn debug_format() {
        let obj = ObsObject::new();
        obj.set("k", 1);
        let dbg = format!("{obj:?}");
        assert!(dbg.contains("ObsObject"));
        assert!(dbg.contains("uid"));
    }
}
