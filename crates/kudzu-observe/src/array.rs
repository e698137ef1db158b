//! Observable ordered collections.
//!
//! [`ObsArray`] is a shared handle to an ordered `Vec<Value>`. Mutations
//! produce collection-kind change records — [`ChangeKind::Insert`],
//! [`ChangeKind::Remove`], [`ChangeKind::Replace`] — with explicit indices,
//! never a generic "set", so list-bound views can apply minimal deltas.
//! Bulk operations emit one record per element.
//!
//! An array does not carry its own observer registry; observation is keyed.
//! The array holds a weak link to the object that owns it and the key it is
//! stored under, and routes each record through that owner's dispatch. The
//! record then climbs forwarding chains like any other, index intact.
//!
//! # Invariants
//!
//! 1. Commit-then-notify, as for objects.
//! 2. Records carry the exact index of the mutation.
//! 3. An array has at most one owning (object, key) pair; assigning it
//!    under a new key re-parents it.
//! 4. An unowned array mutates silently (there is no path to observe it
//!    by).
//!
//! # Failure Modes
//!
//! - Out-of-range `insert` clamps to append; out-of-range `remove` /
//!   `replace` are no-ops returning `None`. No panics.
//! - An array element that is itself an array has no owning key and does
//!   not emit ancestor records (documented edge; nest an object in between
//!   to observe it).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use kudzu_core::KeyPath;

use crate::change::{Change, ChangeKind, Uid, next_uid};
use crate::object::{ObjectInner, ObsObject};
use crate::value::Value;

struct OwnerLink {
    object: Weak<RefCell<ObjectInner>>,
    key: String,
}

struct ArrayInner {
    uid: Uid,
    items: Vec<Value>,
    owner: Option<OwnerLink>,
}

/// A shared, observable ordered collection of [`Value`]s.
///
/// Cloning an `ObsArray` clones the handle; both handles mutate the same
/// storage.
#[derive(Clone)]
pub struct ObsArray {
    inner: Rc<RefCell<ArrayInner>>,
}

impl Default for ObsArray {
    fn default() -> Self {
        Self::new()
    }
}

impl ObsArray {
    /// Create an empty observable array with a fresh [`Uid`].
    #[must_use]
    pub fn new() -> Self {
        Self::from_values(Vec::new())
    }

    /// Create an observable array over the given elements.
    #[must_use]
    pub fn from_values(items: Vec<Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ArrayInner {
                uid: next_uid(),
                items,
                owner: None,
            })),
        }
    }

    /// This array's process-unique identity token.
    #[must_use]
    pub fn uid(&self) -> Uid {
        self.inner.borrow().uid
    }

    /// Whether two handles refer to the same array.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    /// Whether the array is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// The element at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.borrow().items.get(index).cloned()
    }

    /// Snapshot of all elements, in order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.inner.borrow().items.clone()
    }

    /// Append an element, emitting an insert record at the final index.
    pub fn push(&self, value: impl Into<Value>) {
        let index = self.len();
        self.insert(index, value);
    }

    /// Insert an element at `index` (clamped to the current length),
    /// emitting an insert record with that index.
    pub fn insert(&self, index: usize, value: impl Into<Value>) {
        let value = value.into();
        let index = {
            let mut inner = self.inner.borrow_mut();
            let index = index.min(inner.items.len());
            inner.items.insert(index, value.clone());
            index
        };
        self.emit(ChangeKind::Insert, index, None, Some(value));
    }

    /// Remove and return the element at `index`, emitting a remove record.
    /// Out of range is a silent `None`.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            if index >= inner.items.len() {
                return None;
            }
            inner.items.remove(index)
        };
        self.emit(ChangeKind::Remove, index, Some(removed.clone()), None);
        Some(removed)
    }

    /// Replace the element at `index` in place, returning the old element
    /// and emitting a replace record. Out of range is a silent `None`;
    /// replacing with an equal value is a no-op returning the old value.
    pub fn replace(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        let old = {
            let mut inner = self.inner.borrow_mut();
            let slot = inner.items.get_mut(index)?;
            if *slot == value {
                return Some(value);
            }
            std::mem::replace(slot, value.clone())
        };
        self.emit(ChangeKind::Replace, index, Some(old.clone()), Some(value));
        Some(old)
    }

    /// Append every element of `iter`, emitting one insert record per
    /// element (bulk operations are never coalesced into a single set).
    pub fn extend<I>(&self, iter: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for value in iter {
            self.push(value);
        }
    }

    /// Reflect the array into a JSON array, preserving order.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let items = self.values();
        serde_json::Value::Array(items.iter().map(Value::to_json).collect())
    }

    /// Claim this array for `(owner, key)`. Called when the array is
    /// stored under an object key.
    pub(crate) fn set_owner(&self, owner: &ObsObject, key: &str) {
        self.inner.borrow_mut().owner = Some(OwnerLink {
            object: owner.weak_inner(),
            key: key.to_string(),
        });
    }

    /// Detach from `(owner, key)` if that pair still owns this array. The
    /// array may have been re-parented since; a stale overwrite must not
    /// steal it from its current owner.
    pub(crate) fn clear_owner_if(&self, owner: &ObsObject, key: &str) {
        let mut inner = self.inner.borrow_mut();
        let matches = inner.owner.as_ref().is_some_and(|link| {
            link.key == key
                && link
                    .object
                    .upgrade()
                    .is_some_and(|rc| ObsObject::from_inner(rc).ptr_eq(owner))
        });
        if matches {
            inner.owner = None;
        }
    }

    /// Route a collection record through the owning object's dispatch,
    /// under the owning key.
    fn emit(&self, kind: ChangeKind, index: usize, old: Option<Value>, new: Option<Value>) {
        let link = {
            let inner = self.inner.borrow();
            inner
                .owner
                .as_ref()
                .and_then(|link| link.object.upgrade().map(|rc| (rc, link.key.clone())))
        };
        let Some((owner_inner, key)) = link else {
            return;
        };
        let Ok(path) = KeyPath::key(&key) else {
            // Foreign key stored via raw adaptation; not path-addressable.
            return;
        };
        let owner = ObsObject::from_inner(owner_inner);
        let change = Change::record(kind, path, old, new, Some(index));
        owner.deliver(&key, &change);
    }
}

impl std::fmt::Debug for ObsArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObsArray")
            .field("uid", &inner.uid)
            .field("len", &inner.items.len())
            .field("owned", &inner.owner.is_some())
            .finish()
    }
}
