//! Change records and identity tokens.
//!
//! A [`Change`] describes one committed mutation: its kind, the full key
//! path as seen from the notified object, old and new values, and (for
//! collection kinds) the affected index. One logical mutation produces one
//! record; as the record travels through forwarding chains and dependent-key
//! synthesis, it drags along a shared set of already-notified observer ids
//! so that no observer registration hears about the same mutation twice,
//! even in diamond-shaped observation graphs.
//!
//! # Invariants
//!
//! 1. The value is committed before any record is delivered
//!    (write-then-notify).
//! 2. [`Uid`]s and [`ObserverId`]s are never reused within a process.
//! 3. `mark()` returns `true` at most once per id per record.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use kudzu_core::KeyPath;

use crate::value::Value;

/// Process-unique identity token for an observable object or array.
///
/// Assigned once at construction/adaptation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(u64);

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of a single observer registration.
///
/// Two registrations by the same caller get distinct ids; delivery dedup is
/// per registration, so an observer watching both a derived key and one of
/// its sources hears each exactly once per mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

// Single-threaded model (see crate docs): plain thread-local counters.
thread_local! {
    static NEXT_UID: Cell<u64> = const { Cell::new(1) };
    static NEXT_OBSERVER_ID: Cell<u64> = const { Cell::new(1) };
}

pub(crate) fn next_uid() -> Uid {
    NEXT_UID.with(|c| {
        let id = c.get();
        c.set(id + 1);
        Uid(id)
    })
}

pub(crate) fn next_observer_id() -> ObserverId {
    NEXT_OBSERVER_ID.with(|c| {
        let id = c.get();
        c.set(id + 1);
        ObserverId(id)
    })
}

/// What kind of mutation a [`Change`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A key was assigned a new value (also used for synthesized
    /// dependent-key notifications).
    Set,
    /// An element was inserted into an observed collection.
    Insert,
    /// An element was removed from an observed collection.
    Remove,
    /// An element of an observed collection was replaced in place.
    Replace,
}

/// One committed mutation, as delivered to observer callbacks.
#[derive(Clone)]
pub struct Change {
    kind: ChangeKind,
    key_path: KeyPath,
    old: Option<Value>,
    new: Option<Value>,
    index: Option<usize>,
    /// Observer registrations already notified for this logical mutation.
    /// Shared across forwarded and synthesized copies of the record.
    notified: Rc<RefCell<HashSet<ObserverId>>>,
}

impl Change {
    /// Build a fresh record for one committed mutation, with an empty
    /// notified set. (Named `record` rather than `new` because `new()` is
    /// the post-mutation value accessor.)
    pub(crate) fn record(
        kind: ChangeKind,
        key_path: KeyPath,
        old: Option<Value>,
        new: Option<Value>,
        index: Option<usize>,
    ) -> Self {
        Self {
            kind,
            key_path,
            old,
            new,
            index,
            notified: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// A record sharing this record's notified set but carrying a different
    /// path and values. Used for dependent-key synthesis, where the derived
    /// key's change is part of the same logical mutation.
    pub(crate) fn synthesized(
        &self,
        key_path: KeyPath,
        old: Option<Value>,
        new: Option<Value>,
    ) -> Self {
        Self {
            kind: ChangeKind::Set,
            key_path,
            old,
            new,
            index: None,
            notified: Rc::clone(&self.notified),
        }
    }

    /// A copy of this record with the path reconstructed one level up.
    /// Kind, values, and index are preserved so collection records keep
    /// their indices as they climb.
    pub(crate) fn climbed(&self, key: &str) -> Self {
        Self {
            kind: self.kind,
            key_path: self.key_path.prefixed(key),
            old: self.old.clone(),
            new: self.new.clone(),
            index: self.index,
            notified: Rc::clone(&self.notified),
        }
    }

    /// Like [`climbed`](Self::climbed) but replacing old/new, for the case
    /// where an intermediate object was swapped and the leaf values must be
    /// re-resolved against the old and new subtrees.
    pub(crate) fn resolved(
        &self,
        key_path: KeyPath,
        old: Option<Value>,
        new: Option<Value>,
    ) -> Self {
        Self {
            kind: ChangeKind::Set,
            key_path,
            old,
            new,
            index: None,
            notified: Rc::clone(&self.notified),
        }
    }

    /// Record `id` as notified. Returns `true` if it had not been notified
    /// for this logical mutation yet (i.e. the callback should run).
    pub(crate) fn mark(&self, id: ObserverId) -> bool {
        self.notified.borrow_mut().insert(id)
    }

    /// The kind of mutation.
    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    /// Full key path of the mutation, relative to the object the observer
    /// registered on.
    #[must_use]
    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    /// Value before the mutation. `None` for inserts and for keys that did
    /// not previously exist.
    #[must_use]
    pub fn old(&self) -> Option<&Value> {
        self.old.as_ref()
    }

    /// Value after the mutation. `None` for removals.
    #[must_use]
    pub fn new(&self) -> Option<&Value> {
        self.new.as_ref()
    }

    /// Collection index for insert/remove/replace records.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl std::fmt::Debug for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Change")
            .field("kind", &self.kind)
            .field("key_path", &self.key_path.to_string())
            .field("old", &self.old)
            .field("new", &self.new)
            .field("index", &self.index)
            .finish()
    }
}
