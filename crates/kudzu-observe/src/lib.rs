#![forbid(unsafe_code)]

//! Key-value observing for Kudzu: observable object trees, keyed change
//! notification, and dependent keys.
//!
//! # Architecture
//!
//! Everything is single-threaded shared state: [`ObsObject`] and
//! [`ObsArray`] are `Rc<RefCell<..>>` handles; cloning a handle shares the
//! value and its observers. Observer callbacks are held weakly by the
//! registry and strongly by the RAII [`Subscription`] guard; dead entries
//! are pruned lazily during dispatch.
//!
//! - [`Value`]: the dynamic value model (scalars by value, handles by
//!   identity).
//! - [`ObsObject`] / [`ObsArray`]: observable containers with keyed
//!   dispatch and collection-kind change records.
//! - [`Change`]: one committed mutation, with the full key path and a
//!   shared already-notified set for diamond-safe delivery.
//! - [`KeyAccess`]: the explicit accessor protocol with key-path traversal.
//! - [`Schema`]: per-class dependent-key declarations, cycle-checked at
//!   build time.
//! - [`adapter`]: the JSON boundary (plain trees in, observable trees out,
//!   and reflection back).
//!
//! # Concurrency
//!
//! None. Dispatch runs synchronously and recursively on the mutating call
//! stack, with write-then-notify ordering; observers invoked mid-dispatch
//! always see the committed value. Recursive mutation from a callback is
//! allowed — each mutation is its own change record — and per-record dedup
//! bounds delivery to once per registration; bounding chains of distinct
//! records is the caller's responsibility.

pub mod access;
pub mod adapter;
pub mod array;
pub mod change;
pub mod object;
pub mod schema;
pub mod value;

pub use access::KeyAccess;
pub use adapter::{adapt, adapt_object, adapted};
pub use array::ObsArray;
pub use change::{Change, ChangeKind, ObserverId, Uid};
pub use object::{ObsObject, Subscription, resolve_value_path};
pub use schema::{DerivedFn, Schema, SchemaBuilder};
pub use value::Value;
