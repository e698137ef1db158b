#![forbid(unsafe_code)]

//! Core vocabulary for the Kudzu observation framework.
//!
//! This crate holds the two things every other Kudzu crate speaks:
//! validated dotted [`KeyPath`]s and the shared error types. It has no
//! observation machinery of its own; see `kudzu-observe` for the observable
//! object model and `kudzu-bind` for bindings.

pub mod error;
pub mod key_path;

pub use error::{ConfigError, KeyPathError};
pub use key_path::KeyPath;
