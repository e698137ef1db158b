#![forbid(unsafe_code)]

//! Declarative bindings for Kudzu: model key paths wired to target
//! properties, with optional value transformation.
//!
//! Built on `kudzu-observe`: a [`Binding`] is one observer registration
//! plus an initial pull, pushing committed model values through a
//! [`Transformer`] into a [`PropertyTarget`] property. Two-way bindings
//! write target edits back through the key path with the reverse
//! transformation, with a re-entrancy flag suppressing the echo in either
//! direction.
//!
//! [`BindingDirective`] is the serialized form: interface definitions
//! describe bindings as data and resolve them at load time against a
//! source object, a target, and a [`TransformerRegistry`]. Every
//! unresolvable name (path, property, transformer) fails at resolve time
//! with a `kudzu_core::ConfigError`; nothing binds silently to nothing.

pub mod binding;
pub mod directive;
pub mod target;
pub mod transformer;

pub use binding::{BindError, Binding, BindingScope, Direction};
pub use directive::BindingDirective;
pub use target::{PropertySet, PropertyTarget};
pub use transformer::{IDENTITY, Transformer, TransformerRegistry};
