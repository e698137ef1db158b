//! Error vocabulary shared across the Kudzu crates.
//!
//! Two families, deliberately kept apart:
//!
//! - [`KeyPathError`]: runtime failures while traversing or writing a key
//!   path. Reads through a missing intermediate are **not** errors (they
//!   yield `None` at the call site); only writes fail loudly.
//! - [`ConfigError`]: definition- and resolve-time failures (dependency
//!   cycles, unknown transformer names, unresolvable binding targets).
//!   These signal a misconfigured class or directive, never a bad value.
//!
//! No variant is retried anywhere; every failure is either silent-by-design
//! (read miss) or immediately fatal to the operation that raised it.

/// Runtime key-path traversal and write failures.
#[derive(Debug, Clone)]
pub enum KeyPathError {
    /// A key path was constructed from an empty string.
    EmptyPath,
    /// A key path contained an empty segment (`"a..b"`, `".a"`, `"a."`).
    EmptySegment {
        /// The offending path as written.
        path: String,
    },
    /// A write traversed an intermediate segment that is absent.
    UnresolvableWrite {
        /// The full path of the attempted write.
        path: String,
        /// The first segment that failed to resolve.
        segment: String,
    },
    /// A write traversed an intermediate segment whose value is not an
    /// object (a scalar or an array cannot be descended into by key).
    NotAContainer {
        /// The full path of the attempted write.
        path: String,
        /// The segment whose value is not a container.
        segment: String,
    },
}

impl std::fmt::Display for KeyPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "empty key path"),
            Self::EmptySegment { path } => {
                write!(f, "empty segment in key path '{path}'")
            }
            Self::UnresolvableWrite { path, segment } => {
                write!(
                    f,
                    "cannot write through '{path}': intermediate '{segment}' is missing"
                )
            }
            Self::NotAContainer { path, segment } => {
                write!(
                    f,
                    "cannot write through '{path}': '{segment}' is not an object"
                )
            }
        }
    }
}

impl std::error::Error for KeyPathError {}

/// Definition- and resolve-time configuration failures.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A derived key depends, directly or transitively, on itself.
    DependencyCycle {
        /// The derived key at which the cycle was detected.
        key: String,
        /// The dependency chain that closes the cycle.
        chain: Vec<String>,
    },
    /// The same derived key was declared twice in one schema.
    DuplicateDerivedKey {
        /// The duplicated key name.
        key: String,
    },
    /// Registering an observer would make an object observe itself through
    /// its own descendants (path-prefix cycle).
    ObservationCycle {
        /// The key path whose registration was rejected.
        path: String,
    },
    /// A binding directive named a transformer that is not registered.
    UnknownTransformer {
        /// The unresolved transformer name.
        name: String,
    },
    /// A binding target does not expose the named property.
    UnknownProperty {
        /// The unresolved property name.
        property: String,
    },
    /// A two-way binding was requested over a transformer with no reverse
    /// function.
    NotReversible {
        /// The transformer's registered name.
        transformer: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DependencyCycle { key, chain } => {
                write!(
                    f,
                    "derived key '{key}' depends on itself: {}",
                    chain.join(" -> ")
                )
            }
            Self::DuplicateDerivedKey { key } => {
                write!(f, "derived key '{key}' declared more than once")
            }
            Self::ObservationCycle { path } => {
                write!(f, "observing '{path}' would create an observation cycle")
            }
            Self::UnknownTransformer { name } => {
                write!(f, "unknown transformer '{name}'")
            }
            Self::UnknownProperty { property } => {
                write!(f, "binding target has no property '{property}'")
            }
            Self::NotReversible { transformer } => {
                write!(
                    f,
                    "transformer '{transformer}' has no reverse; two-way binding refused"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
