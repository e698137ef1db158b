//! Dependent-key declarations: derived keys, their sources, and getters.
//!
//! A class of objects declares, once, that derived key `K` is computed from
//! source keys `{A, B, ...}` by a getter. The resulting [`Schema`] is
//! immutable and shared (`Rc`) across every instance of the class. When a
//! source key changes, the runtime re-invokes the getter before and after
//! the commit and synthesizes a change record for the derived key (see
//! `ObsObject::set_checked`).
//!
//! # Invariants
//!
//! 1. The dependency graph is acyclic. A derived key that depends on
//!    itself, directly or transitively, is rejected at
//!    [`SchemaBuilder::build`] — a configuration error, never a
//!    notification-time surprise.
//! 2. Derived keys may depend on other derived keys; notification for a
//!    source fans out to every derived key whose transitive sources
//!    include it, in dependency order, each exactly once per record.
//! 3. A schema is read-only after `build()`.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use kudzu_core::ConfigError;

use crate::object::ObsObject;
use crate::value::Value;

/// Getter for a derived key. Invoked with the object handle; typically
/// reads the source keys back through `get`.
pub type DerivedFn = Rc<dyn Fn(&ObsObject) -> Value>;

struct DerivedKey {
    sources: BTreeSet<String>,
    getter: DerivedFn,
}

/// Immutable per-class dependent-key map.
pub struct Schema {
    derived: BTreeMap<String, DerivedKey>,
    /// Transitive source closure per derived key, precomputed at build.
    closures: BTreeMap<String, BTreeSet<String>>,
    /// Derived keys in dependency order (sources before dependents).
    order: Vec<String>,
}

impl Schema {
    /// Start declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            declarations: Vec::new(),
        }
    }

    /// The getter for `key`, if it is a derived key.
    #[must_use]
    pub fn getter(&self, key: &str) -> Option<&DerivedFn> {
        self.derived.get(key).map(|d| &d.getter)
    }

    /// The directly declared sources of a derived key.
    #[must_use]
    pub fn sources(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.derived.get(key).map(|d| &d.sources)
    }

    /// Derived key names, in dependency order.
    pub fn derived_keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Derived keys whose value can change when `key` changes, in
    /// dependency order. `key` may itself be a derived key (fan-out
    /// through derived-on-derived chains).
    #[must_use]
    pub fn affected(&self, key: &str) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| {
                self.closures
                    .get(*name)
                    .is_some_and(|closure| closure.contains(key))
            })
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("derived", &self.order)
            .finish()
    }
}

/// Accumulates derived-key declarations; validation happens in
/// [`build`](Self::build).
pub struct SchemaBuilder {
    declarations: Vec<(String, BTreeSet<String>, DerivedFn)>,
}

impl SchemaBuilder {
    /// Declare derived key `name`, computed by `getter` from `sources`.
    #[must_use]
    pub fn derived<S, I>(
        mut self,
        name: impl Into<String>,
        sources: I,
        getter: impl Fn(&ObsObject) -> Value + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources = sources.into_iter().map(Into::into).collect();
        self.declarations
            .push((name.into(), sources, Rc::new(getter)));
        self
    }

    /// Validate and freeze the schema.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DuplicateDerivedKey`] when a name is declared twice
    ///   (or is empty/dotted — a derived key must be a plain key).
    /// - [`ConfigError::DependencyCycle`] when any derived key depends on
    ///   itself directly or transitively. The error carries the chain that
    ///   closes the cycle.
    pub fn build(self) -> Result<Rc<Schema>, ConfigError> {
        let mut derived: BTreeMap<String, DerivedKey> = BTreeMap::new();
        for (name, sources, getter) in self.declarations {
            if name.is_empty() || name.contains('.') || derived.contains_key(&name) {
                return Err(ConfigError::DuplicateDerivedKey { key: name });
            }
            derived.insert(name, DerivedKey { sources, getter });
        }

        // Depth-first walk over derived-to-derived edges; a node seen again
        // while still on the stack closes a cycle.
        let mut order = Vec::with_capacity(derived.len());
        let mut state: BTreeMap<String, u8> = BTreeMap::new(); // 1 = on stack, 2 = done
        let names: Vec<String> = derived.keys().cloned().collect();
        for name in &names {
            visit(name, &derived, &mut state, &mut order, &mut Vec::new())?;
        }

        // Transitive source closures, built in dependency order so closures
        // of derived sources are already complete.
        let mut closures: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for name in &order {
            let mut closure = BTreeSet::new();
            if let Some(decl) = derived.get(name) {
                for source in &decl.sources {
                    closure.insert(source.clone());
                    if let Some(inner) = closures.get(source) {
                        closure.extend(inner.iter().cloned());
                    }
                }
            }
            closures.insert(name.clone(), closure);
        }

        return Ok(Rc::new(Schema {
            derived,
            closures,
            order,
        }));

        fn visit(
            name: &str,
            derived: &BTreeMap<String, DerivedKey>,
            state: &mut BTreeMap<String, u8>,
            order: &mut Vec<String>,
            stack: &mut Vec<String>,
        ) -> Result<(), ConfigError> {
            // Non-derived sources are plain stored keys; nothing to walk.
            let Some(decl) = derived.get(name) else {
                return Ok(());
            };
            match state.get(name) {
                Some(2) => return Ok(()),
                Some(1) => {
                    let mut chain = stack.clone();
                    chain.push(name.to_string());
                    return Err(ConfigError::DependencyCycle {
                        key: name.to_string(),
                        chain,
                    });
                }
                _ => {}
            }
            state.insert(name.to_string(), 1);
            stack.push(name.to_string());
            for source in &decl.sources {
                visit(source, derived, state, order, stack)?;
            }
            stack.pop();
            state.insert(name.to_string(), 2);
            order.push(name.to_string());
            Ok(())
        }
    }
}
