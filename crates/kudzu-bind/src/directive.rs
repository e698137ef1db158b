//! Declarative binding descriptions, as loaded from interface definitions.
//!
//! A [`BindingDirective`] is plain data: a source key path, a target
//! property name, an optional transformer name, and a direction flag. It is
//! what an interface file serializes; [`BindingDirective::resolve`] turns
//! it into a live [`Binding`] against a concrete source object and target,
//! failing loudly on any unresolvable name.

use std::cell::RefCell;
use std::rc::Rc;

use kudzu_core::KeyPath;
use kudzu_observe::ObsObject;
use serde::{Deserialize, Serialize};

use crate::binding::{BindError, Binding, Direction};
use crate::target::PropertyTarget;
use crate::transformer::TransformerRegistry;

/// One serialized binding description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingDirective {
    /// Dotted path into the source object.
    pub source_key_path: String,
    /// Property name on the target.
    pub target_property: String,
    /// Registered transformer name; `None` means identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer: Option<String>,
    /// Whether target edits flow back into the model.
    #[serde(default)]
    pub two_way: bool,
}

impl BindingDirective {
    /// A one-way identity directive.
    pub fn new(source_key_path: impl Into<String>, target_property: impl Into<String>) -> Self {
        Self {
            source_key_path: source_key_path.into(),
            target_property: target_property.into(),
            transformer: None,
            two_way: false,
        }
    }

    /// Resolve against a concrete source, target, and transformer registry.
    ///
    /// # Errors
    ///
    /// [`BindError::KeyPath`] for a malformed `source_key_path`;
    /// [`BindError::Config`] for an unknown transformer, an unknown target
    /// property, a non-reversible two-way request, or an observation cycle.
    pub fn resolve(
        &self,
        source: &ObsObject,
        target: Rc<RefCell<dyn PropertyTarget>>,
        registry: &TransformerRegistry,
    ) -> Result<Binding, BindError> {
        let path = KeyPath::parse(&self.source_key_path)?;
        let transformer = match &self.transformer {
            Some(name) => registry.resolve(name)?.clone(),
            None => registry.resolve(crate::transformer::IDENTITY)?.clone(),
        };
        let direction = if self.two_way {
            Direction::TwoWay
        } else {
            Direction::OneWay
        };
        Ok(Binding::bind(
            source,
            path,
            target,
            self.target_property.clone(),
            transformer,
            direction,
        )?)
    }
}
