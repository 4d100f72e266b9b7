//! The protocols builds talk to: constructed objects (`Component`),
//! buildable classes (`Factory`) and binding operators (`BindingOperator`).
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::ast::BoundExpr;
use crate::error::{Level, ScenicErrorExt};
use crate::ir::CompiledExpr;
use crate::location::Location;

use super::err::BuildError;
use super::scope::{IdentifierScope, Namespace};
use super::toolkit::Toolkit;
use super::value::Value;

pub type ComponentRef = Arc<dyn Component>;

/// An object produced by a build. Mutation goes through `&self` so the
/// same object can sit in an identifier scope and in its parent's children.
pub trait Component: Send + Sync {
    fn type_name(&self) -> String;

    /// Declares a new attribute. `type_value` is `None` for untyped
    /// attributes, otherwise the resolved type symbol.
    fn declare_attribute(&self, name: &str, type_value: Option<Value>, is_event: bool) -> Result<(), ComponentError>;

    fn add_child(&self, child: ComponentRef) -> Result<(), ComponentError>;

    fn set_attribute(&self, name: &str, value: Value) -> Result<(), ComponentError>;

    fn attribute(&self, name: &str) -> Option<Value>;

    fn attribute_names(&self) -> Vec<String>;

    fn children(&self) -> Vec<ComponentRef>;

    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} component>", self.type_name())
    }
}

/// A buildable class: a toolkit primitive or a compiled declaration.
pub trait Factory: Send + Sync {
    fn name(&self) -> String;

    /// Builds a new object. `None` starts a fresh identifier scope.
    fn build(&self, identifiers: Option<IdentifierScope>, toolkit: &Toolkit) -> Result<ComponentRef, BuildError> {
        let identifiers = identifiers.unwrap_or_default();
        self.build_in(&identifiers, toolkit)
    }

    fn build_in(&self, identifiers: &IdentifierScope, toolkit: &Toolkit) -> Result<ComponentRef, BuildError>;

    fn as_any(&self) -> &dyn Any;
}

/// Hooks an attribute up to a bound expression. The toolkit decides what a
/// binding means (one-shot assignment, subscription, delegation...).
pub trait BindingOperator: Send + Sync {
    fn name(&self) -> String;

    #[allow(clippy::too_many_arguments)]
    fn bind(
        &self,
        target: &ComponentRef,
        attribute: &str,
        expr: &BoundExpr,
        compiled: &CompiledExpr,
        identifiers: &IdentifierScope,
        namespace: &Namespace,
        toolkit: &Toolkit,
    ) -> Result<(), BuildError>;
}

/// Structural errors raised by components themselves.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error("'{type_name}' already has an attribute named '{name}'")]
    DuplicateAttribute { type_name: String, name: String },
    #[error("'{type_name}' has no attribute '{name}'")]
    UnknownAttribute { type_name: String, name: String },
    #[error("Attribute '{name}' expects {expected}, got {got}")]
    TypeMismatch {
        name: String,
        expected: String,
        got: String,
    },
    #[error("'{value}' is not a valid type for attribute '{name}'")]
    InvalidType { name: String, value: String },
    #[error("Event '{name}' cannot be assigned")]
    EventAssignment { name: String },
    #[error("'{type_name}' does not accept children")]
    ChildrenNotAllowed { type_name: String },
}

impl ScenicErrorExt for ComponentError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "scenic.runtime.component".to_string()
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

/// Serializable snapshot of a built tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentSnapshot {
    #[serde(rename = "type")]
    pub type_name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<ComponentSnapshot>,
}

impl ComponentSnapshot {
    pub fn capture(component: &ComponentRef) -> Self {
        let attributes = component
            .attribute_names()
            .into_iter()
            .filter_map(|name| {
                let value = component.attribute(&name)?;
                Some((name, format!("{:?}", value)))
            })
            .collect();
        ComponentSnapshot {
            type_name: component.type_name(),
            attributes,
            children: component.children().iter().map(ComponentSnapshot::capture).collect(),
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        writeln!(f, "{}{}", pad, self.type_name)?;
        for (name, value) in &self.attributes {
            writeln!(f, "{}  .{} = {}", pad, name, value)?;
        }
        for child in &self.children {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComponentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
