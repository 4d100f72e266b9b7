//! A small generic toolkit: element classes, attribute types and the `=`
//! operator. Enough to build and inspect trees without a real UI library.
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use crate::ast::BoundExpr;
use crate::ast::kind::OP_EQUAL;
use crate::ir::CompiledExpr;

use super::builtins::BUILTINS;
use super::component::{BindingOperator, Component, ComponentError, ComponentRef, Factory};
use super::err::BuildError;
use super::eval::{BindingScope, evaluate};
use super::scope::{IdentifierScope, Namespace};
use super::toolkit::Toolkit;
use super::value::{TypeTag, Value};

#[derive(Clone)]
struct Slot {
    type_value: Option<Value>,
    is_event: bool,
    value: Value,
}

#[derive(Default)]
struct ElementState {
    attributes: BTreeMap<String, Slot>,
    children: Vec<ComponentRef>,
}

/// A generic component instance.
pub struct Element {
    id: Uuid,
    class: &'static str,
    accepts_children: bool,
    state: Mutex<ElementState>,
}

impl Element {
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn state(&self) -> MutexGuard<'_, ElementState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether `name` was declared as an event.
    pub fn is_event(&self, name: &str) -> bool {
        self.state().attributes.get(name).is_some_and(|slot| slot.is_event)
    }
}

fn type_accepts(type_value: &Value, value: &Value) -> bool {
    match type_value {
        Value::Type(tag) => tag.accepts(value),
        Value::Factory(_) => matches!(value, Value::Null | Value::Component(_)),
        _ => false,
    }
}

impl Component for Element {
    fn type_name(&self) -> String {
        self.class.to_string()
    }

    fn declare_attribute(&self, name: &str, type_value: Option<Value>, is_event: bool) -> Result<(), ComponentError> {
        if let Some(ty) = &type_value {
            if !matches!(ty, Value::Type(_) | Value::Factory(_)) {
                return Err(ComponentError::InvalidType {
                    name: name.to_string(),
                    value: format!("{:?}", ty),
                });
            }
        }
        let mut state = self.state();
        if state.attributes.contains_key(name) {
            return Err(ComponentError::DuplicateAttribute {
                type_name: self.type_name(),
                name: name.to_string(),
            });
        }
        state.attributes.insert(
            name.to_string(),
            Slot {
                type_value,
                is_event,
                value: Value::Null,
            },
        );
        Ok(())
    }

    fn add_child(&self, child: ComponentRef) -> Result<(), ComponentError> {
        if !self.accepts_children {
            return Err(ComponentError::ChildrenNotAllowed {
                type_name: self.type_name(),
            });
        }
        self.state().children.push(child);
        Ok(())
    }

    fn set_attribute(&self, name: &str, value: Value) -> Result<(), ComponentError> {
        let mut state = self.state();
        let slot = state
            .attributes
            .get_mut(name)
            .ok_or_else(|| ComponentError::UnknownAttribute {
                type_name: self.class.to_string(),
                name: name.to_string(),
            })?;
        if slot.is_event {
            return Err(ComponentError::EventAssignment { name: name.to_string() });
        }
        if let Some(ty) = &slot.type_value {
            if !type_accepts(ty, &value) {
                return Err(ComponentError::TypeMismatch {
                    name: name.to_string(),
                    expected: format!("{}", ty),
                    got: value.type_name(),
                });
            }
        }
        slot.value = value;
        Ok(())
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.state().attributes.get(name).map(|slot| slot.value.clone())
    }

    fn attribute_names(&self) -> Vec<String> {
        self.state().attributes.keys().cloned().collect()
    }

    fn children(&self) -> Vec<ComponentRef> {
        self.state().children.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("class", &self.class)
            .field("id", &self.id)
            .field("attributes", &self.attribute_names())
            .finish()
    }
}

/// A primitive buildable class producing `Element`s with a fixed set of
/// predeclared attributes.
#[derive(Debug, Clone, Copy)]
pub struct ElementClass {
    pub name: &'static str,
    pub accepts_children: bool,
    /// `(name, type, is_event)`
    pub attributes: &'static [(&'static str, TypeTag, bool)],
}

impl ElementClass {
    pub fn create(&self) -> Result<Arc<Element>, ComponentError> {
        let element = Element {
            id: Uuid::new_v4(),
            class: self.name,
            accepts_children: self.accepts_children,
            state: Mutex::new(ElementState::default()),
        };
        for (name, tag, is_event) in self.attributes {
            element.declare_attribute(name, Some(Value::Type(*tag)), *is_event)?;
        }
        Ok(Arc::new(element))
    }
}

impl Factory for ElementClass {
    fn name(&self) -> String {
        self.name.to_string()
    }

    fn build_in(&self, _identifiers: &IdentifierScope, _toolkit: &Toolkit) -> Result<ComponentRef, BuildError> {
        let element: ComponentRef = self.create()?;
        Ok(element)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub const ELEMENT_CLASSES: &[ElementClass] = &[
    ElementClass {
        name: "Window",
        accepts_children: true,
        attributes: &[("title", TypeTag::Str, false)],
    },
    ElementClass {
        name: "Container",
        accepts_children: true,
        attributes: &[],
    },
    ElementClass {
        name: "Label",
        accepts_children: false,
        attributes: &[("text", TypeTag::Str, false)],
    },
    ElementClass {
        name: "PushButton",
        accepts_children: false,
        attributes: &[("text", TypeTag::Str, false), ("clicked", TypeTag::Object, true)],
    },
    ElementClass {
        name: "Field",
        accepts_children: false,
        attributes: &[("text", TypeTag::Str, false), ("placeholder", TypeTag::Str, false)],
    },
];

/// One-shot `=`: evaluates the expression once and assigns the result.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqualOperator;

impl BindingOperator for EqualOperator {
    fn name(&self) -> String {
        OP_EQUAL.to_string()
    }

    fn bind(
        &self,
        target: &ComponentRef,
        attribute: &str,
        _expr: &BoundExpr,
        compiled: &CompiledExpr,
        identifiers: &IdentifierScope,
        namespace: &Namespace,
        toolkit: &Toolkit,
    ) -> Result<(), BuildError> {
        let scope = BindingScope {
            identifiers,
            toolkit,
            namespace,
        };
        let value = evaluate(compiled, &scope).map_err(|source| BuildError::Eval {
            attribute: attribute.to_string(),
            source,
        })?;
        target.set_attribute(attribute, value)?;
        Ok(())
    }
}

const TYPES: &[TypeTag] = &[
    TypeTag::Int,
    TypeTag::Float,
    TypeTag::Str,
    TypeTag::Bool,
    TypeTag::List,
    TypeTag::Object,
];

/// Element classes, types, builtins and the `=` operator.
pub fn basic_toolkit() -> Toolkit {
    let mut builder = Toolkit::builder();
    for class in ELEMENT_CLASSES {
        builder = builder.symbol(class.name, Value::Factory(Arc::new(*class)));
    }
    for tag in TYPES {
        builder = builder.symbol(tag.name(), Value::Type(*tag));
    }
    for func in BUILTINS {
        builder = builder.symbol(func.name, Value::Function(*func));
    }
    builder.symbol(OP_EQUAL, Value::Operator(Arc::new(EqualOperator))).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str) -> ElementClass {
        *ELEMENT_CLASSES.iter().find(|c| c.name == name).expect("known class")
    }

    #[test]
    fn leaf_rejects_children() {
        let label = class("Label").create().unwrap();
        let other: ComponentRef = class("Label").create().unwrap();
        assert_eq!(
            label.add_child(other),
            Err(ComponentError::ChildrenNotAllowed { type_name: "Label".into() })
        );
    }

    #[test]
    fn typed_attribute_checks_values() {
        let window = class("Window").create().unwrap();
        assert!(window.set_attribute("title", Value::Int(3)).is_err());
        window.set_attribute("title", Value::Str("Main".into())).unwrap();
        assert_eq!(window.attribute("title"), Some(Value::Str("Main".into())));
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let window = class("Window").create().unwrap();
        window.declare_attribute("a", None, false).unwrap();
        assert!(matches!(
            window.declare_attribute("a", None, false),
            Err(ComponentError::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn events_cannot_be_assigned() {
        let button = class("PushButton").create().unwrap();
        assert!(button.is_event("clicked"));
        assert_eq!(
            button.set_attribute("clicked", Value::Bool(true)),
            Err(ComponentError::EventAssignment { name: "clicked".into() })
        );
    }
}
