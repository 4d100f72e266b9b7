use std::fmt;
use std::sync::Arc;

use crate::ast::Literal;

use super::component::{BindingOperator, ComponentRef, Factory};
use super::err::EvalError;
use super::scope::Namespace;

/// Signature of a builtin callable.
pub type NativeFn = fn(&[Value]) -> Result<Value, EvalError>;

#[derive(Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl NativeFunction {
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

/// Type values usable as attribute types (`attr count: int`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int,
    Float,
    Str,
    Bool,
    List,
    Object,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::Bool => "bool",
            TypeTag::List => "list",
            TypeTag::Object => "object",
        }
    }

    /// Whether `value` may be stored in an attribute of this type.
    /// `null` is accepted everywhere and ints widen to float.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (TypeTag::Object, _)
                | (TypeTag::Int, Value::Int(_))
                | (TypeTag::Float, Value::Int(_) | Value::Float(_))
                | (TypeTag::Str, Value::Str(_))
                | (TypeTag::Bool, Value::Bool(_))
                | (TypeTag::List, Value::List(_))
        )
    }
}

/// A runtime value: what namespaces, identifier scopes, the toolkit and
/// component attributes hold.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Type(TypeTag),
    Component(ComponentRef),
    Factory(Arc<dyn Factory>),
    Operator(Arc<dyn BindingOperator>),
    Function(NativeFunction),
    Module(Namespace),
}

impl Value {
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Type(_) => "type".to_string(),
            Value::Component(c) => c.type_name(),
            Value::Factory(_) => "factory".to_string(),
            Value::Operator(_) => "operator".to_string(),
            Value::Function(_) => "function".to_string(),
            Value::Module(_) => "module".to_string(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Attribute access as used by dotted symbols and `a.b` expressions.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        match self {
            Value::Module(namespace) => namespace.get(name),
            Value::Component(component) => component.attribute(name),
            Value::Factory(factory) if name == "__name__" => Some(Value::Str(factory.name())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Value::Component(c) => Some(c),
            _ => None,
        }
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(f) => Value::Float(*f),
            Literal::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Component(a), Value::Component(b)) => Arc::ptr_eq(a, b),
            (Value::Factory(a), Value::Factory(b)) => Arc::ptr_eq(a, b),
            (Value::Operator(a), Value::Operator(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.name == b.name,
            (Value::Module(a), Value::Module(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => f.debug_list().entries(items).finish(),
            Value::Component(c) => write!(f, "<{} component>", c.type_name()),
            Value::Factory(factory) => write!(f, "<factory {}>", factory.name()),
            Value::Operator(op) => write!(f, "<operator {}>", op.name()),
            Value::Function(func) => write!(f, "{:?}", func),
            Value::Module(ns) => write!(f, "<module {}>", ns.name()),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }
            Value::Type(tag) => write!(f, "<type {}>", tag.name()),
            other => write!(f, "{:?}", other),
        }
    }
}
