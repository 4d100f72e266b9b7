//! Stack evaluation of `CompiledExpr` programs.
use crate::ast::{BinaryOperator, UnaryOperator};
use crate::ir::{CompiledExpr, ExprOp};

use super::err::EvalError;
use super::scope::{IdentifierScope, Namespace};
use super::toolkit::Toolkit;
use super::value::Value;

/// Name lookup used by `ExprOp::Load`.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<Value>;
}

/// Lookup for bound expressions: ids first, then the toolkit, then the
/// namespace the declaration was compiled into.
pub struct BindingScope<'a> {
    pub identifiers: &'a IdentifierScope,
    pub toolkit: &'a Toolkit,
    pub namespace: &'a Namespace,
}

impl Lookup for BindingScope<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.identifiers
            .get(name)
            .or_else(|| self.toolkit.get(name))
            .or_else(|| self.namespace.get(name))
    }
}

impl Lookup for Namespace {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name)
    }
}

pub fn evaluate(expr: &CompiledExpr, scope: &dyn Lookup) -> Result<Value, EvalError> {
    let mut stack: Vec<Value> = Vec::new();
    let mut pc = 0;
    while pc < expr.ops.len() {
        match &expr.ops[pc] {
            ExprOp::Const(lit) => stack.push(Value::from(lit)),
            ExprOp::Load(name) => {
                let value = scope
                    .lookup(name)
                    .ok_or_else(|| EvalError::UndefinedName { name: name.clone() })?;
                stack.push(value);
            }
            ExprOp::GetAttr(attr) => {
                let value = pop(&mut stack)?;
                let found = value.attribute(attr).ok_or_else(|| EvalError::UnknownAttribute {
                    type_name: value.type_name(),
                    attribute: attr.clone(),
                })?;
                stack.push(found);
            }
            ExprOp::Call(argc) => {
                let args = pop_n(&mut stack, *argc)?;
                let callee = pop(&mut stack)?;
                match callee {
                    Value::Function(func) => stack.push(func.call(&args)?),
                    other => {
                        return Err(EvalError::NotCallable {
                            type_name: other.type_name(),
                        });
                    }
                }
            }
            ExprOp::BuildList(len) => {
                let items = pop_n(&mut stack, *len)?;
                stack.push(Value::List(items));
            }
            ExprOp::Unary(op) => {
                let value = pop(&mut stack)?;
                stack.push(unary(*op, value)?);
            }
            ExprOp::Binary(op) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                stack.push(binary(*op, left, right)?);
            }
            ExprOp::JumpIfFalseOrPop(target) => {
                let top = stack.last().ok_or(EvalError::Malformed)?;
                if !top.is_truthy() {
                    pc = *target;
                    continue;
                }
                stack.pop();
            }
            ExprOp::JumpIfTrueOrPop(target) => {
                let top = stack.last().ok_or(EvalError::Malformed)?;
                if top.is_truthy() {
                    pc = *target;
                    continue;
                }
                stack.pop();
            }
        }
        pc += 1;
    }

    let result = pop(&mut stack)?;
    if !stack.is_empty() {
        return Err(EvalError::Malformed);
    }
    Ok(result)
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, EvalError> {
    stack.pop().ok_or(EvalError::Malformed)
}

fn pop_n(stack: &mut Vec<Value>, n: usize) -> Result<Vec<Value>, EvalError> {
    if stack.len() < n {
        return Err(EvalError::Malformed);
    }
    Ok(stack.split_off(stack.len() - n))
}

fn unary(op: UnaryOperator, value: Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOperator::Not, v) => Ok(Value::Bool(!v.is_truthy())),
        (UnaryOperator::Minus, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow {
            op: op.token().to_string(),
        }),
        (UnaryOperator::Minus, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOperator::Plus, v @ (Value::Int(_) | Value::Float(_))) => Ok(v),
        (op, v) => Err(EvalError::UnsupportedOperand {
            op: op.token().to_string(),
            type_name: v.type_name(),
        }),
    }
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn binary(op: BinaryOperator, left: Value, right: Value) -> Result<Value, EvalError> {
    use BinaryOperator::*;

    let unsupported = |left: &Value, right: &Value| EvalError::UnsupportedOperands {
        op: op.token().to_string(),
        left: left.type_name(),
        right: right.type_name(),
    };

    match op {
        Eq => return Ok(Value::Bool(left == right)),
        Ne => return Ok(Value::Bool(left != right)),
        // short-circuited in the program; reaching here means both sides ran
        And => return Ok(if left.is_truthy() { right } else { left }),
        Or => return Ok(if left.is_truthy() { left } else { right }),
        _ => {}
    }

    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let overflow = || EvalError::Overflow {
                op: op.token().to_string(),
            };
            let value = match op {
                Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
                Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
                Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
                Div if b == 0 => return Err(EvalError::DivisionByZero),
                Div => Value::Float(a as f64 / b as f64),
                Mod if b == 0 => return Err(EvalError::DivisionByZero),
                Mod => Value::Int(a.checked_rem_euclid(b).ok_or_else(overflow)?),
                Lt => Value::Bool(a < b),
                Le => Value::Bool(a <= b),
                Gt => Value::Bool(a > b),
                Ge => Value::Bool(a >= b),
                _ => return Err(unsupported(&left, &right)),
            };
            Ok(value)
        }
        (Value::Str(a), Value::Str(b)) => match op {
            Add => Ok(Value::Str(format!("{}{}", a, b))),
            Lt => Ok(Value::Bool(a < b)),
            Le => Ok(Value::Bool(a <= b)),
            Gt => Ok(Value::Bool(a > b)),
            Ge => Ok(Value::Bool(a >= b)),
            _ => Err(unsupported(&left, &right)),
        },
        (Value::List(a), Value::List(b)) if op == Add => {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            Ok(Value::List(items))
        }
        _ => {
            let (Some(a), Some(b)) = (as_float(&left), as_float(&right)) else {
                return Err(unsupported(&left, &right));
            };
            let value = match op {
                Add => Value::Float(a + b),
                Sub => Value::Float(a - b),
                Mul => Value::Float(a * b),
                Div if b == 0.0 => return Err(EvalError::DivisionByZero),
                Div => Value::Float(a / b),
                Mod if b == 0.0 => return Err(EvalError::DivisionByZero),
                Mod => Value::Float(a.rem_euclid(b)),
                Lt => Value::Bool(a < b),
                Le => Value::Bool(a <= b),
                Gt => Value::Bool(a > b),
                Ge => Value::Bool(a >= b),
                _ => return Err(unsupported(&left, &right)),
            };
            Ok(value)
        }
    }
}
