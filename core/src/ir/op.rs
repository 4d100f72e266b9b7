use serde::{Deserialize, Serialize};

use crate::ast::{BinaryOperator, BoundExpr, Literal, SymbolPath, UnaryOperator};

/// A synthetic, compiler-internal variable holding an object under
/// construction. Never visible in an identifier scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Var(pub usize);

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_var_{}", self.0)
    }
}

/// How a `Construct` step hands the identifier scope to the constructed class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeMode {
    /// Pass the caller's scope; the base of a derived declaration shares ids.
    Shared,
    /// Pass no scope; the child builds its own fresh one.
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Construct {
        dest: Var,
        class: SymbolPath,
        scope: ScopeMode,
        line: usize,
    },
    StoreIdentifier {
        src: Var,
        name: String,
    },
    DeclareAttribute {
        target: Var,
        name: String,
        type_name: Option<SymbolPath>,
        is_event: bool,
        line: usize,
    },
    Bind {
        target: Var,
        attribute: String,
        operator: SymbolPath,
        expr: BoundExpr,
        compiled: CompiledExpr,
        line: usize,
    },
    AddChild {
        parent: Var,
        child: Var,
    },
    Return {
        src: Var,
    },
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Construct { dest, class, scope, .. } => {
                let mode = match scope {
                    ScopeMode::Shared => "identifiers",
                    ScopeMode::Isolated => "None",
                };
                write!(f, "Construct {} <- {}({})", dest, class, mode)
            }
            Step::StoreIdentifier { src, name } => write!(f, "StoreIdentifier identifiers[{:?}] <- {}", name, src),
            Step::DeclareAttribute { target, name, type_name, is_event, .. } => {
                write!(f, "DeclareAttribute {}.{}", target, name)?;
                if let Some(ty) = type_name {
                    write!(f, ": {}", ty)?;
                }
                write!(f, " is_event={}", is_event)
            }
            Step::Bind { target, attribute, operator, expr, .. } => {
                write!(f, "Bind {}({}, {:?}, `{}`)", operator, target, attribute, expr.source)
            }
            Step::AddChild { parent, child } => write!(f, "AddChild {} <- {}", parent, child),
            Step::Return { src } => write!(f, "Return {}", src),
        }
    }
}

/// Stack-machine instruction of a compiled binding expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprOp {
    Const(Literal),
    Load(String),
    GetAttr(String),
    /// Pops `n` arguments then the callee.
    Call(usize),
    BuildList(usize),
    Unary(UnaryOperator),
    Binary(BinaryOperator),
    /// Short-circuit `and`: jump to target keeping the top if it is falsy.
    JumpIfFalseOrPop(usize),
    /// Short-circuit `or`: jump to target keeping the top if it is truthy.
    JumpIfTrueOrPop(usize),
}

impl std::fmt::Display for ExprOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExprOp::Const(lit) => write!(f, "Const {:?}", lit),
            ExprOp::Load(name) => write!(f, "Load {}", name),
            ExprOp::GetAttr(name) => write!(f, "GetAttr {}", name),
            ExprOp::Call(argc) => write!(f, "Call {}", argc),
            ExprOp::BuildList(len) => write!(f, "BuildList {}", len),
            ExprOp::Unary(op) => write!(f, "Unary {}", op.token()),
            ExprOp::Binary(op) => write!(f, "Binary {}", op.token()),
            ExprOp::JumpIfFalseOrPop(target) => write!(f, "JumpIfFalseOrPop {}", target),
            ExprOp::JumpIfTrueOrPop(target) => write!(f, "JumpIfTrueOrPop {}", target),
        }
    }
}

/// The evaluable form of a bound expression, produced at lowering time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledExpr {
    pub ops: Vec<ExprOp>,
}

impl CompiledExpr {
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
