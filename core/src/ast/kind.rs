//! AST node kinds for scenic modules and the inline expression language.
//!
//! `AstNodeKind` covers the declarative structure (modules, declarations,
//! instantiations, attributes, bindings) while `Expr` covers the right-hand
//! side of bindings and host statements.
use serde::{Deserialize, Serialize};

use super::node::AstNode;

/// Toolkit symbol of the `=` binding operator.
pub const OP_EQUAL: &str = "__op_equal__";
/// Toolkit symbol of the `:=` binding operator.
pub const OP_COLON_EQUAL: &str = "__op_colon_equal__";
/// Toolkit symbol of the `<<` binding operator.
pub const OP_LEFT_SHIFT: &str = "__op_left_shift__";
/// Toolkit symbol of the `>>` binding operator.
pub const OP_RIGHT_SHIFT: &str = "__op_right_shift__";

/// Maps the operator token of a binding to its toolkit symbol.
pub fn binding_operator_symbol(token: &str) -> Option<&'static str> {
    match token {
        "=" => Some(OP_EQUAL),
        ":=" => Some(OP_COLON_EQUAL),
        "<<" => Some(OP_LEFT_SHIFT),
        ">>" => Some(OP_RIGHT_SHIFT),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Le,  // <=
    Gt,  // >
    Ge,  // >=
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    And, // and
    Or,  // or
}

impl BinaryOperator {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::Ne,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::Le,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::Ge,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "and" => BinaryOperator::And,
            "or" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn token(&self) -> &'static str {
        match self {
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Plus,  // +
    Minus, // -
    Not,   // not
}

impl UnaryOperator {
    pub fn token(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "not",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// Expression syntax tree handed to binding operators untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    Attribute { value: Box<Expr>, attr: String },
    Call { func: Box<Expr>, args: Vec<Expr> },
    List(Vec<Expr>),
    Unary { op: UnaryOperator, expr: Box<Expr> },
    Binary { left: Box<Expr>, op: BinaryOperator, right: Box<Expr> },
}

/// A possibly dotted symbol (`Window`, `widgets.Label`) resolved through the
/// toolkit at build time. `text` keeps the source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolPath {
    pub text: String,
    pub parts: Vec<String>,
}

impl SymbolPath {
    pub fn parse(text: &str) -> Self {
        let parts = text
            .split('.')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        SymbolPath { text: text.to_string(), parts }
    }

    pub fn head(&self) -> Option<&str> {
        self.parts.first().map(String::as_str)
    }
}

impl std::fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

/// The right-hand side of a binding: its source text plus parsed tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundExpr {
    pub source: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Toolkit symbol of the binding operator (see `OP_EQUAL` and friends).
    pub op: String,
    pub expr: BoundExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNodeKind {
    Module {
        doc: Option<String>,
        body: Vec<AstNode>,
    },
    /// Raw host-language code executed against the module namespace.
    HostBlock {
        code: String,
    },
    /// An import statement, kept as source text for the host runtime.
    Import {
        code: String,
    },
    Declaration {
        name: String,
        base: SymbolPath,
        identifier: Option<String>,
        doc: Option<String>,
        body: Vec<AstNode>,
    },
    Instantiation {
        name: SymbolPath,
        identifier: Option<String>,
        body: Vec<AstNode>,
    },
    AttributeDeclaration {
        name: String,
        type_name: Option<SymbolPath>,
        is_event: bool,
        default: Option<Box<AstNode>>,
    },
    AttributeBinding {
        name: String,
        binding: Binding,
    },
}

impl AstNodeKind {
    /// The kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AstNodeKind::Module { .. } => "Module",
            AstNodeKind::HostBlock { .. } => "HostBlock",
            AstNodeKind::Import { .. } => "Import",
            AstNodeKind::Declaration { .. } => "Declaration",
            AstNodeKind::Instantiation { .. } => "Instantiation",
            AstNodeKind::AttributeDeclaration { .. } => "AttributeDeclaration",
            AstNodeKind::AttributeBinding { .. } => "AttributeBinding",
        }
    }

    /// Child body of declarations and instantiations.
    pub fn body(&self) -> Option<&[AstNode]> {
        match self {
            AstNodeKind::Module { body, .. }
            | AstNodeKind::Declaration { body, .. }
            | AstNodeKind::Instantiation { body, .. } => Some(body.as_slice()),
            _ => None,
        }
    }
}

impl std::fmt::Display for AstNodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind_name())
    }
}
