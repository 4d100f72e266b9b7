use crate::error::{Level, ScenicErrorExt};
use crate::location::Location;

use super::component::ComponentError;

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(line) => format!(" (line {})", line),
        None => String::new(),
    }
}

/// Failures while evaluating a compiled expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("Undefined name '{name}'")]
    UndefinedName { name: String },
    #[error("'{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },
    #[error("Object of type {type_name} is not callable")]
    NotCallable { type_name: String },
    #[error("Unsupported operand types for {op}: {left} and {right}")]
    UnsupportedOperands { op: String, left: String, right: String },
    #[error("Bad operand type for unary {op}: {type_name}")]
    UnsupportedOperand { op: String, type_name: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow in '{op}'")]
    Overflow { op: String },
    #[error("Function '{name}' expected {expected} arguments, got {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("Invalid argument for '{name}': {message}")]
    InvalidArgument { name: String, message: String },
    #[error("Malformed expression program")]
    Malformed,
}

impl ScenicErrorExt for EvalError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "scenic.runtime.eval".to_string()
    }

    fn location(&self) -> Option<Location> {
        None
    }
}

/// Failures while running an instruction sequence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    #[error("Unresolved symbol '{name}'{}", at_line(.line))]
    UnresolvedSymbol { name: String, line: Option<usize> },
    #[error("'{name}' is a {type_name}, not a buildable class (line {line})")]
    NotBuildable {
        name: String,
        type_name: String,
        line: usize,
    },
    #[error("'{name}' is a {type_name}, not a binding operator (line {line})")]
    NotAnOperator {
        name: String,
        type_name: String,
        line: usize,
    },
    #[error("{var} is used before it is constructed")]
    UnboundVariable { var: String },
    #[error("Declaration '{name}' has no Return step")]
    MissingReturn { name: String },
    #[error(transparent)]
    Component(#[from] ComponentError),
    #[error("Unable to evaluate binding of '{attribute}': {source}")]
    Eval {
        attribute: String,
        #[source]
        source: EvalError,
    },
}

impl BuildError {
    /// Attaches the source line of the failing step to a resolution error
    /// that does not carry one yet.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            BuildError::UnresolvedSymbol { name, line: None } => BuildError::UnresolvedSymbol {
                name,
                line: Some(line),
            },
            other => other,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            BuildError::UnresolvedSymbol { line, .. } => *line,
            BuildError::NotBuildable { line, .. } | BuildError::NotAnOperator { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl ScenicErrorExt for BuildError {
    fn level(&self) -> Level {
        match self {
            BuildError::UnboundVariable { .. } | BuildError::MissingReturn { .. } => Level::Critical,
            _ => Level::Error,
        }
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "scenic.runtime.build".to_string()
    }

    fn location(&self) -> Option<Location> {
        self.line().map(Location::at_line)
    }
}
