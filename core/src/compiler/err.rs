use crate::ast::SyntaxError;
use crate::error::{Level, ScenicErrorExt};
use crate::ir::UnhandledNodeError;
use crate::location::Location;
use crate::runtime::{HostError, HostErrorKind};

/// A host block or import failed while compiling a module. Keeps the
/// category of the underlying failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to evaluate host code on line {line}. {kind}: {message}")]
pub struct HostCodeError {
    pub kind: HostErrorKind,
    pub message: String,
    pub line: usize,
    pub file: String,
}

impl HostCodeError {
    /// `node_line` is the line the host block or import starts on; a line
    /// reported by the host is relative to that.
    pub fn from_host(err: HostError, node_line: usize, file: impl Into<String>) -> Self {
        let line = match err.line {
            Some(relative) if relative > 0 => node_line + relative - 1,
            _ => node_line,
        };
        HostCodeError {
            kind: err.kind,
            message: err.message,
            line,
            file: file.into(),
        }
    }
}

impl ScenicErrorExt for HostCodeError {
    fn level(&self) -> Level {
        Level::Error
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "scenic.compiler.host".to_string()
    }

    fn location(&self) -> Option<Location> {
        Some(Location::new(self.file.clone(), self.line, 0))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Unhandled(#[from] UnhandledNodeError),
    #[error(transparent)]
    HostCode(#[from] HostCodeError),
}

impl CompileError {
    fn inner(&self) -> &dyn ScenicErrorExt {
        match self {
            CompileError::Syntax(e) => e,
            CompileError::Unhandled(e) => e,
            CompileError::HostCode(e) => e,
        }
    }
}

impl ScenicErrorExt for CompileError {
    fn level(&self) -> Level {
        self.inner().level()
    }

    fn message(&self) -> String {
        self.inner().message()
    }

    fn issuer(&self) -> String {
        self.inner().issuer()
    }

    fn location(&self) -> Option<Location> {
        self.inner().location()
    }
}
