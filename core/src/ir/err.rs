use crate::error::{Level, ScenicErrorExt};
use crate::location::Location;

/// An AST node kind reached a place that has no lowering rule for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unhandled node {kind}")]
pub struct UnhandledNodeError {
    kind: String,
    location: Option<Location>,
}

impl UnhandledNodeError {
    pub fn new(kind: impl Into<String>, location: Option<Location>) -> Self {
        UnhandledNodeError {
            kind: kind.into(),
            location,
        }
    }

    /// Name of the offending node kind, e.g. `HostBlock`.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl ScenicErrorExt for UnhandledNodeError {
    fn level(&self) -> Level {
        Level::Critical
    }

    fn message(&self) -> String {
        format!("Unhandled node {}.", self.kind)
    }

    fn issuer(&self) -> String {
        "scenic.ir.lower".to_string()
    }

    fn location(&self) -> Option<Location> {
        self.location.clone()
    }
}
