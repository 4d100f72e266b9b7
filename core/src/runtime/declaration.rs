use std::any::Any;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::ir::InstructionSequence;

use super::component::{ComponentRef, Factory};
use super::err::BuildError;
use super::exec::run_sequence;
use super::scope::{IdentifierScope, Namespace};
use super::toolkit::Toolkit;

/// A compiled declaration bound to the namespace it was compiled into.
/// Calling `build` runs its instruction sequence.
pub struct DeclarationWrapper {
    base: String,
    module: String,
    sequence: Arc<InstructionSequence>,
    namespace: Namespace,
}

impl DeclarationWrapper {
    pub fn new(sequence: InstructionSequence, base: impl Into<String>, namespace: Namespace) -> Self {
        DeclarationWrapper {
            base: base.into(),
            module: namespace.name(),
            sequence: Arc::new(sequence),
            namespace,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn declaration_name(&self) -> &str {
        self.sequence.name()
    }

    pub fn doc(&self) -> Option<&str> {
        self.sequence.doc()
    }

    pub fn sequence(&self) -> &InstructionSequence {
        &self.sequence
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl Factory for DeclarationWrapper {
    fn name(&self) -> String {
        self.sequence.name().to_string()
    }

    fn build_in(&self, identifiers: &IdentifierScope, toolkit: &Toolkit) -> Result<ComponentRef, BuildError> {
        debug!("building {}", self);
        run_sequence(&self.sequence, identifiers, &self.namespace, toolkit)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Display for DeclarationWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.sequence.name())
    }
}

impl fmt::Debug for DeclarationWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationWrapper")
            .field("name", &self.sequence.name())
            .field("base", &self.base)
            .field("module", &self.module)
            .finish()
    }
}
