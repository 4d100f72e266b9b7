//! Compiles a module's syntax tree into a namespace: host blocks and
//! imports run through the host runtime, declarations become wrappers.
pub mod err;

use std::sync::Arc;

use log::{debug, info, warn};

use crate::ast::{self, AstNode, AstNodeKind};
use crate::ir::{UnhandledNodeError, lower_declaration};
use crate::runtime::{DeclarationWrapper, HostRuntime, Namespace, Value, import_hooks};
use crate::script::Script;

pub use self::err::{CompileError, HostCodeError};

/// Compiles `module` into `namespace`. Stops at the first failing node;
/// names installed before the failure stay in the namespace.
pub fn compile_module(module: &AstNode, namespace: &Namespace, host: &dyn HostRuntime) -> Result<(), CompileError> {
    ModuleCompiler::new(namespace, host).compile(module)
}

/// Parses and compiles a script.
pub fn compile_script(script: &Script, namespace: &Namespace, host: &dyn HostRuntime) -> Result<(), CompileError> {
    let module = ast::generate_ast_from_source(script)?;
    ModuleCompiler::new(namespace, host)
        .with_file(script.name.clone())
        .compile(&module)
}

pub struct ModuleCompiler<'a> {
    namespace: &'a Namespace,
    host: &'a dyn HostRuntime,
    file: String,
}

impl<'a> ModuleCompiler<'a> {
    pub fn new(namespace: &'a Namespace, host: &'a dyn HostRuntime) -> Self {
        ModuleCompiler {
            namespace,
            host,
            file: namespace.name(),
        }
    }

    /// File name reported in host code errors.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn compile(&self, module: &AstNode) -> Result<(), CompileError> {
        let AstNodeKind::Module { doc, body } = &module.kind else {
            return Err(UnhandledNodeError::new(module.kind.kind_name(), module.location.clone()).into());
        };

        self.host
            .prepare(self.namespace)
            .map_err(|e| HostCodeError::from_host(e, module.line(), self.file.clone()))?;
        if let Some(doc) = doc {
            self.namespace.set(Namespace::DOC, Value::Str(doc.clone()));
        }

        for node in body {
            self.compile_item(node)?;
        }
        info!("compiled module {} ({} items)", self.namespace.name(), body.len());
        Ok(())
    }

    fn compile_item(&self, node: &AstNode) -> Result<(), CompileError> {
        match &node.kind {
            AstNodeKind::HostBlock { code } => {
                debug!("{}: host block at line {}", self.file, node.line());
                self.host
                    .exec(code, self.namespace)
                    .map_err(|e| self.host_error(e, node))?;
            }
            AstNodeKind::Import { code } => {
                debug!("{}: {}", self.file, code.trim());
                let _hooks = import_hooks();
                self.host
                    .import(code, self.namespace)
                    .map_err(|e| self.host_error(e, node))?;
            }
            AstNodeKind::Declaration { name, base, .. } => {
                let sequence = lower_declaration(node)?;
                if self.namespace.contains(name) {
                    warn!("{}: declaration {} replaces an existing name", self.file, name);
                }
                let wrapper = DeclarationWrapper::new(sequence, base.text.clone(), self.namespace.clone());
                info!("installed declaration {}", wrapper);
                self.namespace.set(name.clone(), Value::Factory(Arc::new(wrapper)));
            }
            _ => {
                return Err(UnhandledNodeError::new(node.kind.kind_name(), node.location.clone()).into());
            }
        }
        Ok(())
    }

    fn host_error(&self, err: crate::runtime::HostError, node: &AstNode) -> CompileError {
        HostCodeError::from_host(err, node.line(), self.file.clone()).into()
    }
}
