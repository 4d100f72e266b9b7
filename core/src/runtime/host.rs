//! The host language runtime: what `::host::` blocks and import statements
//! run against.
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use lazy_static::lazy_static;
use log::{debug, info};
use serde::Serialize;

use crate::ast::{ImportSpec, SymbolPath, SyntaxError, parse_host_program, parse_import};
use crate::compiler::compile_script;
use crate::error::ScenicErrorExt;
use crate::ir::compile_expr;
use crate::script::Script;

use super::builtins::BUILTINS;
use super::err::EvalError;
use super::eval::{Lookup, evaluate};
use super::scope::Namespace;
use super::value::Value;

/// Category of a host failure, kept when the failure is re-raised by the
/// module compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HostErrorKind {
    Syntax,
    Name,
    Attribute,
    Type,
    Value,
    Arithmetic,
    Import,
    Runtime,
}

impl fmt::Display for HostErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            HostErrorKind::Syntax => "SyntaxError",
            HostErrorKind::Name => "NameError",
            HostErrorKind::Attribute => "AttributeError",
            HostErrorKind::Type => "TypeError",
            HostErrorKind::Value => "ValueError",
            HostErrorKind::Arithmetic => "ArithmeticError",
            HostErrorKind::Import => "ImportError",
            HostErrorKind::Runtime => "RuntimeError",
        };
        write!(f, "{}", kind)
    }
}

impl From<&EvalError> for HostErrorKind {
    fn from(err: &EvalError) -> Self {
        match err {
            EvalError::UndefinedName { .. } => HostErrorKind::Name,
            EvalError::UnknownAttribute { .. } => HostErrorKind::Attribute,
            EvalError::NotCallable { .. }
            | EvalError::UnsupportedOperands { .. }
            | EvalError::UnsupportedOperand { .. }
            | EvalError::Arity { .. } => HostErrorKind::Type,
            EvalError::InvalidArgument { .. } => HostErrorKind::Value,
            EvalError::DivisionByZero | EvalError::Overflow { .. } => HostErrorKind::Arithmetic,
            EvalError::Malformed => HostErrorKind::Runtime,
        }
    }
}

/// A failure raised by host code. `line` is relative to the executed code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct HostError {
    pub kind: HostErrorKind,
    pub message: String,
    pub line: Option<usize>,
}

impl HostError {
    pub fn new(kind: HostErrorKind, message: impl Into<String>) -> Self {
        HostError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

impl From<SyntaxError> for HostError {
    fn from(err: SyntaxError) -> Self {
        HostError::new(HostErrorKind::Syntax, err.message()).with_line(err.line())
    }
}

pub trait HostRuntime {
    /// Called once on a namespace before any module code runs in it.
    fn prepare(&self, namespace: &Namespace) -> Result<(), HostError>;

    fn exec(&self, code: &str, namespace: &Namespace) -> Result<(), HostError>;

    fn import(&self, statement: &str, namespace: &Namespace) -> Result<(), HostError>;
}

lazy_static! {
    static ref IMPORT_HOOKS: Mutex<usize> = Mutex::new(0);
}

fn hook_count() -> MutexGuard<'static, usize> {
    IMPORT_HOOKS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// While alive, imports may load `.scn` modules from disk. Guards nest;
/// hooks stay active until the last one is dropped.
#[must_use = "import hooks are deactivated when the guard is dropped"]
pub struct ImportHooks {
    _private: (),
}

pub fn import_hooks() -> ImportHooks {
    *hook_count() += 1;
    ImportHooks { _private: () }
}

pub fn import_hooks_active() -> bool {
    *hook_count() > 0
}

impl Drop for ImportHooks {
    fn drop(&mut self) {
        let mut count = hook_count();
        *count = count.saturating_sub(1);
    }
}

/// Name lookup for host statements: the namespace, then its builtins.
struct HostScope<'a> {
    namespace: &'a Namespace,
}

impl Lookup for HostScope<'_> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.namespace.get(name).or_else(|| {
            self.namespace
                .get(ScriptHost::BUILTINS_KEY)
                .and_then(|builtins| builtins.attribute(name))
        })
    }
}

/// The bundled host runtime. Runs `name = expr;` statements and resolves
/// imports against registered modules or, while import hooks are active,
/// `.scn` files found on its search paths.
pub struct ScriptHost {
    search_paths: Vec<PathBuf>,
    modules: Mutex<HashMap<String, Namespace>>,
}

impl Default for ScriptHost {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ScriptHost {
    pub const PATH_VAR: &'static str = "SCENIC_PATH";
    pub const BUILTINS_KEY: &'static str = "__builtins__";
    pub const EXTENSION: &'static str = "scn";

    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        ScriptHost {
            search_paths,
            modules: Mutex::new(HashMap::new()),
        }
    }

    /// Search paths from `SCENIC_PATH`, or the current directory.
    pub fn from_env() -> Self {
        let paths = match std::env::var_os(Self::PATH_VAR) {
            Some(value) => std::env::split_paths(&value).collect(),
            None => vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))],
        };
        Self::new(paths)
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    fn modules(&self) -> MutexGuard<'_, HashMap<String, Namespace>> {
        self.modules.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes `namespace` importable as `name`.
    pub fn register_module(&self, name: impl Into<String>, namespace: Namespace) {
        self.modules().insert(name.into(), namespace);
    }

    pub fn module(&self, name: &str) -> Option<Namespace> {
        self.modules().get(name).cloned()
    }

    fn find_module_file(&self, path: &SymbolPath) -> Option<PathBuf> {
        let mut relative: PathBuf = path.parts.iter().collect();
        relative.set_extension(Self::EXTENSION);
        self.search_paths
            .iter()
            .map(|dir| dir.join(&relative))
            .find(|candidate| candidate.is_file())
    }

    fn load_module(&self, path: &SymbolPath) -> Result<Namespace, HostError> {
        let name = path.to_string();
        if let Some(namespace) = self.module(&name) {
            return Ok(namespace);
        }
        let not_found = || HostError::new(HostErrorKind::Import, format!("No module named '{}'", name));
        if !import_hooks_active() {
            return Err(not_found());
        }
        let file = self.find_module_file(path).ok_or_else(not_found)?;
        self.load_file(&name, &file)
    }

    fn load_file(&self, name: &str, file: &Path) -> Result<Namespace, HostError> {
        let script = Script::new(file.to_path_buf())
            .map_err(|e| HostError::new(HostErrorKind::Import, e.to_string()))?;

        // Registered before compiling so a cyclic import sees the partially
        // filled namespace instead of recursing.
        let namespace = Namespace::new(name);
        self.register_module(name, namespace.clone());
        if let Err(err) = compile_script(&script, &namespace, self) {
            self.modules().remove(name);
            namespace.clear();
            return Err(HostError::new(
                HostErrorKind::Import,
                format!("Error while importing '{}': {}", name, err),
            ));
        }
        info!("loaded module {} from {}", name, file.display());
        Ok(namespace)
    }
}

impl HostRuntime for ScriptHost {
    fn prepare(&self, namespace: &Namespace) -> Result<(), HostError> {
        if !namespace.contains(Self::BUILTINS_KEY) {
            let builtins = Namespace::new("builtins");
            for func in BUILTINS {
                builtins.set(func.name, Value::Function(*func));
            }
            namespace.set(Self::BUILTINS_KEY, Value::Module(builtins));
        }
        Ok(())
    }

    fn exec(&self, code: &str, namespace: &Namespace) -> Result<(), HostError> {
        let statements = parse_host_program(code)?;
        let scope = HostScope { namespace };
        for stmt in statements {
            let compiled = compile_expr(&stmt.value.expr);
            let value = evaluate(&compiled, &scope)
                .map_err(|e| HostError::new(HostErrorKind::from(&e), e.to_string()).with_line(stmt.line))?;
            debug!("{}: {} = {:?}", namespace.name(), stmt.target, value);
            namespace.set(stmt.target, value);
        }
        Ok(())
    }

    fn import(&self, statement: &str, namespace: &Namespace) -> Result<(), HostError> {
        match parse_import(statement)? {
            ImportSpec::Module { path, alias } => {
                let module = self.load_module(&path)?;
                let bound = alias.or_else(|| path.parts.last().cloned()).unwrap_or_default();
                namespace.set(bound, Value::Module(module));
            }
            ImportSpec::Names { module, names } => {
                let source = self.load_module(&module)?;
                for (name, alias) in names {
                    let value = source.get(&name).ok_or_else(|| {
                        HostError::new(
                            HostErrorKind::Import,
                            format!("cannot import name '{}' from '{}'", name, module),
                        )
                    })?;
                    namespace.set(alias.unwrap_or(name), value);
                }
            }
        }
        Ok(())
    }
}
