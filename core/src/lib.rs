pub mod ast;
pub mod compiler;
pub mod error;
pub mod ir;
pub mod location;
pub mod runtime;
pub mod script;

pub use ast::{AstNode, AstNodeKind, RulesParser, generate_ast_from_source};
pub use compiler::{CompileError, HostCodeError, ModuleCompiler, compile_module, compile_script};
pub use error::{Level, ScenicErrorExt};
pub use ir::{InstructionSequence, UnhandledNodeError, lower_declaration};
pub use location::Location;
pub use runtime::{
    DeclarationWrapper, Factory, HostRuntime, IdentifierScope, Namespace, ScriptHost, Toolkit, Value, basic_toolkit,
};
pub use script::Script;

pub fn generate_error_report<E: ScenicErrorExt + ?Sized>(error: &E) -> String {
    let level = error.level();
    let location = match error.location() {
        Some(loc) => loc.to_string(),
        None => "unknown location".to_string(),
    };
    let message = error.message();

    format!("SCENIC | {} | {} | {} | {}", level, location, error.issuer(), message)
}

/// Parses and compiles `script` into a fresh namespace named after it.
pub fn load_script(script: &Script, host: &dyn HostRuntime) -> Result<Namespace, CompileError> {
    let namespace = Namespace::new(script.module_name());
    compile_script(script, &namespace, host)?;
    Ok(namespace)
}
