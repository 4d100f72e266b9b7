//! Syntax tree for scenic modules and the pest front end that builds it.
pub mod err;
pub mod expr;
pub mod host;
pub mod kind;
pub mod node;
pub mod rules;
pub mod stmt;

use pest::Parser;

pub use self::err::SyntaxError;
pub use self::host::{parse_host_program, parse_import, HostStatement, ImportSpec};
pub use self::kind::{
    AstNodeKind, BinaryOperator, Binding, BoundExpr, Expr, Literal, SymbolPath, UnaryOperator,
};
pub use self::node::AstNode;
pub use self::rules::{Rule, RulesParser};

use crate::script::Script;

/// Parses a whole script into a `Module` node.
pub fn generate_ast_from_source(script: &Script) -> Result<AstNode, SyntaxError> {
    let mut pairs = RulesParser::parse(Rule::module, &script.content)
        .map_err(|e| SyntaxError::from_pest(e, &script.name))?;
    let location = crate::location::Location::new(script.name.clone(), 1, 1);
    let module = rules::fetch_next_pair(&mut pairs, &location, "a module")?;
    let node = stmt::parse_module_rule(module, script)?;
    log::debug!("parsed {} into {} top-level nodes", script.name, node.kind.body().map_or(0, |b| b.len()));
    Ok(node)
}
