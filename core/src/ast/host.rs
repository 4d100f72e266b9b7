//! Parsing for the code the host runtime executes: `HostBlock` statements
//! and `Import` statements.
use pest::Parser;
use pest::iterators::Pair;
use serde::{Deserialize, Serialize};

use crate::location::Location;
use crate::script::Script;

use super::err::SyntaxError;
use super::expr::parse_expression;
use super::kind::{BoundExpr, SymbolPath};
use super::rules::{self, Rule, RulesParser};

/// `target = expression;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostStatement {
    pub target: String,
    pub value: BoundExpr,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportSpec {
    /// `import a.b [as c];`
    Module { path: SymbolPath, alias: Option<String> },
    /// `from a.b import x [as y], z;`
    Names { module: SymbolPath, names: Vec<(String, Option<String>)> },
}

pub fn parse_host_program(code: &str) -> Result<Vec<HostStatement>, SyntaxError> {
    let script = Script::from_source("<host>", code);
    let mut pairs = RulesParser::parse(Rule::host_program, code)
        .map_err(|e| SyntaxError::from_pest(e, &script.name))?;
    let location = Location::new(script.name.clone(), 1, 1);
    let program = rules::fetch_next_pair(&mut pairs, &location, "host statements")?;

    let mut statements = Vec::new();
    for stmt in program.into_inner() {
        match stmt.as_rule() {
            Rule::host_stmt => statements.push(parse_host_stmt(stmt, &script)?),
            Rule::EOI => {}
            _ => return Err(rules::unexpected(&stmt, &script, "host code")),
        }
    }
    Ok(statements)
}

fn parse_host_stmt(pair: Pair<Rule>, script: &Script) -> Result<HostStatement, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let target = rules::fetch_next_pair(&mut inner, &location, "an assignment target")?;
    let expr = rules::fetch_next_pair(&mut inner, &location, "an expression")?;
    let source = expr.as_str().trim().to_string();
    Ok(HostStatement {
        target: target.as_str().to_string(),
        value: BoundExpr {
            source,
            expr: parse_expression(expr, script)?,
        },
        line: location.line,
    })
}

pub fn parse_import(code: &str) -> Result<ImportSpec, SyntaxError> {
    let script = Script::from_source("<import>", code);
    let mut pairs = RulesParser::parse(Rule::import_stmt, code.trim())
        .map_err(|e| SyntaxError::from_pest(e, &script.name))?;
    let location = Location::new(script.name.clone(), 1, 1);
    let stmt = rules::fetch_next_pair(&mut pairs, &location, "an import statement")?;
    let mut inner = stmt.into_inner();
    let form = rules::fetch_next_pair(&mut inner, &location, "an import form")?;

    match form.as_rule() {
        Rule::plain_import => {
            let mut parts = rules::significant(form.into_inner());
            let path = rules::fetch_next_pair(&mut parts, &location, "a module path")?;
            let alias = parts.next().map(alias_name);
            Ok(ImportSpec::Module {
                path: SymbolPath::parse(path.as_str()),
                alias,
            })
        }
        Rule::from_import => {
            let mut parts = rules::significant(form.into_inner());
            let module = rules::fetch_next_pair(&mut parts, &location, "a module path")?;
            let mut names = Vec::new();
            for import_name in parts {
                let mut name_parts = import_name.into_inner();
                let name = rules::fetch_next_pair(&mut name_parts, &location, "an imported name")?;
                names.push((name.as_str().to_string(), name_parts.next().map(alias_name)));
            }
            Ok(ImportSpec::Names {
                module: SymbolPath::parse(module.as_str()),
                names,
            })
        }
        _ => Err(rules::unexpected(&form, &script, "import")),
    }
}

fn alias_name(alias: Pair<Rule>) -> String {
    rules::significant(alias.into_inner())
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}
