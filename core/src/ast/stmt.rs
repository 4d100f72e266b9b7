//! Builders that turn pest pairs for modules and declaration bodies into
//! `AstNode` trees.
use pest::iterators::Pair;

use crate::script::Script;

use super::err::SyntaxError;
use super::expr::parse_expression;
use super::kind::{binding_operator_symbol, AstNodeKind, Binding, BoundExpr, SymbolPath};
use super::node::AstNode;
use super::rules::{self, Rule};

pub(crate) fn parse_module_rule(pair: Pair<Rule>, script: &Script) -> Result<AstNode, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut doc = None;
    let mut body = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::docstring => doc = Some(parse_docstring(item)),
            Rule::import_stmt => {
                let loc = rules::get_location_from_pair(&item, script);
                body.push(AstNode::new(
                    AstNodeKind::Import {
                        code: item.as_str().to_string(),
                    },
                    Some(loc),
                ));
            }
            Rule::host_block => body.push(parse_host_block(item, script)?),
            Rule::declaration => body.push(parse_declaration_rule(item, script)?),
            Rule::EOI => {}
            _ => return Err(rules::unexpected(&item, script, "module")),
        }
    }

    Ok(AstNode::new(AstNodeKind::Module { doc, body }, Some(location)))
}

fn parse_docstring(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::string)
        .map(rules::string_value)
        .unwrap_or_default()
}

fn parse_host_block(pair: Pair<Rule>, script: &Script) -> Result<AstNode, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let code = rules::fetch_next_pair(&mut inner, &location, "host code")?;
    Ok(AstNode::new(
        AstNodeKind::HostBlock {
            code: code.as_str().to_string(),
        },
        Some(location),
    ))
}

/// `Name(Base) { "doc"; body... }`
pub(crate) fn parse_declaration_rule(pair: Pair<Rule>, script: &Script) -> Result<AstNode, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let name = rules::fetch_next_pair(&mut inner, &location, "a declaration name")?;
    let base = rules::fetch_next_pair(&mut inner, &location, "a base name")?;

    let mut doc = None;
    let mut items = Vec::new();
    for item in inner {
        if item.as_rule() == Rule::docstring {
            doc = Some(parse_docstring(item));
        } else {
            items.push(item);
        }
    }
    let (identifier, body) = parse_body(items, script)?;

    Ok(AstNode::new(
        AstNodeKind::Declaration {
            name: name.as_str().to_string(),
            base: SymbolPath::parse(base.as_str()),
            identifier,
            doc,
            body,
        },
        Some(location),
    ))
}

fn parse_instantiation_rule(pair: Pair<Rule>, script: &Script) -> Result<AstNode, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let name = rules::fetch_next_pair(&mut inner, &location, "a component name")?;
    let (identifier, body) = parse_body(inner.collect(), script)?;

    Ok(AstNode::new(
        AstNodeKind::Instantiation {
            name: SymbolPath::parse(name.as_str()),
            identifier,
            body,
        },
        Some(location),
    ))
}

/// Splits a body into its `id:` statement and the remaining child nodes.
fn parse_body(items: Vec<Pair<Rule>>, script: &Script) -> Result<(Option<String>, Vec<AstNode>), SyntaxError> {
    let mut identifier: Option<String> = None;
    let mut body = Vec::new();

    for item in items {
        match item.as_rule() {
            Rule::id_stmt => {
                let location = rules::get_location_from_pair(&item, script);
                let mut parts = rules::significant(item.into_inner());
                let name = rules::fetch_next_pair(&mut parts, &location, "an identifier")?;
                if let Some(existing) = &identifier {
                    return Err(SyntaxError::new(
                        format!("Identifier already set to '{}'.", existing),
                        location,
                    ));
                }
                identifier = Some(name.as_str().to_string());
            }
            Rule::binding => body.push(parse_binding_rule(item, script)?),
            Rule::attr_decl => body.push(parse_attr_decl_rule(item, script)?),
            Rule::instantiation => body.push(parse_instantiation_rule(item, script)?),
            _ => return Err(rules::unexpected(&item, script, "declaration body")),
        }
    }
    Ok((identifier, body))
}

fn make_binding(
    op_pair: Pair<Rule>,
    expr_pair: Pair<Rule>,
    script: &Script,
) -> Result<Binding, SyntaxError> {
    let op = binding_operator_symbol(op_pair.as_str()).ok_or_else(|| {
        SyntaxError::new(
            format!("Unknown binding operator '{}'.", op_pair.as_str()),
            rules::get_location_from_pair(&op_pair, script),
        )
    })?;
    let source = expr_pair.as_str().trim().to_string();
    let expr = parse_expression(expr_pair, script)?;
    Ok(Binding {
        op: op.to_string(),
        expr: BoundExpr { source, expr },
    })
}

/// `name op expression;`
fn parse_binding_rule(pair: Pair<Rule>, script: &Script) -> Result<AstNode, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let name = rules::fetch_next_pair(&mut inner, &location, "an attribute name")?;
    let op = rules::fetch_next_pair(&mut inner, &location, "a binding operator")?;
    let expr = rules::fetch_next_pair(&mut inner, &location, "an expression")?;
    let binding = make_binding(op, expr, script)?;

    Ok(AstNode::new(
        AstNodeKind::AttributeBinding {
            name: name.as_str().to_string(),
            binding,
        },
        Some(location),
    ))
}

/// `attr name [: Type] [op expression];` or the `event` equivalent.
fn parse_attr_decl_rule(pair: Pair<Rule>, script: &Script) -> Result<AstNode, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner().peekable();
    let kind = rules::fetch_next_pair(&mut inner, &location, "'attr' or 'event'")?;
    let name = rules::fetch_next_pair(&mut inner, &location, "an attribute name")?;
    let name = name.as_str().to_string();

    let mut type_name = None;
    if let Some(next) = inner.peek() {
        if next.as_rule() == Rule::dotted_name {
            type_name = Some(SymbolPath::parse(next.as_str()));
            inner.next();
        }
    }

    let mut default = None;
    if let Some(op) = inner.next() {
        let expr = rules::fetch_next_pair(&mut inner, &location, "a default expression")?;
        let binding = make_binding(op, expr, script)?;
        default = Some(Box::new(AstNode::new(
            AstNodeKind::AttributeBinding {
                name: name.clone(),
                binding,
            },
            Some(location.clone()),
        )));
    }

    Ok(AstNode::new(
        AstNodeKind::AttributeDeclaration {
            name,
            type_name,
            is_event: kind.as_str() == "event",
            default,
        },
        Some(location),
    ))
}
