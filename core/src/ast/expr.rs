use pest::iterators::Pair;

use crate::script::Script;

use super::err::SyntaxError;
use super::kind::{BinaryOperator, Expr, Literal, UnaryOperator};
use super::rules::{self, Rule};

/// Converts any expression-level pair into an `Expr` tree.
pub(crate) fn parse_expression(pair: Pair<Rule>, script: &Script) -> Result<Expr, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    match pair.as_rule() {
        Rule::expression => {
            let mut inner = pair.into_inner();
            let next = rules::fetch_next_pair(&mut inner, &location, "an expression")?;
            parse_expression(next, script)
        }
        Rule::or_expr | Rule::and_expr | Rule::comparison | Rule::additive | Rule::multiplicative => {
            parse_binary_chain(pair, script)
        }
        Rule::not_expr => {
            let mut inner = pair.into_inner();
            let first = rules::fetch_next_pair(&mut inner, &location, "an operand")?;
            if first.as_rule() == Rule::not_op {
                let operand = rules::fetch_next_pair(&mut inner, &location, "an operand of 'not'")?;
                Ok(Expr::Unary {
                    op: UnaryOperator::Not,
                    expr: Box::new(parse_expression(operand, script)?),
                })
            } else {
                parse_expression(first, script)
            }
        }
        Rule::unary => {
            let mut inner = pair.into_inner();
            let first = rules::fetch_next_pair(&mut inner, &location, "an operand")?;
            if first.as_rule() == Rule::sign_op {
                let op = if first.as_str() == "-" { UnaryOperator::Minus } else { UnaryOperator::Plus };
                let operand = rules::fetch_next_pair(&mut inner, &location, "a signed operand")?;
                Ok(Expr::Unary {
                    op,
                    expr: Box::new(parse_expression(operand, script)?),
                })
            } else {
                parse_expression(first, script)
            }
        }
        Rule::postfix => parse_postfix(pair, script),
        Rule::integer => pair
            .as_str()
            .parse::<i64>()
            .map(|v| Expr::Literal(Literal::Int(v)))
            .map_err(|e| SyntaxError::new(format!("Invalid integer literal: {}", e), location)),
        Rule::float => pair
            .as_str()
            .parse::<f64>()
            .map(|v| Expr::Literal(Literal::Float(v)))
            .map_err(|e| SyntaxError::new(format!("Invalid float literal: {}", e), location)),
        Rule::string => Ok(Expr::Literal(Literal::Str(rules::string_value(pair)))),
        Rule::boolean => Ok(Expr::Literal(Literal::Bool(pair.as_str() == "true"))),
        Rule::null => Ok(Expr::Literal(Literal::Null)),
        Rule::list => {
            let items = pair
                .into_inner()
                .map(|p| parse_expression(p, script))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::List(items))
        }
        Rule::identifier => Ok(Expr::Name(pair.as_str().to_string())),
        _ => Err(rules::unexpected(&pair, script, "expression")),
    }
}

/// Folds `operand (op operand)*` left-associatively.
fn parse_binary_chain(pair: Pair<Rule>, script: &Script) -> Result<Expr, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let first = rules::fetch_next_pair(&mut inner, &location, "a left-hand operand")?;
    let mut node = parse_expression(first, script)?;

    while let Some(op_pair) = inner.next() {
        let op = BinaryOperator::from_token(op_pair.as_str().trim()).ok_or_else(|| {
            SyntaxError::new(
                format!("Invalid operator '{}'.", op_pair.as_str()),
                rules::get_location_from_pair(&op_pair, script),
            )
        })?;
        let right_pair = rules::fetch_next_pair(
            &mut inner,
            &location,
            &format!("a right-hand operand for '{}'", op.token()),
        )?;
        let right = parse_expression(right_pair, script)?;
        node = Expr::Binary {
            left: Box::new(node),
            op,
            right: Box::new(right),
        };
    }
    Ok(node)
}

fn parse_postfix(pair: Pair<Rule>, script: &Script) -> Result<Expr, SyntaxError> {
    let location = rules::get_location_from_pair(&pair, script);
    let mut inner = pair.into_inner();
    let primary = rules::fetch_next_pair(&mut inner, &location, "a primary expression")?;
    let mut node = parse_expression(primary, script)?;

    for suffix in inner {
        node = match suffix.as_rule() {
            Rule::call_args => {
                let args = suffix
                    .into_inner()
                    .map(|p| parse_expression(p, script))
                    .collect::<Result<Vec<_>, _>>()?;
                Expr::Call {
                    func: Box::new(node),
                    args,
                }
            }
            Rule::member => {
                let member_location = rules::get_location_from_pair(&suffix, script);
                let mut parts = suffix.into_inner();
                let attr = rules::fetch_next_pair(&mut parts, &member_location, "an attribute name")?;
                Expr::Attribute {
                    value: Box::new(node),
                    attr: attr.as_str().to_string(),
                }
            }
            _ => return Err(rules::unexpected(&suffix, script, "postfix expression")),
        };
    }
    Ok(node)
}
