use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;

use crate::location::Location;
use crate::script::Script;

use super::err::SyntaxError;

#[derive(Parser)]
#[grammar = "grammar.pest"]
pub struct RulesParser;

pub(crate) fn fetch_next_pair<'a, I>(
    pairs: &mut I,
    location: &Location,
    expected: &str,
) -> Result<Pair<'a, Rule>, SyntaxError>
where
    I: Iterator<Item = Pair<'a, Rule>>,
{
    match pairs.next() {
        Some(pair) => Ok(pair),
        None => Err(SyntaxError::new(
            format!("Expected {} but found nothing.", expected),
            location.clone(),
        )),
    }
}

/// Skips keyword tokens, which the grammar keeps as pairs so they can
/// enforce word boundaries.
pub(crate) fn significant(pairs: Pairs<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pairs.filter(|p| !matches!(p.as_rule(), Rule::kw_import | Rule::kw_from | Rule::kw_as | Rule::kw_id))
}

pub(crate) fn get_location_from_pair(pair: &Pair<Rule>, script: &Script) -> Location {
    let (line, column) = pair.as_span().start_pos().line_col();
    Location::new(script.name.clone(), line, column)
}

pub(crate) fn unexpected(pair: &Pair<Rule>, script: &Script, context: &str) -> SyntaxError {
    SyntaxError::new(
        format!("Unexpected {:?} in {}.", pair.as_rule(), context),
        get_location_from_pair(pair, script),
    )
}

/// Decodes the body of a string literal, resolving backslash escapes.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Returns the decoded contents of a `string` pair.
pub(crate) fn string_value(pair: Pair<Rule>) -> String {
    match pair.into_inner().next() {
        Some(inner) => unescape(inner.as_str()),
        None => String::new(),
    }
}
