//! Lightweight analysis of reaction rate expressions.
//!
//! Rate laws are simple sums and products, so they are handled as a flat token stream rather
//! than parsed into a tree. A token is classified as a species reference, a numeric literal,
//! or (by elimination) a parameter.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Algebraic operators and separators that delimit identifiers in a rate expression.
static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[+\-*/^()\[\]\s,;]").expect("Separator pattern is a valid regex.")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Species,
    Numeric,
    Parameter,
}

/// Split `expression` into its non-empty identifier/literal tokens.
pub fn tokenize(expression: &str) -> Vec<&str> {
    SEPARATOR
        .split(expression)
        .filter(|token| !token.is_empty())
        .collect()
}

/// Float literals only; `true`/`false` are never numbers.
pub fn is_numeric_literal(token: &str) -> bool {
    if token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("false") {
        return false;
    }
    token.parse::<f64>().is_ok()
}

pub fn classify(token: &str, species_names: &BTreeSet<&str>) -> TokenClass {
    if species_names.contains(token) {
        TokenClass::Species
    } else if is_numeric_literal(token) {
        TokenClass::Numeric
    } else {
        TokenClass::Parameter
    }
}

/// Parameter tokens of one expression, deduplicated in order of first appearance.
pub fn parameters_in<'e>(expression: &'e str, species_names: &BTreeSet<&str>) -> IndexSet<&'e str> {
    tokenize(expression)
        .into_iter()
        .filter(|token| classify(token, species_names) == TokenClass::Parameter)
        .collect()
}

/// Species tokens of one expression, deduplicated in order of first appearance.
pub fn species_in<'e>(expression: &'e str, species_names: &BTreeSet<&str>) -> IndexSet<&'e str> {
    tokenize(expression)
        .into_iter()
        .filter(|token| classify(token, species_names) == TokenClass::Species)
        .collect()
}

/// Replace every token equal to `old_name` with `new_name`, leaving separators (including
/// whitespace) untouched. Substrings of longer tokens are never replaced, so renaming `E`
/// leaves `ES` alone.
pub fn rename_in_expression(expression: &str, old_name: &str, new_name: &str) -> String {
    if old_name.is_empty() {
        return expression.to_string();
    }
    let mut renamed = String::with_capacity(expression.len());
    let mut cursor = 0;
    for separator in SEPARATOR.find_iter(expression) {
        push_token(
            &mut renamed,
            &expression[cursor..separator.start()],
            old_name,
            new_name,
        );
        renamed.push_str(separator.as_str());
        cursor = separator.end();
    }
    push_token(&mut renamed, &expression[cursor..], old_name, new_name);
    renamed
}

fn push_token(out: &mut String, token: &str, old_name: &str, new_name: &str) {
    if token == old_name {
        out.push_str(new_name);
    } else {
        out.push_str(token);
    }
}
