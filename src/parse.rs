//! Polynomial parsing from plain text
//!
//! Accepts sums of products such as `"2*A*B^2 - 0.5*B*A + 1"`. Factor order is
//! kept, since variables do not commute. Coefficients may use exponent
//! notation (`1e-3`); powers must be nonnegative integers.

use crate::error::{RelaxationError, Result};
use crate::term::{Term, Var};
use std::collections::HashMap;

/// Parse `text` over the variables `names`, where `names[i]` is `X{i}`.
pub fn parse_polynomial<S: AsRef<str>>(text: &str, names: &[S]) -> Result<Term> {
    let var_map = variable_map(names)?;
    let summands = split_summands(text)?;
    if summands.is_empty() {
        return Err(RelaxationError::parse(text, "empty polynomial"));
    }
    let mut terms = Vec::with_capacity(summands.len());
    for (sign, summand) in summands {
        terms.push(parse_monomial(text, summand, sign, &var_map)?);
    }
    Ok(Term::from_summands(terms))
}

/// Map variable names to their indices, rejecting blanks and duplicates
pub(crate) fn variable_map<S: AsRef<str>>(names: &[S]) -> Result<HashMap<&str, u32>> {
    let mut var_map = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        let name = name.as_ref();
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !valid {
            return Err(RelaxationError::parse(name, "invalid variable name"));
        }
        if var_map.insert(name, i as u32).is_some() {
            return Err(RelaxationError::parse(name, "duplicate variable name"));
        }
    }
    Ok(var_map)
}

/// Whether a `+`/`-` continues the exponent of a number such as `1e-3`
fn is_exponent_sign(factor: &str) -> bool {
    let factor = factor.trim();
    match factor.strip_suffix(['e', 'E']) {
        Some(mantissa) => {
            mantissa.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                && mantissa.parse::<f64>().is_ok()
        }
        None => false,
    }
}

/// Split into signed summands at top-level `+` and `-`
fn split_summands(text: &str) -> Result<Vec<(f64, &str)>> {
    let mut summands = Vec::new();
    let mut start = 0;
    let mut sign = 1.0;
    // a sign has been read and still waits for its summand
    let mut signed = false;
    for (i, c) in text.char_indices() {
        if c != '+' && c != '-' {
            continue;
        }
        let current = &text[start..i];
        if is_exponent_sign(current.rsplit('*').next().unwrap_or(current)) {
            continue;
        }
        let current = current.trim();
        if current.is_empty() {
            if signed {
                return Err(RelaxationError::parse(text, "repeated sign"));
            }
        } else {
            summands.push((sign, current));
        }
        sign = if c == '+' { 1.0 } else { -1.0 };
        signed = true;
        start = i + 1;
    }
    let last = text[start..].trim();
    if last.is_empty() {
        if signed {
            return Err(RelaxationError::parse(text, "dangling sign"));
        }
    } else {
        summands.push((sign, last));
    }
    Ok(summands)
}

fn parse_monomial(
    text: &str,
    summand: &str,
    sign: f64,
    var_map: &HashMap<&str, u32>,
) -> Result<Term> {
    let mut coefficient = sign;
    let mut word: Vec<(Var, u32)> = Vec::new();
    for factor in summand.split('*').map(str::trim) {
        if factor.is_empty() {
            return Err(RelaxationError::parse(text, "missing factor"));
        }
        if factor.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
            let value: f64 = factor
                .parse()
                .map_err(|_| RelaxationError::parse(text, format!("invalid number {factor:?}")))?;
            coefficient *= value;
            continue;
        }
        let (name, power) = match factor.split_once('^') {
            Some((name, power)) => {
                let power: u32 = power.trim().parse().map_err(|_| {
                    RelaxationError::parse(text, format!("invalid power in {factor:?}"))
                })?;
                (name.trim(), power)
            }
            None => (factor, 1),
        };
        let index = var_map
            .get(name)
            .ok_or_else(|| RelaxationError::parse(text, format!("unknown variable {name:?}")))?;
        word.push((Var(*index), power));
    }
    Ok(Term::from_word(coefficient, word))
}
