//! Noncommutative monomial bases.

use crate::error::Result;
use crate::substitution::Substitutions;
use crate::term::Term;
use num_traits::{One, Zero};
use std::collections::HashSet;

/// All words in `variables` of length at most `degree`, level by level.
///
/// The result starts with `1`, followed by the variables, followed by every
/// variable left-multiplied onto the previous level. No rewriting and no
/// deduplication happens here, so for `n` variables the length is
/// `1 + n + n^2 + ... + n^degree`.
pub fn raw_nc_monomials(variables: &[Term], degree: usize) -> Vec<Term> {
    let mut monomials = vec![Term::one()];
    if degree == 0 {
        return monomials;
    }
    let mut level: Vec<Term> = variables.to_vec();
    monomials.extend(level.iter().cloned());
    for _ in 1..degree {
        level = variables
            .iter()
            .flat_map(|v| level.iter().map(move |m| v.mul_ref(m)))
            .collect();
        monomials.extend(level.iter().cloned());
    }
    monomials
}

/// The monomial basis of a relaxation of order `degree`.
///
/// Each raw word is normalized under `substitutions` and stripped of its
/// coefficient; words that vanish are dropped and repeats are removed keeping
/// the first occurrence. Lower degrees therefore stay at the front, which
/// [`count_nc_monomials`] relies on.
pub fn nc_monomials(
    variables: &[Term],
    degree: usize,
    substitutions: &Substitutions,
    max_passes: usize,
) -> Result<Vec<Term>> {
    let mut seen = HashSet::new();
    let mut basis = Vec::new();
    for monomial in raw_nc_monomials(variables, degree) {
        let canonical = substitutions.normalize_bounded(&monomial, max_passes)?;
        if canonical.is_zero() {
            continue;
        }
        let (_, word) = canonical.split_coefficient();
        if seen.insert(word.clone()) {
            basis.push(word);
        }
    }
    Ok(basis)
}

/// Count the leading monomials of degree at most `degree`, stopping at the
/// first one that exceeds it.
pub fn count_nc_monomials(monomials: &[Term], degree: usize) -> usize {
    monomials
        .iter()
        .take_while(|m| m.degree() as usize <= degree)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x(i: u32) -> Term {
        Term::var(i)
    }

    #[test]
    fn test_degree_zero() {
        let vars = Term::symbols(3);
        let basis = nc_monomials(&vars, 0, &Substitutions::new(), 16).unwrap();
        assert_eq!(basis, vec![Term::one()]);
    }

    #[test]
    fn test_raw_length() {
        let vars = Term::symbols(2);
        assert_eq!(raw_nc_monomials(&vars, 1).len(), 3);
        assert_eq!(raw_nc_monomials(&vars, 2).len(), 7);
        assert_eq!(raw_nc_monomials(&vars, 3).len(), 15);

        let vars = Term::symbols(3);
        assert_eq!(raw_nc_monomials(&vars, 2).len(), 13);
    }

    #[test]
    fn test_order_is_left_multiplication() {
        let vars = Term::symbols(2);
        let basis = nc_monomials(&vars, 2, &Substitutions::new(), 16).unwrap();
        assert_eq!(
            basis,
            vec![
                Term::one(),
                x(0),
                x(1),
                x(0) * x(0),
                x(0) * x(1),
                x(1) * x(0),
                x(1) * x(1),
            ]
        );
    }

    #[test]
    fn test_substitution_collapses_basis() {
        let vars = Term::symbols(2);
        let subs = Substitutions::new().with_rule(x(0) * x(0), x(0)).unwrap();
        let basis = nc_monomials(&vars, 2, &subs, 16).unwrap();
        assert_eq!(
            basis,
            vec![Term::one(), x(0), x(1), x(0) * x(1), x(1) * x(0), x(1) * x(1)]
        );
        assert_eq!(count_nc_monomials(&basis, 1), 3);
        assert_eq!(count_nc_monomials(&basis, 0), 1);
        assert_eq!(count_nc_monomials(&basis, 2), 6);
    }

    #[test]
    fn test_signed_words_are_stripped() {
        // Anticommuting pair: X1*X0 = -X0*X1 is not a new basis element
        let vars = Term::symbols(2);
        let subs = Substitutions::new()
            .with_rule(x(1) * x(0), -(x(0) * x(1)))
            .unwrap();
        let basis = nc_monomials(&vars, 2, &subs, 16).unwrap();
        assert_eq!(basis.len(), 6);
        assert!(basis.contains(&(x(0) * x(1))));
        assert!(!basis.contains(&(x(1) * x(0))));
    }

    #[test]
    fn test_vanishing_words_are_dropped() {
        let vars = Term::symbols(2);
        let subs = Substitutions::new()
            .with_rule(x(0) * x(1), Term::zero())
            .unwrap();
        let basis = nc_monomials(&vars, 2, &subs, 16).unwrap();
        assert!(!basis.iter().any(|m| m.is_zero()));
        assert_eq!(basis.len(), 6);
    }
}
