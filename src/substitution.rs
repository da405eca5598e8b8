//! Monomial substitution rules and normalization.
//!
//! A rule rewrites every occurrence of a pattern word inside a monomial with a
//! replacement polynomial. Occurrences are found on the expanded letter
//! sequence, so a pattern may consume part of a power: with the rule
//! `X0^2 -> X0`, the monomial `X1*X0^3` contains the pattern and rewrites to
//! `X1*X0*X0 = X1*X0^2`.
//!
//! Normalization applies every rule once per pass, in insertion order, and
//! repeats passes until a full pass leaves the term unchanged. Both the number
//! of passes and the degree of intermediate terms are bounded; a rule set that
//! keeps rewriting or keeps growing a term is reported as
//! [`RelaxationError::NotConverged`].

use crate::error::{RelaxationError, Result};
use crate::term::{Term, Var, Word};
use tracing::debug;

/// Pass ceiling used by [`Substitutions::normalize`].
pub const DEFAULT_MAX_REWRITE_PASSES: usize = 1024;

/// Largest degree an intermediate term may reach during normalization.
pub const DEFAULT_MAX_REWRITE_DEGREE: u32 = 4096;

/// A single rewrite `pattern -> replacement`.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pattern: Term,
    pattern_word: Word,
    replacement: Term,
}

/// Where a pattern occurs inside a word.
struct Occurrence {
    /// Index of the first run touched by the pattern
    start: usize,
    /// Exponent of the first run left in front of the occurrence
    left_rest: u32,
    /// Index one past the last run touched by the pattern
    end: usize,
    /// Exponent of the last run left behind the occurrence
    right_rest: u32,
}

impl Rule {
    /// Create a rule; the pattern must be a coefficient-one word of degree at least 1.
    pub fn new(pattern: Term, replacement: Term) -> Result<Self> {
        let pattern_word = match pattern.word() {
            Some(word) if !word.is_empty() && pattern.coefficient() == 1.0 => word,
            _ => {
                return Err(RelaxationError::InvalidPattern {
                    pattern: pattern.to_string(),
                })
            }
        };
        Ok(Rule {
            pattern,
            pattern_word,
            replacement,
        })
    }

    /// The pattern side of the rule.
    pub fn pattern(&self) -> &Term {
        &self.pattern
    }

    /// The replacement side of the rule.
    pub fn replacement(&self) -> &Term {
        &self.replacement
    }

    /// Rewrite every non-overlapping occurrence of the pattern, left to right.
    pub fn apply(&self, term: &Term) -> Term {
        self.apply_within(term, u32::MAX).unwrap_or_else(|| term.clone())
    }

    /// [`Rule::apply`], giving up with `None` as soon as the rewritten term
    /// exceeds `max_degree`.
    fn apply_within(&self, term: &Term, max_degree: u32) -> Option<Term> {
        match term {
            Term::Numeric(_) => Some(term.clone()),
            Term::Sum(items) => {
                let rewritten = items
                    .iter()
                    .map(|item| self.apply_within(item, max_degree))
                    .collect::<Option<Vec<_>>>()?;
                Some(Term::from_summands(rewritten))
            }
            monomial => {
                let (coefficient, word) = monomial.split_coefficient();
                let word = word.word().unwrap_or_default();
                match self.rewrite_word(&word, max_degree)? {
                    Some(rewritten) => Some(rewritten.scale(coefficient)),
                    None => Some(term.clone()),
                }
            }
        }
    }

    /// `Some(None)` when the pattern does not occur in `word`, `None` when the
    /// rewritten prefix grows past `max_degree`.
    fn rewrite_word(&self, word: &[(Var, u32)], max_degree: u32) -> Option<Option<Term>> {
        let mut rest: Word = word.to_vec();
        let mut rewritten: Option<Term> = None;

        // Scanning resumes behind each replaced occurrence.
        while let Some(occurrence) = (0..rest.len()).find_map(|start| self.match_at(&rest, start)) {
            let mut prefix: Word = rest[..occurrence.start].to_vec();
            if occurrence.left_rest > 0 {
                prefix.push((rest[occurrence.start].0, occurrence.left_rest));
            }
            let mut suffix = Word::new();
            if occurrence.right_rest > 0 {
                suffix.push((rest[occurrence.end - 1].0, occurrence.right_rest));
            }
            suffix.extend_from_slice(&rest[occurrence.end..]);

            let piece = Term::from_word(1.0, prefix).mul_ref(&self.replacement);
            let acc = match rewritten {
                Some(acc) => acc.mul_ref(&piece),
                None => piece,
            };
            if acc.degree() > max_degree {
                return None;
            }
            rewritten = Some(acc);
            rest = suffix;
        }

        let tail = Term::from_word(1.0, rest);
        let rewritten = rewritten.map(|acc| acc.mul_ref(&tail));
        match &rewritten {
            Some(acc) if acc.degree() > max_degree => None,
            _ => Some(rewritten),
        }
    }

    fn match_at(&self, word: &[(Var, u32)], start: usize) -> Option<Occurrence> {
        let pattern = &self.pattern_word;
        let last = pattern.len() - 1;
        if start + last >= word.len() {
            return None;
        }

        let (first_var, first_exp) = pattern[0];
        let (var, exp) = word[start];
        if var != first_var || exp < first_exp {
            return None;
        }

        if last == 0 {
            // Leftmost occurrence inside the run
            return Some(Occurrence {
                start,
                left_rest: 0,
                end: start + 1,
                right_rest: exp - first_exp,
            });
        }

        // Runs are maximal, so interior factors must match exactly.
        for k in 1..last {
            if word[start + k] != pattern[k] {
                return None;
            }
        }

        let (last_var, last_exp) = pattern[last];
        let (var, end_exp) = word[start + last];
        if var != last_var || end_exp < last_exp {
            return None;
        }

        Some(Occurrence {
            start,
            left_rest: exp - first_exp,
            end: start + last + 1,
            right_rest: end_exp - last_exp,
        })
    }
}

/// An ordered set of substitution rules.
#[derive(Clone, Debug, PartialEq)]
pub struct Substitutions {
    rules: Vec<Rule>,
    max_degree: u32,
}

impl Default for Substitutions {
    fn default() -> Self {
        Self::new()
    }
}

impl Substitutions {
    /// An empty rule set.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            max_degree: DEFAULT_MAX_REWRITE_DEGREE,
        }
    }

    /// Set the largest degree a term may reach while being normalized.
    pub fn with_max_degree(mut self, max_degree: u32) -> Self {
        self.max_degree = max_degree;
        self
    }

    /// Degree bound applied during normalization.
    pub fn max_degree(&self) -> u32 {
        self.max_degree
    }

    /// Add `pattern -> replacement`.
    ///
    /// A rule with the same pattern is replaced in place, keeping its position.
    pub fn insert(&mut self, pattern: Term, replacement: Term) -> Result<()> {
        let rule = Rule::new(pattern, replacement)?;
        match self.rules.iter_mut().find(|r| r.pattern == rule.pattern) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
        Ok(())
    }

    /// Builder form of [`Substitutions::insert`].
    pub fn with_rule(mut self, pattern: Term, replacement: Term) -> Result<Self> {
        self.insert(pattern, replacement)?;
        Ok(self)
    }

    /// The rules in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Normalize with the default pass ceiling.
    pub fn normalize(&self, term: &Term) -> Result<Term> {
        self.normalize_bounded(term, DEFAULT_MAX_REWRITE_PASSES)
    }

    /// Apply all rules repeatedly until a pass changes nothing.
    ///
    /// Fails with [`RelaxationError::NotConverged`] if no fixed point is reached
    /// within `max_passes` passes, or as soon as a rewrite produces a term whose
    /// degree exceeds [`Substitutions::max_degree`]. Every occurrence consumes at
    /// least one letter, so a pass over a term within the bound does bounded work.
    pub fn normalize_bounded(&self, term: &Term, max_passes: usize) -> Result<Term> {
        if self.rules.is_empty() {
            return Ok(term.clone());
        }
        let not_converged = |passes: usize| RelaxationError::NotConverged {
            passes,
            monomial: term.to_string(),
        };

        let mut current = term.clone();
        for pass in 0..max_passes {
            let next = self.rules.iter().try_fold(current.clone(), |acc, rule| {
                rule.apply_within(&acc, self.max_degree)
            });
            let next = match next {
                Some(next) => next,
                None => {
                    debug!(pass, max_degree = self.max_degree, "rewrite exceeded degree limit");
                    return Err(not_converged(pass + 1));
                }
            };
            if next == current {
                return Ok(current);
            }
            current = next;
        }
        Err(not_converged(max_passes))
    }
}
