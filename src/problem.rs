//! Optimization problems and their JSON description
//!
//! A [`Problem`] is the in-memory input of a relaxation. A [`ProblemFile`] is
//! the same problem written with variable names and polynomial strings, plus
//! substitution rules and optional generator settings:
//!
//! ```json
//! {
//!   "variables": ["A", "B"],
//!   "objective": "A*B + B*A",
//!   "inequalities": ["B - B^2"],
//!   "equalities": [],
//!   "substitutions": [{"pattern": "A^2", "replacement": "A"}],
//!   "order": 1,
//!   "config": {"discovery": "row_major"}
//! }
//! ```

use crate::error::{RelaxationError, Result};
use crate::parse::{parse_polynomial, variable_map};
use crate::relaxation::{RelaxationConfig, SdpRelaxation};
use crate::substitution::Substitutions;
use crate::term::Term;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// A noncommutative polynomial optimization problem
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    /// Generating variables, in order
    pub variables: Vec<Term>,
    /// Polynomial to minimize
    pub objective: Term,
    /// Constraints `g >= 0`
    pub inequalities: Vec<Term>,
    /// Constraints `h = 0`
    pub equalities: Vec<Term>,
    /// Relaxation order, at least 1
    pub order: usize,
}

impl Problem {
    /// An unconstrained problem
    pub fn new(variables: Vec<Term>, objective: Term, order: usize) -> Self {
        Problem {
            variables,
            objective,
            inequalities: Vec::new(),
            equalities: Vec::new(),
            order,
        }
    }

    /// Add an inequality `g >= 0`
    pub fn with_inequality(mut self, g: Term) -> Self {
        self.inequalities.push(g);
        self
    }

    /// Add several inequalities
    pub fn with_inequalities<I: IntoIterator<Item = Term>>(mut self, gs: I) -> Self {
        self.inequalities.extend(gs);
        self
    }

    /// Add an equality `h = 0`
    pub fn with_equality(mut self, h: Term) -> Self {
        self.equalities.push(h);
        self
    }

    /// Add several equalities
    pub fn with_equalities<I: IntoIterator<Item = Term>>(mut self, hs: I) -> Self {
        self.equalities.extend(hs);
        self
    }
}

/// A substitution rule written as text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionSpec {
    /// Monomial to replace
    pub pattern: String,
    /// Replacement polynomial
    pub replacement: String,
}

/// A problem as stored on disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemFile {
    /// Variable names; the i-th name is variable `X{i}`
    pub variables: Vec<String>,
    /// Objective polynomial
    pub objective: String,
    /// Inequalities `g >= 0`
    #[serde(default)]
    pub inequalities: Vec<String>,
    /// Equalities `h = 0`
    #[serde(default)]
    pub equalities: Vec<String>,
    /// Substitution rules, applied in order
    #[serde(default)]
    pub substitutions: Vec<SubstitutionSpec>,
    /// Relaxation order
    pub order: usize,
    /// Generator settings
    #[serde(default)]
    pub config: RelaxationConfig,
}

impl ProblemFile {
    /// Parse a problem from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a problem from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading problem from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse all polynomials into a [`Problem`] and its substitution rules.
    pub fn build(&self) -> Result<(Problem, Substitutions)> {
        variable_map(&self.variables)?;
        let parse = |text: &String| parse_polynomial(text, &self.variables);

        let mut substitutions = Substitutions::new();
        for rule in &self.substitutions {
            let pattern = parse(&rule.pattern)?;
            let replacement = parse(&rule.replacement)?;
            substitutions.insert(pattern, replacement)?;
        }

        let problem = Problem {
            variables: Term::symbols(self.variables.len()),
            objective: parse(&self.objective)?,
            inequalities: self.inequalities.iter().map(parse).collect::<Result<_>>()?,
            equalities: self.equalities.iter().map(parse).collect::<Result<_>>()?,
            order: self.order,
        };
        if problem.variables.is_empty() {
            return Err(RelaxationError::parse(&self.objective, "problem has no variables"));
        }
        Ok((problem, substitutions))
    }

    /// Build and run the relaxation described by this file
    pub fn relax(&self) -> Result<SdpRelaxation> {
        let (problem, substitutions) = self.build()?;
        let mut relaxation = SdpRelaxation::with_config(substitutions, self.config.clone());
        relaxation.get_relaxation(&problem)?;
        Ok(relaxation)
    }
}
