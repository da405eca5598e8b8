//! NPA relaxation of a noncommutative polynomial optimization problem
//!
//! This module turns a [`Problem`] into a sparse semidefinite program in the
//! shape the SDPA format expects.
//!
//! ## Construction Overview
//!
//! 1. Build the monomial basis of the requested order, modulo substitutions
//! 2. Emit the normalization block, which pins the moment of `1` to one
//! 3. Fill the moment matrix; every canonical monomial gets one decision
//!    variable, registered in the [`MonomialDictionary`] by the first cell that
//!    produces it
//! 4. Express the objective densely in those decision variables
//! 5. Emit one localizing block per inequality, with equalities expanded into
//!    opposite inequality pairs
//!
//! Cells are independent, so steps 3 and 5 run on a bounded rayon pool. With
//! [`DiscoveryOrder::RowMajor`] canonical forms are computed in parallel but
//! registered in row-major order, which makes the output reproducible. With
//! [`DiscoveryOrder::Concurrent`] workers race on the dictionary; the SDP is
//! equivalent but decision-variable numbering may vary between runs.
//!
//! ## Example
//!
//! ```
//! use ncpol_sdpa::{Problem, SdpRelaxation, Substitutions, Term};
//!
//! let x = Term::symbols(2);
//! let subs = Substitutions::new()
//!     .with_rule(x[0].pow(2), x[0].clone())
//!     .unwrap();
//! let objective = x[0].mul_ref(&x[1]) + x[1].mul_ref(&x[0]);
//! let problem = Problem::new(x.clone(), objective, 1)
//!     .with_inequality(x[1].clone() - x[1].pow(2));
//!
//! let mut relaxation = SdpRelaxation::new(subs);
//! relaxation.get_relaxation(&problem).unwrap();
//! assert_eq!(relaxation.block_struct(), &[-2, 3, 1]);
//! ```

pub mod dictionary;
pub mod localizing;
pub mod matrix;
pub mod moment;
pub mod objective;

pub use dictionary::{MonomialDictionary, Position};
pub use matrix::{linear_index, Entry, SparseEntries};

use crate::basis::{count_nc_monomials, nc_monomials};
use crate::error::{RelaxationError, Result};
use crate::problem::Problem;
use crate::substitution::{Substitutions, DEFAULT_MAX_REWRITE_PASSES};
use crate::term::Term;
use num_traits::Zero;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Highest constraint degree a localizing block over degree `order - 1`
/// monomials can express with moment-matrix variables.
pub const MAX_CONSTRAINT_DEGREE: u32 = 2;

/// How workers register new monomials in the dictionary
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryOrder {
    /// Register in row-major cell order; output is reproducible
    #[default]
    RowMajor,
    /// Register as workers finish; numbering may differ between runs
    Concurrent,
}

/// Configuration for relaxation generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaxationConfig {
    /// Maximum number of rewrite passes per normalization
    pub max_rewrite_passes: usize,

    /// Worker thread count; `None` uses the global rayon pool
    pub num_threads: Option<usize>,

    /// Dictionary registration order
    pub discovery: DiscoveryOrder,
}

impl RelaxationConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        RelaxationConfig {
            max_rewrite_passes: DEFAULT_MAX_REWRITE_PASSES,
            num_threads: None,
            discovery: DiscoveryOrder::RowMajor,
        }
    }

    /// Set the rewrite pass ceiling
    pub fn with_max_rewrite_passes(mut self, passes: usize) -> Self {
        self.max_rewrite_passes = passes;
        self
    }

    /// Bound the number of worker threads
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Set the dictionary registration order
    pub fn with_discovery(mut self, discovery: DiscoveryOrder) -> Self {
        self.discovery = discovery;
        self
    }

    fn build_pool(&self) -> Result<Option<ThreadPool>> {
        match self.num_threads {
            None => Ok(None),
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("ncpol-sdpa-{i}"))
                .build()
                .map(Some)
                .map_err(|e| RelaxationError::ThreadPool(e.to_string())),
        }
    }
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `op` inside `pool` when one is configured
fn install<R, F>(pool: Option<&ThreadPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Shared read-only state of one relaxation run
pub(crate) struct Assembly<'a> {
    pub(crate) monomials: &'a [Term],
    pub(crate) substitutions: &'a Substitutions,
    pub(crate) dictionary: &'a MonomialDictionary,
    pub(crate) max_passes: usize,
}

impl Assembly<'_> {
    pub(crate) fn n_monomials(&self) -> usize {
        self.monomials.len()
    }

    pub(crate) fn normalize(&self, term: &Term) -> Result<Term> {
        self.substitutions.normalize_bounded(term, self.max_passes)
    }

    /// Decompose a polynomial into `(decision variable, coefficient)` pairs.
    ///
    /// Every summand is canonicalized and looked up; summands that vanish are
    /// skipped and a canonical monomial the moment matrix never produced is an
    /// error. Pairs are returned unmerged, in summand order.
    pub(crate) fn facvar_terms<C>(&self, polynomial: &Term, context: C) -> Result<Vec<(usize, f64)>>
    where
        C: Fn() -> String,
    {
        let n = self.n_monomials();
        let mut terms = Vec::with_capacity(polynomial.summands().len());
        for summand in polynomial.summands() {
            let (coefficient, monomial) = summand.split_coefficient();
            let canonical = self.normalize(&monomial)?;
            if canonical.is_zero() {
                continue;
            }
            let (sign, key) = canonical.split_coefficient();
            let position = self
                .dictionary
                .get(&key)
                .ok_or_else(|| RelaxationError::unregistered(&key, context()))?;
            terms.push((linear_index(position, n), coefficient * sign));
        }
        Ok(terms)
    }
}

/// Generator of the NPA relaxation and its SDPA encoding
#[derive(Debug)]
pub struct SdpRelaxation {
    substitutions: Substitutions,
    config: RelaxationConfig,
    dictionary: MonomialDictionary,
    monomials: Vec<Term>,
    n_elements: usize,
    block_struct: Vec<i64>,
    obj_facvar: Vec<f64>,
    entries: SparseEntries,
}

impl SdpRelaxation {
    /// A generator using the given substitution rules
    pub fn new(substitutions: Substitutions) -> Self {
        Self::with_config(substitutions, RelaxationConfig::default())
    }

    /// A generator with explicit configuration
    pub fn with_config(substitutions: Substitutions, config: RelaxationConfig) -> Self {
        SdpRelaxation {
            substitutions,
            config,
            dictionary: MonomialDictionary::new(),
            monomials: Vec::new(),
            n_elements: 0,
            block_struct: Vec::new(),
            obj_facvar: Vec::new(),
            entries: SparseEntries::default(),
        }
    }

    /// Build the relaxation of `problem`, replacing any previous result.
    pub fn get_relaxation(&mut self, problem: &Problem) -> Result<()> {
        let order = problem.order;
        if order == 0 {
            return Err(RelaxationError::InvalidOrder { order });
        }

        let mut inequalities = problem.inequalities.clone();
        info!(
            "Transforming {} equalities to {} inequalities",
            problem.equalities.len(),
            2 * problem.equalities.len()
        );
        for equality in &problem.equalities {
            inequalities.push(equality.clone());
            inequalities.push(-equality);
        }
        // Localizing cells b_r^* g b_c over degree <= order-1 monomials stay
        // within the moment matrix only for deg(g) <= 2.
        for (index, g) in inequalities.iter().enumerate() {
            let degree = g.degree();
            if degree > MAX_CONSTRAINT_DEGREE {
                return Err(RelaxationError::ConstraintDegree { index, degree, order });
            }
        }

        let pool = self.config.build_pool()?;
        let max_passes = self.config.max_rewrite_passes;

        let monomials = nc_monomials(&problem.variables, order, &self.substitutions, max_passes)?;
        let n = monomials.len();
        let n_elements = n * n;
        info!(
            "Reduced number of monomials: {}, number of SDP variables: {}",
            n, n_elements
        );

        let dictionary = MonomialDictionary::new();
        let mut entries = SparseEntries::new(n_elements);
        let mut block_struct = Vec::with_capacity(2 + inequalities.len());

        // Normalization block: y_1 = 1 as the pair y_1 >= 1, -y_1 >= -1
        let one = linear_index(Position::new(0, 0), n);
        for (row, value) in [(0, 1.0), (1, -1.0)] {
            let entry = Entry::at_cell(1, row, row, value);
            entries.push(0, entry);
            entries.push(one, entry);
        }
        block_struct.push(-2);

        let assembly = Assembly {
            monomials: &monomials,
            substitutions: &self.substitutions,
            dictionary: &dictionary,
            max_passes,
        };
        let discovery = self.config.discovery;

        install(pool.as_ref(), || {
            moment::generate_moment_matrix(&assembly, 2, discovery, &mut entries)
        })?;
        block_struct.push(n as i64);
        debug!("Moment matrix registered {} monomials", dictionary.len());

        let obj_facvar = objective::dense_coefficients(&assembly, &problem.objective, n_elements)?;

        let n_ineq_monomials = count_nc_monomials(&monomials, order - 1);
        block_struct.extend(std::iter::repeat(n_ineq_monomials as i64).take(inequalities.len()));
        install(pool.as_ref(), || {
            localizing::process_inequalities(
                &assembly,
                &inequalities,
                3,
                n_ineq_monomials,
                discovery,
                &mut entries,
            )
        })?;
        debug!(
            "Relaxation has {} blocks and {} nonzero entries",
            block_struct.len(),
            entries.num_entries()
        );

        self.dictionary = dictionary;
        self.monomials = monomials;
        self.n_elements = n_elements;
        self.block_struct = block_struct;
        self.obj_facvar = obj_facvar;
        self.entries = entries;
        Ok(())
    }

    /// Substitution rules in use
    pub fn substitutions(&self) -> &Substitutions {
        &self.substitutions
    }

    /// Generator configuration
    pub fn config(&self) -> &RelaxationConfig {
        &self.config
    }

    /// Monomial basis of the last relaxation
    pub fn monomials(&self) -> &[Term] {
        &self.monomials
    }

    /// Side length of the moment matrix
    pub fn n_monomials(&self) -> usize {
        self.monomials.len()
    }

    /// Number of decision variables
    pub fn n_elements(&self) -> usize {
        self.n_elements
    }

    /// Block sizes; negative entries denote diagonal blocks
    pub fn block_struct(&self) -> &[i64] {
        &self.block_struct
    }

    /// Dense objective coefficients, one per decision variable
    pub fn objective(&self) -> &[f64] {
        &self.obj_facvar
    }

    /// Constraint matrix entries per decision variable
    pub fn entries(&self) -> &SparseEntries {
        &self.entries
    }

    /// Registered canonical monomials
    pub fn dictionary(&self) -> &MonomialDictionary {
        &self.dictionary
    }

    /// Decision variable and sign representing `monomial`.
    ///
    /// Returns `None` if the monomial vanishes or is not part of the moment
    /// matrix.
    pub fn decision_variable(&self, monomial: &Term) -> Result<Option<(usize, f64)>> {
        let (coefficient, word) = monomial.split_coefficient();
        let canonical = self
            .substitutions
            .normalize_bounded(&word, self.config.max_rewrite_passes)?;
        if canonical.is_zero() {
            return Ok(None);
        }
        let (sign, key) = canonical.split_coefficient();
        Ok(self
            .dictionary
            .get(&key)
            .map(|position| (linear_index(position, self.n_monomials()), coefficient * sign)))
    }
}
