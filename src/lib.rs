//! # ncpol-sdpa
//!
//! Semidefinite relaxations of noncommutative polynomial optimization problems.
//!
//! Given Hermitian noncommuting variables, a polynomial objective, polynomial
//! inequality and equality constraints, and monomial substitution rules, this
//! library builds the NPA (Navascués-Pironio-Acín) relaxation of a chosen order
//! and writes it in the SDPA sparse format read by SDPA, CSDP and friends.
//!
//! ## Features
//!
//! - **Noncommutative terms**: numbers, symbols, powers, products and sums in a
//!   hashable normal form
//! - **Substitution rules**: exponent-aware pattern rewriting with a bounded
//!   fixed-point normalizer
//! - **Moment and localizing matrices**: one decision variable per canonical
//!   monomial, shared through a concurrent dictionary
//! - **Parallel generation**: cells are processed on a bounded rayon pool, with
//!   reproducible row-major registration by default
//! - **SDPA output**: writer plus a reader for checking results
//! - **JSON problem files**: variables, polynomials and rules as text
//!
//! ## Quick Start
//!
//! ```
//! use ncpol_sdpa::*;
//!
//! // Two projectors: X0^2 = X0, X1^2 = X1
//! let x = Term::symbols(2);
//! let subs = Substitutions::new()
//!     .with_rule(x[0].pow(2), x[0].clone()).unwrap()
//!     .with_rule(x[1].pow(2), x[1].clone()).unwrap();
//!
//! let objective = x[0].mul_ref(&x[1]) + x[1].mul_ref(&x[0]);
//! let problem = Problem::new(x.clone(), objective, 2);
//!
//! let mut relaxation = SdpRelaxation::new(subs);
//! relaxation.get_relaxation(&problem).unwrap();
//!
//! let mut sdpa = Vec::new();
//! relaxation.write_sdpa(&mut sdpa, "projectors.dat-s").unwrap();
//! let parsed = SdpaProblem::parse(std::str::from_utf8(&sdpa).unwrap()).unwrap();
//! assert_eq!(parsed.n_vars(), relaxation.n_elements());
//! ```
//!
//! ## Configuration
//!
//! ```
//! use ncpol_sdpa::*;
//!
//! let config = RelaxationConfig::new()
//!     .with_num_threads(4)
//!     .with_max_rewrite_passes(64)
//!     .with_discovery(DiscoveryOrder::Concurrent);
//!
//! let relaxation = SdpRelaxation::with_config(Substitutions::new(), config);
//! assert_eq!(relaxation.config().num_threads, Some(4));
//! ```
//!
//! ## Problem Files
//!
//! ```
//! use ncpol_sdpa::ProblemFile;
//!
//! let file = ProblemFile::from_json(r#"{
//!     "variables": ["A", "B"],
//!     "objective": "A*B + B*A",
//!     "substitutions": [{"pattern": "A^2", "replacement": "A"}],
//!     "order": 1
//! }"#).unwrap();
//! let relaxation = file.relax().unwrap();
//! assert_eq!(relaxation.block_struct(), &[-2, 3]);
//! ```
//!
//! ## Logging
//!
//! Progress is reported through `tracing` at `info` and `debug` level; install
//! any subscriber to see it.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod basis;
pub mod error;
pub mod parse;
pub mod problem;
pub mod relaxation;
pub mod sdpa;
pub mod substitution;
pub mod term;

// Re-export main types
pub use basis::{count_nc_monomials, nc_monomials, raw_nc_monomials};
pub use error::{RelaxationError, Result};
pub use parse::parse_polynomial;
pub use problem::{Problem, ProblemFile, SubstitutionSpec};
pub use relaxation::{
    linear_index, DiscoveryOrder, Entry, MonomialDictionary, Position, RelaxationConfig,
    SdpRelaxation, SparseEntries, MAX_CONSTRAINT_DEGREE,
};
pub use sdpa::{write_sdpa, SdpaProblem};
pub use substitution::{
    Rule, Substitutions, DEFAULT_MAX_REWRITE_DEGREE, DEFAULT_MAX_REWRITE_PASSES,
};
pub use term::{Term, TermKind, Var, Word};

// Re-export the numeric traits used by Term
pub use num_traits::{One, Zero};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
