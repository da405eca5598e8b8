//! Error types for ncpol-sdpa

use thiserror::Error;

/// Result type alias for relaxation operations
pub type Result<T> = std::result::Result<T, RelaxationError>;

/// Errors that can occur while building or serializing a relaxation
#[derive(Error, Debug)]
pub enum RelaxationError {
    /// The substitution rules did not reach a fixed point
    #[error("rewrite system did not converge after {passes} passes on monomial {monomial}")]
    NotConverged {
        /// Number of passes attempted
        passes: usize,
        /// The monomial whose normalization was attempted
        monomial: String,
    },

    /// A canonical monomial was looked up but never registered by the moment matrix
    #[error("monomial {monomial} is not registered in the moment matrix ({context})")]
    UnregisteredMonomial {
        /// The canonical monomial that missed
        monomial: String,
        /// Where the lookup happened
        context: String,
    },

    /// A substitution pattern that cannot be matched against words
    #[error("invalid substitution pattern {pattern}: expected a coefficient-free monomial of degree at least 1")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
    },

    /// Relaxation order out of range
    #[error("invalid relaxation order {order}: must be at least 1")]
    InvalidOrder {
        /// The rejected order
        order: usize,
    },

    /// A constraint whose localizing block would leave the moment matrix
    #[error("constraint {index} has degree {degree}; localizing blocks at order {order} support constraints of degree at most 2")]
    ConstraintDegree {
        /// Position of the constraint after equality expansion
        index: usize,
        /// Degree of the constraint polynomial
        degree: u32,
        /// The requested relaxation order
        order: usize,
    },

    /// Text input could not be parsed
    #[error("cannot parse {input:?}: {reason}")]
    Parse {
        /// The offending input (or line)
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The bounded worker pool could not be created
    #[error("cannot build worker pool: {0}")]
    ThreadPool(String),

    /// I/O failure while writing or reading a file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON problem file
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RelaxationError {
    /// Create a parse error
    pub fn parse(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an unregistered-monomial error
    pub fn unregistered(monomial: impl ToString, context: impl Into<String>) -> Self {
        Self::UnregisteredMonomial {
            monomial: monomial.to_string(),
            context: context.into(),
        }
    }
}
