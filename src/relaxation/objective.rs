//! Dense objective vector

use super::Assembly;
use crate::error::Result;
use crate::term::Term;

/// Coefficients of `objective` over decision variables `1..=n_elements`.
///
/// Entry `k - 1` holds the coefficient of variable `k`. Constant terms land on
/// variable 1, the moment of `1`.
pub(crate) fn dense_coefficients(
    assembly: &Assembly<'_>,
    objective: &Term,
    n_elements: usize,
) -> Result<Vec<f64>> {
    let mut facvar = vec![0.0; n_elements];
    for (k, value) in assembly.facvar_terms(objective, || "objective".to_string())? {
        facvar[k - 1] += value;
    }
    Ok(facvar)
}
