//! Localizing matrices of inequality constraints
//!
//! For a constraint `g >= 0` the localizing matrix has cells
//! `conj(b_r) * g * b_c` over the basis monomials of degree at most
//! `order - 1`. Cells are symmetrized like the moment matrix and expressed in
//! the decision variables the moment matrix registered.

use super::matrix::{merge_contributions, Entry, SparseEntries};
use super::{Assembly, DiscoveryOrder};
use crate::error::Result;
use crate::term::Term;
use parking_lot::Mutex;
use rayon::prelude::*;

impl Assembly<'_> {
    /// Push the entries of one localizing-matrix cell into `sink`.
    ///
    /// `polynomial` is the already symmetrized cell polynomial; `row` and
    /// `column` are 0-based.
    pub(crate) fn push_facvar_sparse(
        &self,
        polynomial: &Term,
        block_index: usize,
        row: usize,
        column: usize,
        sink: &mut Vec<(usize, Entry)>,
    ) -> Result<()> {
        let terms = self.facvar_terms(polynomial, || {
            format!("block {}, cell ({}, {})", block_index, row + 1, column + 1)
        })?;
        sink.extend(
            merge_contributions(&terms)
                .into_iter()
                .map(|(k, value)| (k, Entry::at_cell(block_index, row, column, value))),
        );
        Ok(())
    }

    /// Entries of the localizing matrix of `constraint`
    fn localizing_block(
        &self,
        constraint: &Term,
        block_index: usize,
        size: usize,
    ) -> Result<Vec<(usize, Entry)>> {
        let basis = &self.monomials[..size];
        let mut batch = Vec::new();
        for row in 0..size {
            let left = basis[row].conjugate().mul_ref(constraint);
            for column in row..size {
                let cell = left.mul_ref(&basis[column]);
                let cell = if row == column {
                    cell
                } else {
                    let adjoint = basis[column].conjugate().mul_ref(constraint).mul_ref(&basis[row]);
                    cell.scale(0.5).add_ref(&adjoint.scale(0.5))
                };
                self.push_facvar_sparse(&cell, block_index, row, column, &mut batch)?;
            }
        }
        Ok(batch)
    }
}

/// Emit one localizing block per constraint, starting at `first_block`.
///
/// `size` is the number of leading basis monomials spanning each block.
pub(crate) fn process_inequalities(
    assembly: &Assembly<'_>,
    inequalities: &[Term],
    first_block: usize,
    size: usize,
    discovery: DiscoveryOrder,
    entries: &mut SparseEntries,
) -> Result<()> {
    match discovery {
        DiscoveryOrder::RowMajor => {
            let blocks: Vec<Vec<(usize, Entry)>> = inequalities
                .par_iter()
                .enumerate()
                .map(|(i, g)| assembly.localizing_block(g, first_block + i, size))
                .collect::<Result<_>>()?;
            for batch in blocks {
                entries.extend(batch);
            }
        }
        DiscoveryOrder::Concurrent => {
            let shared = Mutex::new(entries);
            inequalities
                .par_iter()
                .enumerate()
                .try_for_each(|(i, g)| -> Result<()> {
                    let batch = assembly.localizing_block(g, first_block + i, size)?;
                    shared.lock().extend(batch);
                    Ok(())
                })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelaxationError;
    use crate::relaxation::{moment, MonomialDictionary};
    use crate::substitution::Substitutions;
    use num_traits::One;

    fn x(i: u32) -> Term {
        Term::var(i)
    }

    #[test]
    fn test_scalar_localizing_block() {
        // Basis [1, X0, X1] with X0^2 = X0; g = X1 - X1^2 at order 1
        let basis = vec![Term::one(), x(0), x(1)];
        let subs = Substitutions::new().with_rule(x(0) * x(0), x(0)).unwrap();
        let dictionary = MonomialDictionary::new();
        let mut entries = SparseEntries::new(9);
        let assembly = Assembly {
            monomials: &basis,
            substitutions: &subs,
            dictionary: &dictionary,
            max_passes: 64,
        };
        moment::generate_moment_matrix(&assembly, 2, DiscoveryOrder::RowMajor, &mut entries)
            .unwrap();

        let g = x(1) - x(1) * x(1);
        let mut local = SparseEntries::new(9);
        process_inequalities(&assembly, &[g], 3, 1, DiscoveryOrder::RowMajor, &mut local).unwrap();

        // X1 registered at (0, 2), X1^2 at (2, 2)
        assert_eq!(local.sequence(3), &[Entry::at_cell(3, 0, 0, 1.0)]);
        assert_eq!(local.sequence(9), &[Entry::at_cell(3, 0, 0, -1.0)]);
        assert_eq!(local.num_entries(), 2);
    }

    #[test]
    fn test_constant_constraint() {
        let basis = vec![Term::one(), x(0)];
        let subs = Substitutions::new();
        let dictionary = MonomialDictionary::new();
        let mut entries = SparseEntries::new(4);
        let assembly = Assembly {
            monomials: &basis,
            substitutions: &subs,
            dictionary: &dictionary,
            max_passes: 64,
        };
        moment::generate_moment_matrix(&assembly, 2, DiscoveryOrder::RowMajor, &mut entries)
            .unwrap();

        let mut batch = Vec::new();
        assembly
            .push_facvar_sparse(&Term::from(-0.5), 3, 0, 0, &mut batch)
            .unwrap();
        assert_eq!(batch, vec![(1, Entry::at_cell(3, 0, 0, -0.5))]);
    }

    #[test]
    fn test_unregistered_monomial() {
        // Nothing registered: the lookup of X0 must fail rather than map to 0
        let basis = vec![Term::one(), x(0)];
        let subs = Substitutions::new();
        let dictionary = MonomialDictionary::new();
        let assembly = Assembly {
            monomials: &basis,
            substitutions: &subs,
            dictionary: &dictionary,
            max_passes: 64,
        };
        let mut batch = Vec::new();
        let err = assembly
            .push_facvar_sparse(&x(0), 3, 0, 0, &mut batch)
            .unwrap_err();
        assert!(matches!(err, RelaxationError::UnregisteredMonomial { .. }));
        assert!(err.to_string().contains("block 3, cell (1, 1)"));
    }

    #[test]
    fn test_equal_terms_merge() {
        let basis = vec![Term::one(), x(0)];
        let subs = Substitutions::new().with_rule(x(0) * x(0), x(0)).unwrap();
        let dictionary = MonomialDictionary::new();
        let mut entries = SparseEntries::new(4);
        let assembly = Assembly {
            monomials: &basis,
            substitutions: &subs,
            dictionary: &dictionary,
            max_passes: 64,
        };
        moment::generate_moment_matrix(&assembly, 2, DiscoveryOrder::RowMajor, &mut entries)
            .unwrap();

        // X0 + X0^2 collapses onto a single decision variable
        let mut batch = Vec::new();
        let cell = Term::from_summands(vec![x(0), x(0).pow(2)]);
        assembly
            .push_facvar_sparse(&cell, 3, 0, 0, &mut batch)
            .unwrap();
        assert_eq!(batch, vec![(2, Entry::at_cell(3, 0, 0, 2.0))]);
    }
}
