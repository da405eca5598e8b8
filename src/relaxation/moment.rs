//! Moment matrix generation
//!
//! Cell `(r, c)` of the moment matrix holds the moment of `conj(b_r) * b_c`.
//! Only the upper triangle is emitted. An off-diagonal cell is symmetrized as
//! half of the monomial plus half of its adjoint; the adjoint is registered at
//! the mirrored position `(c, r)`, so conjugate monomials get their own
//! decision variable unless they coincide.

use super::dictionary::Position;
use super::matrix::{linear_index, merge_contributions, Entry, SparseEntries};
use super::{Assembly, DiscoveryOrder};
use crate::error::Result;
use crate::term::Term;
use num_traits::{One, Zero};
use parking_lot::Mutex;
use rayon::prelude::*;

/// Canonical monomials of one upper-triangle cell
#[derive(Debug)]
struct CellMoment {
    row: usize,
    column: usize,
    /// `conj(b_row) * b_column`, as `(coefficient, key)`
    forward: Option<(f64, Term)>,
    /// `conj(b_column) * b_row`; absent on the diagonal
    backward: Option<(f64, Term)>,
}

impl Assembly<'_> {
    /// Canonical `(coefficient, key)` of `conj(left) * right`, `None` if it vanishes
    fn canonical_moment(&self, left: &Term, right: &Term) -> Result<Option<(f64, Term)>> {
        let product = left.conjugate().mul_ref(right);
        let canonical = self.normalize(&product)?;
        if canonical.is_zero() {
            return Ok(None);
        }
        Ok(Some(canonical.split_coefficient()))
    }

    fn row_moments(&self, row: usize) -> Result<Vec<CellMoment>> {
        let basis = self.monomials;
        (row..basis.len())
            .map(|column| {
                let forward = self.canonical_moment(&basis[row], &basis[column])?;
                let backward = if row == column {
                    None
                } else {
                    self.canonical_moment(&basis[column], &basis[row])?
                };
                Ok(CellMoment {
                    row,
                    column,
                    forward,
                    backward,
                })
            })
            .collect()
    }

    /// Register the monomials of a cell and build its entries
    fn register_cell(&self, cell: &CellMoment, block_index: usize) -> Vec<(usize, Entry)> {
        let n = self.n_monomials();
        let mut contributions = Vec::with_capacity(2);
        let weight = if cell.row == cell.column { 1.0 } else { 0.5 };

        if let Some((coefficient, key)) = &cell.forward {
            let (position, _) = self
                .dictionary
                .resolve(key.clone(), Position::new(cell.row, cell.column));
            contributions.push((linear_index(position, n), weight * coefficient));
        }
        if let Some((coefficient, key)) = &cell.backward {
            let (position, _) = self
                .dictionary
                .resolve(key.clone(), Position::new(cell.column, cell.row));
            contributions.push((linear_index(position, n), weight * coefficient));
        }

        merge_contributions(&contributions)
            .into_iter()
            .map(|(k, value)| (k, Entry::at_cell(block_index, cell.row, cell.column, value)))
            .collect()
    }
}

/// Fill the moment matrix as block `block_index`.
pub(crate) fn generate_moment_matrix(
    assembly: &Assembly<'_>,
    block_index: usize,
    discovery: DiscoveryOrder,
    entries: &mut SparseEntries,
) -> Result<()> {
    let n = assembly.n_monomials();

    // The moment of 1 is always the first decision variable
    assembly.dictionary.resolve(Term::one(), Position::new(0, 0));

    match discovery {
        DiscoveryOrder::RowMajor => {
            let rows: Vec<Vec<CellMoment>> = (0..n)
                .into_par_iter()
                .map(|row| assembly.row_moments(row))
                .collect::<Result<_>>()?;
            for cell in rows.iter().flatten() {
                entries.extend(assembly.register_cell(cell, block_index));
            }
        }
        DiscoveryOrder::Concurrent => {
            let shared = Mutex::new(entries);
            (0..n).into_par_iter().try_for_each(|row| -> Result<()> {
                for cell in assembly.row_moments(row)? {
                    let batch = assembly.register_cell(&cell, block_index);
                    shared.lock().extend(batch);
                }
                Ok(())
            })?;
        }
    }
    Ok(())
}
