//! Sparse constraint matrices of the relaxation
//!
//! The SDP is stored the way the SDPA sparse format lists it: one sequence of
//! entries per decision variable `k`, where sequence 0 holds the constant
//! matrix. Each entry is a nonzero of the symmetric block matrix `F_k`, upper
//! triangle only, with 1-based row and column indices.

use super::dictionary::Position;

/// A nonzero coefficient of one decision variable in one block
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entry {
    /// 1-based block index
    pub block_index: usize,
    /// 1-based row within the block
    pub row: usize,
    /// 1-based column within the block
    pub column: usize,
    /// Coefficient value
    pub value: f64,
}

impl Entry {
    /// Entry for the 0-based cell `(row, column)` of a block
    pub fn at_cell(block_index: usize, row: usize, column: usize, value: f64) -> Self {
        Entry {
            block_index,
            row: row + 1,
            column: column + 1,
            value,
        }
    }
}

/// Decision-variable index of a moment-matrix position.
///
/// Row-major over the full `n_monomials x n_monomials` grid, shifted by one so
/// that index 0 stays reserved for the constant matrix. Conjugate cells are
/// registered below the diagonal, so the whole grid is addressable.
#[inline]
pub fn linear_index(position: Position, n_monomials: usize) -> usize {
    position.row * n_monomials + position.column + 1
}

/// Per-decision-variable entry sequences
///
/// Holds `n_elements + 1` sequences; entries are kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseEntries {
    /// sequences[k] lists the nonzeros of F_k
    sequences: Vec<Vec<Entry>>,
}

impl SparseEntries {
    /// Create empty sequences for variables `0..=n_elements`
    pub fn new(n_elements: usize) -> Self {
        SparseEntries {
            sequences: vec![Vec::new(); n_elements + 1],
        }
    }

    /// Append an entry to the sequence of variable `k`
    pub fn push(&mut self, k: usize, entry: Entry) {
        self.sequences[k].push(entry);
    }

    /// Append a batch of `(variable, entry)` pairs in order
    pub fn extend<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = (usize, Entry)>,
    {
        for (k, entry) in batch {
            self.push(k, entry);
        }
    }

    /// Entries of variable `k`
    pub fn sequence(&self, k: usize) -> &[Entry] {
        self.sequences.get(k).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of sequences, `n_elements + 1`
    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    /// Total number of entries across all sequences
    pub fn num_entries(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Check if no entry has been recorded
    pub fn is_empty(&self) -> bool {
        self.sequences.iter().all(Vec::is_empty)
    }

    /// All entries as `(variable, entry)`, by variable then insertion order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Entry)> + '_ {
        self.sequences
            .iter()
            .enumerate()
            .flat_map(|(k, seq)| seq.iter().map(move |e| (k, e)))
    }
}

/// Merge the contributions of one matrix cell.
///
/// Coefficients landing on the same variable are added up, keeping the order
/// in which variables first appear; variables whose total is zero are dropped.
pub(crate) fn merge_contributions(contributions: &[(usize, f64)]) -> Vec<(usize, f64)> {
    let mut merged: Vec<(usize, f64)> = Vec::with_capacity(contributions.len());
    for &(k, value) in contributions {
        match merged.iter_mut().find(|(existing, _)| *existing == k) {
            Some((_, total)) => *total += value,
            None => merged.push((k, value)),
        }
    }
    merged.retain(|&(_, value)| value != 0.0);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_index() {
        assert_eq!(linear_index(Position::new(0, 0), 6), 1);
        assert_eq!(linear_index(Position::new(0, 5), 6), 6);
        assert_eq!(linear_index(Position::new(1, 0), 6), 7);
        assert_eq!(linear_index(Position::new(5, 5), 6), 36);
    }

    #[test]
    fn test_sparse_entries_basic() {
        let mut entries = SparseEntries::new(4);
        assert_eq!(entries.num_sequences(), 5);
        assert!(entries.is_empty());

        entries.push(2, Entry::at_cell(1, 0, 1, 0.5));
        entries.extend(vec![
            (0, Entry::at_cell(1, 0, 0, 1.0)),
            (2, Entry::at_cell(2, 1, 1, -1.0)),
        ]);

        assert_eq!(entries.num_entries(), 3);
        assert_eq!(entries.sequence(2).len(), 2);
        assert_eq!(entries.sequence(2)[0].row, 1);
        assert_eq!(entries.sequence(2)[0].column, 2);
        assert!(entries.sequence(7).is_empty());

        // Iteration goes variable by variable
        let ks: Vec<usize> = entries.iter().map(|(k, _)| k).collect();
        assert_eq!(ks, vec![0, 2, 2]);
    }

    #[test]
    fn test_merge_contributions() {
        // Self-conjugate off-diagonal cell: two halves of the same variable
        assert_eq!(merge_contributions(&[(5, 0.5), (5, 0.5)]), vec![(5, 1.0)]);
        // Distinct conjugates keep their halves
        assert_eq!(
            merge_contributions(&[(5, 0.5), (8, 0.5)]),
            vec![(5, 0.5), (8, 0.5)]
        );
        // Opposite signs cancel out
        assert!(merge_contributions(&[(3, 0.5), (3, -0.5)]).is_empty());
    }
}
