//! The monomial dictionary
//!
//! Maps each canonical monomial to the first matrix position that produced it.
//! Every later cell with the same canonical monomial reuses that position, and
//! hence the same decision variable, which is what keeps the SDP small.
//!
//! The map is a sharded concurrent map; [`MonomialDictionary::resolve`] is a
//! single atomic insert-if-absent, so workers racing for the same monomial
//! always agree on one representative.

use crate::term::Term;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;

/// A 0-based `(row, column)` matrix position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Row index
    pub row: usize,
    /// Column index
    pub column: usize,
}

impl Position {
    /// Create a position
    pub fn new(row: usize, column: usize) -> Self {
        Position { row, column }
    }
}

/// Canonical monomial -> representative position
#[derive(Debug, Default)]
pub struct MonomialDictionary {
    map: DashMap<Term, Position>,
}

impl MonomialDictionary {
    /// Create an empty dictionary
    pub fn new() -> Self {
        MonomialDictionary {
            map: DashMap::new(),
        }
    }

    /// Return the representative of `monomial`, registering `candidate` if the
    /// monomial is new.
    ///
    /// The boolean is `true` when this call created the entry.
    pub fn resolve(&self, monomial: Term, candidate: Position) -> (Position, bool) {
        match self.map.entry(monomial) {
            MapEntry::Occupied(existing) => (*existing.get(), false),
            MapEntry::Vacant(slot) => {
                slot.insert(candidate);
                (candidate, true)
            }
        }
    }

    /// Look up an already registered monomial
    pub fn get(&self, monomial: &Term) -> Option<Position> {
        self.map.get(monomial).map(|found| *found.value())
    }

    /// Number of registered monomials
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Snapshot of all registrations, ordered by position
    pub fn entries(&self) -> Vec<(Term, Position)> {
        let mut entries: Vec<(Term, Position)> = self
            .map
            .iter()
            .map(|item| (item.key().clone(), *item.value()))
            .collect();
        entries.sort_by_key(|(_, position)| *position);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_resolve_first_wins() {
        let dict = MonomialDictionary::new();
        let m = Term::var(0) * Term::var(1);

        let (first, created) = dict.resolve(m.clone(), Position::new(0, 3));
        assert!(created);
        assert_eq!(first, Position::new(0, 3));

        let (second, created) = dict.resolve(m.clone(), Position::new(1, 2));
        assert!(!created);
        assert_eq!(second, Position::new(0, 3));

        assert_eq!(dict.get(&m), Some(Position::new(0, 3)));
        assert_eq!(dict.get(&Term::var(1)), None);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_concurrent_resolve_agrees() {
        let dict = MonomialDictionary::new();
        let m = Term::var(2).pow(2);

        let positions: Vec<Position> = (0..64usize)
            .into_par_iter()
            .map(|i| dict.resolve(m.clone(), Position::new(i, i)).0)
            .collect();

        let winner = dict.get(&m).unwrap();
        assert!(positions.iter().all(|p| *p == winner));
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_entries_sorted() {
        let dict = MonomialDictionary::new();
        dict.resolve(Term::var(1), Position::new(0, 2));
        dict.resolve(Term::var(0), Position::new(0, 1));
        dict.resolve(Term::from(1.0), Position::new(0, 0));

        let positions: Vec<Position> = dict.entries().into_iter().map(|(_, p)| p).collect();
        assert_eq!(
            positions,
            vec![Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)]
        );
    }
}
