//! Noncommutative terms.
//!
//! [`Term`] is the closed expression type consumed by the relaxation: numbers,
//! Hermitian symbols, powers of a symbol, ordered products and sums. All
//! arithmetic goes through normalizing constructors, so two terms describing the
//! same polynomial compare (and hash) equal:
//!
//! - a `Product` holds an optional leading `Numeric` coefficient (never 0 or 1)
//!   followed by at least one `Symbol`/`Power`, with adjacent equal symbols merged
//!   into a single power;
//! - a `Sum` holds at least two monomial summands with distinct words, no zero
//!   coefficients, sorted by degree and then lexicographically.
//!
//! Hand-built terms can violate these rules. The algebra tolerates that: a `Sum`
//! nested inside a `Product` is reported through `tracing` and treated as the
//! identity factor.

use num_traits::{One, Zero};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use tracing::warn;

/// A noncommuting Hermitian variable, identified by its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub u32);

impl Var {
    /// Position of the variable among the generating variables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// Run-length factor sequence of a monomial: `(variable, exponent)` pairs with
/// no two adjacent pairs sharing a variable.
pub type Word = Vec<(Var, u32)>;

/// Classification of a term, see [`Term::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermKind {
    /// A real number
    Numeric,
    /// A single variable
    Symbol,
    /// A variable raised to an exponent of at least 2
    Power,
    /// An ordered product of factors
    Product,
    /// A sum of monomials
    Sum,
}

/// A noncommutative polynomial expression with real coefficients.
#[derive(Clone, Debug, PartialEq)]
pub enum Term {
    /// A real constant
    Numeric(f64),
    /// A variable
    Symbol(Var),
    /// `base^exponent`
    Power(Var, u32),
    /// Ordered factors, optionally led by a numeric coefficient
    Product(Vec<Term>),
    /// Summands, each a monomial
    Sum(Vec<Term>),
}

// Coefficients are finite in every term the crate builds.
impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Term::Numeric(c) => coefficient_bits(*c).hash(state),
            Term::Symbol(v) => v.hash(state),
            Term::Power(v, e) => {
                v.hash(state);
                e.hash(state);
            }
            Term::Product(items) | Term::Sum(items) => items.hash(state),
        }
    }
}

/// `0.0` and `-0.0` compare equal, so they must hash equal.
fn coefficient_bits(c: f64) -> u64 {
    if c == 0.0 {
        0.0f64.to_bits()
    } else {
        c.to_bits()
    }
}

fn word_degree(word: &[(Var, u32)]) -> u32 {
    word.iter().fold(0u32, |acc, &(_, e)| acc.saturating_add(e))
}

/// Degree first, then lexicographic on the factor sequence.
fn graded_cmp(a: &[(Var, u32)], b: &[(Var, u32)]) -> Ordering {
    word_degree(a).cmp(&word_degree(b)).then_with(|| a.cmp(b))
}

fn push_factor(word: &mut Word, var: Var, exponent: u32) {
    if exponent == 0 {
        return;
    }
    if let Some(last) = word.last_mut() {
        if last.0 == var {
            // Saturates; degree limits in normalization reject such words.
            last.1 = last.1.saturating_add(exponent);
            return;
        }
    }
    word.push((var, exponent));
}

fn absorb_factor(factor: &Term, coefficient: &mut f64, word: &mut Word) {
    match factor {
        Term::Numeric(c) => *coefficient *= c,
        Term::Symbol(v) => push_factor(word, *v, 1),
        Term::Power(v, e) => push_factor(word, *v, *e),
        Term::Product(inner) => {
            for g in inner {
                absorb_factor(g, coefficient, word);
            }
        }
        Term::Sum(_) => {
            warn!(factor = %factor, "not a monomial factor, treating it as the identity");
        }
    }
}

impl Term {
    /// The term for a single variable.
    pub fn var(index: u32) -> Self {
        Term::Symbol(Var(index))
    }

    /// The generating variables `X0 .. X(n-1)`.
    pub fn symbols(n: usize) -> Vec<Term> {
        (0..n as u32).map(Term::var).collect()
    }

    /// Build a monomial from a coefficient and a factor sequence.
    ///
    /// Adjacent factors on the same variable are merged and zero exponents
    /// dropped, so the result is in normal form.
    pub fn from_word<I>(coefficient: f64, word: I) -> Term
    where
        I: IntoIterator<Item = (Var, u32)>,
    {
        if coefficient == 0.0 {
            return Term::Numeric(0.0);
        }
        let mut merged = Word::new();
        for (v, e) in word {
            push_factor(&mut merged, v, e);
        }
        let mut factors: Vec<Term> = merged
            .into_iter()
            .map(|(v, e)| if e == 1 { Term::Symbol(v) } else { Term::Power(v, e) })
            .collect();
        if factors.is_empty() {
            return Term::Numeric(coefficient);
        }
        if factors.len() == 1 && coefficient == 1.0 {
            return factors.swap_remove(0);
        }
        if coefficient != 1.0 {
            factors.insert(0, Term::Numeric(coefficient));
        }
        Term::Product(factors)
    }

    /// Add up arbitrary terms, combining like monomials.
    pub fn from_summands<I>(summands: I) -> Term
    where
        I: IntoIterator<Item = Term>,
    {
        let mut coefficients: HashMap<Word, f64> = HashMap::new();
        for term in summands {
            term.collect_into(&mut coefficients);
        }
        let mut monomials: Vec<(Word, f64)> = coefficients
            .into_iter()
            .filter(|(_, c)| *c != 0.0)
            .collect();
        monomials.sort_by(|a, b| graded_cmp(&a.0, &b.0));
        match monomials.len() {
            0 => Term::Numeric(0.0),
            1 => {
                let (word, c) = monomials.swap_remove(0);
                Term::from_word(c, word)
            }
            _ => Term::Sum(
                monomials
                    .into_iter()
                    .map(|(word, c)| Term::from_word(c, word))
                    .collect(),
            ),
        }
    }

    fn collect_into(&self, coefficients: &mut HashMap<Word, f64>) {
        match self {
            Term::Sum(items) => {
                for item in items {
                    item.collect_into(coefficients);
                }
            }
            other => {
                if let Some((c, word)) = other.monomial_parts() {
                    *coefficients.entry(word).or_insert(0.0) += c;
                }
            }
        }
    }

    /// Coefficient and factor sequence of a monomial; `None` for sums.
    fn monomial_parts(&self) -> Option<(f64, Word)> {
        match self {
            Term::Sum(_) => None,
            other => {
                let mut coefficient = 1.0;
                let mut word = Word::new();
                absorb_factor(other, &mut coefficient, &mut word);
                Some((coefficient, word))
            }
        }
    }

    /// Classify the term.
    pub fn kind(&self) -> TermKind {
        match self {
            Term::Numeric(_) => TermKind::Numeric,
            Term::Symbol(_) => TermKind::Symbol,
            Term::Power(..) => TermKind::Power,
            Term::Product(_) => TermKind::Product,
            Term::Sum(_) => TermKind::Sum,
        }
    }

    /// The factor sequence of a monomial, ignoring its coefficient.
    ///
    /// Returns `None` for sums. Numbers have the empty word.
    pub fn word(&self) -> Option<Word> {
        self.monomial_parts().map(|(_, word)| word)
    }

    /// The additive terms; a monomial is a one-term sum and zero has none.
    pub fn summands(&self) -> &[Term] {
        match self {
            Term::Sum(items) => items,
            Term::Numeric(c) if *c == 0.0 => &[],
            other => std::slice::from_ref(other),
        }
    }

    /// Adjoint of the term: the factor order of every monomial is reversed.
    ///
    /// Variables are Hermitian and coefficients real, so numbers, symbols and
    /// powers are fixed.
    pub fn conjugate(&self) -> Term {
        match self {
            Term::Numeric(_) | Term::Symbol(_) | Term::Power(..) => self.clone(),
            Term::Product(_) => match self.monomial_parts() {
                Some((c, mut word)) => {
                    word.reverse();
                    Term::from_word(c, word)
                }
                None => self.clone(),
            },
            Term::Sum(items) => Term::from_summands(items.iter().map(Term::conjugate)),
        }
    }

    /// Sum of the exponents of all variable factors; for sums, the largest
    /// degree among the summands.
    pub fn degree(&self) -> u32 {
        match self {
            Term::Numeric(_) => 0,
            Term::Symbol(_) => 1,
            Term::Power(_, e) => *e,
            Term::Product(_) => self
                .monomial_parts()
                .map(|(_, word)| word_degree(&word))
                .unwrap_or(0),
            Term::Sum(items) => items.iter().map(Term::degree).max().unwrap_or(0),
        }
    }

    /// Leading numeric factor: the value of a number, the numeric factor of a
    /// product, and 1 otherwise.
    pub fn coefficient(&self) -> f64 {
        match self {
            Term::Sum(_) => 1.0,
            other => other.monomial_parts().map(|(c, _)| c).unwrap_or(1.0),
        }
    }

    /// Factor the term into `(coefficient, rest)` with `coefficient * rest == self`.
    ///
    /// For monomials the rest is the bare word with coefficient 1. For sums the
    /// coefficient is the sign of the leading summand, so the rest always starts
    /// with a positive coefficient.
    pub fn split_coefficient(&self) -> (f64, Term) {
        match self {
            Term::Sum(items) => {
                let leading = items.first().map(Term::coefficient).unwrap_or(1.0);
                if leading < 0.0 {
                    (-1.0, -self)
                } else {
                    (1.0, self.clone())
                }
            }
            other => match other.monomial_parts() {
                Some((c, word)) => (c, Term::from_word(1.0, word)),
                None => (1.0, other.clone()),
            },
        }
    }

    /// `self` multiplied by itself `exponent` times.
    pub fn pow(&self, exponent: u32) -> Term {
        (0..exponent).fold(Term::one(), |acc, _| acc.mul_ref(self))
    }

    /// Noncommutative product `self * rhs`.
    pub fn mul_ref(&self, rhs: &Term) -> Term {
        match (self.monomial_parts(), rhs.monomial_parts()) {
            (Some((c1, mut w1)), Some((c2, w2))) => {
                w1.extend(w2);
                Term::from_word(c1 * c2, w1)
            }
            _ => Term::from_summands(
                self.summands()
                    .iter()
                    .flat_map(|a| rhs.summands().iter().map(move |b| a.mul_ref(b))),
            ),
        }
    }

    /// Sum `self + rhs`.
    pub fn add_ref(&self, rhs: &Term) -> Term {
        Term::from_summands(self.summands().iter().chain(rhs.summands()).cloned())
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&self, factor: f64) -> Term {
        self.mul_ref(&Term::Numeric(factor))
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Numeric(c) => write!(f, "{}", c),
            Term::Symbol(v) => write!(f, "{}", v),
            Term::Power(v, e) => write!(f, "{}^{}", v, e),
            Term::Product(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    write!(f, "{}", factor)?;
                }
                Ok(())
            }
            Term::Sum(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i == 0 {
                        write!(f, "{}", item)?;
                    } else if item.coefficient() < 0.0 {
                        write!(f, " - {}", -item)?;
                    } else {
                        write!(f, " + {}", item)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<f64> for Term {
    fn from(c: f64) -> Self {
        Term::Numeric(c)
    }
}

impl From<Var> for Term {
    fn from(v: Var) -> Self {
        Term::Symbol(v)
    }
}

impl Zero for Term {
    fn zero() -> Self {
        Term::Numeric(0.0)
    }

    fn is_zero(&self) -> bool {
        matches!(self, Term::Numeric(c) if *c == 0.0)
    }
}

impl One for Term {
    fn one() -> Self {
        Term::Numeric(1.0)
    }
}

impl Mul for Term {
    type Output = Term;

    fn mul(self, rhs: Term) -> Term {
        self.mul_ref(&rhs)
    }
}

impl<'a> Mul<&'a Term> for &'a Term {
    type Output = Term;

    fn mul(self, rhs: &'a Term) -> Term {
        self.mul_ref(rhs)
    }
}

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        self.scale(rhs)
    }
}

impl Mul<Term> for f64 {
    type Output = Term;

    fn mul(self, rhs: Term) -> Term {
        rhs.scale(self)
    }
}

impl Add for Term {
    type Output = Term;

    fn add(self, rhs: Term) -> Term {
        self.add_ref(&rhs)
    }
}

impl<'a> Add<&'a Term> for &'a Term {
    type Output = Term;

    fn add(self, rhs: &'a Term) -> Term {
        self.add_ref(rhs)
    }
}

impl Add<f64> for Term {
    type Output = Term;

    fn add(self, rhs: f64) -> Term {
        self.add_ref(&Term::Numeric(rhs))
    }
}

impl Sub for Term {
    type Output = Term;

    fn sub(self, rhs: Term) -> Term {
        self.add_ref(&-rhs)
    }
}

impl Sub<f64> for Term {
    type Output = Term;

    fn sub(self, rhs: f64) -> Term {
        self.add_ref(&Term::Numeric(-rhs))
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        self.scale(-1.0)
    }
}

impl Neg for &Term {
    type Output = Term;

    fn neg(self) -> Term {
        self.scale(-1.0)
    }
}

impl std::iter::Sum for Term {
    fn sum<I: Iterator<Item = Term>>(iter: I) -> Term {
        Term::from_summands(iter)
    }
}
