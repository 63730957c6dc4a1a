#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Conjunctive normal form container used by every puzzle encoder.
//!
//! A `Cnf` owns its clauses and hands out fresh variables, so encoders can
//! reserve the variables of their direct encoding up front and then ask for
//! auxiliary variables (counters, Tseitin outputs) as they go.

use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Solutions;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// Most puzzle clauses are binary "at most one" clauses, so four inline
/// slots avoid a heap allocation for nearly all of them.
pub type Clause = SmallVec<[Literal; 4]>;

/// A conjunction of clauses over variables `1..=num_vars`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cnf {
    clauses: Vec<Clause>,
    num_vars: u32,
}

impl Cnf {
    /// An empty, trivially satisfiable formula.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clauses: Vec::new(),
            num_vars: 0,
        }
    }

    /// Builds a formula from DIMACS integer clauses.
    ///
    /// The variable count is taken from the largest variable mentioned.
    #[must_use]
    pub fn from_dimacs_clauses<I, C>(clauses: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        let mut cnf = Self::new();
        for clause in clauses {
            let clause: Clause = clause.into_iter().map(Literal::from_i32).collect();
            cnf.add_clause(clause);
        }
        cnf
    }

    /// Makes sure variables `1..=n` exist. Direct encodings number their
    /// variables by formula, so they reserve the whole block first.
    pub fn reserve_vars(&mut self, n: u32) {
        self.num_vars = self.num_vars.max(n);
    }

    /// Allocates a fresh variable.
    pub fn new_var(&mut self) -> Variable {
        self.num_vars += 1;
        self.num_vars
    }

    /// Allocates `n` fresh variables and returns their positive literals.
    pub fn new_vars(&mut self, n: usize) -> Vec<Literal> {
        (0..n).map(|_| Literal::positive(self.new_var())).collect()
    }

    /// Adds a clause. An empty clause makes the formula unsatisfiable.
    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = Literal>) {
        let clause: Clause = clause.into_iter().collect();
        if let Some(max) = clause.iter().map(|lit| lit.variable()).max() {
            self.num_vars = self.num_vars.max(max);
        }
        self.clauses.push(clause);
    }

    /// Highest variable in use, reserved or allocated.
    #[must_use]
    pub const fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether the formula has no clauses at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Total number of literal occurrences over all clauses.
    #[must_use]
    pub fn literal_count(&self) -> usize {
        self.clauses.iter().map(SmallVec::len).sum()
    }

    /// The clauses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Checks that `solutions` satisfies every clause.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|&lit| solutions.check(lit)))
    }
}

impl Display for Cnf {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.clauses.len())?;
        for clause in &self.clauses {
            for lit in clause {
                write!(f, "{lit} ")?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Cnf {
    type Item = &'a Clause;
    type IntoIter = std::slice::Iter<'a, Clause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}
