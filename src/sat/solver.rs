#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! The seam between the puzzle encoders and the SAT engine.
//!
//! The encoders only ever talk to the `Solver` trait. The one backend shipped
//! with the crate forwards to `varisat`, an incremental CDCL solver, which is
//! where all search, propagation and clause learning happens.

use crate::error::{Error, Result};
use crate::sat::cnf::Cnf;
use crate::sat::literal::{Literal, Variable};
use bit_vec::BitVec;
use itertools::Itertools;
use log::{debug, trace};
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use varisat::ExtendFormula;

/// A satisfying assignment, one bit per variable (bit 0 is unused).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solutions {
    values: BitVec,
}

impl Solutions {
    /// All variables up to `num_vars` start out false.
    #[must_use]
    pub fn new(num_vars: u32) -> Self {
        Self {
            values: BitVec::from_elem(num_vars as usize + 1, false),
        }
    }

    /// Model in which exactly `vars` are true.
    #[must_use]
    pub fn from_true_vars(num_vars: u32, vars: impl IntoIterator<Item = Variable>) -> Self {
        let mut solutions = Self::new(num_vars);
        for var in vars {
            solutions.set(var, true);
        }
        solutions
    }

    fn set(&mut self, var: Variable, value: bool) {
        let index = var as usize;
        if index >= self.values.len() {
            self.values.grow(index + 1 - self.values.len(), false);
        }
        self.values.set(index, value);
    }

    /// Value of `var`; variables the engine never saw are false.
    #[must_use]
    pub fn value(&self, var: Variable) -> bool {
        self.values.get(var as usize).unwrap_or(false)
    }

    /// Whether `lit` is true under this assignment.
    #[must_use]
    pub fn check(&self, lit: Literal) -> bool {
        self.value(lit.variable()) == lit.polarity()
    }

    /// Number of variables the model covers.
    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.values.len() - 1
    }

    /// Literals of `vars` as they hold in this model.
    #[must_use]
    pub fn literals_of(&self, vars: &[Variable]) -> Vec<Literal> {
        vars.iter()
            .map(|&var| Literal::new(var, self.value(var)))
            .collect()
    }
}

impl Display for Solutions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v")?;
        for var in 1..=self.num_vars() {
            #[allow(clippy::cast_possible_truncation)]
            let lit = Literal::new(var as Variable, self.values[var]);
            write!(f, " {lit}")?;
        }
        write!(f, " 0")
    }
}

/// Counters collected by a backend across all of its solve calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolutionStats {
    /// Variables known to the engine.
    pub variables: usize,
    /// Clauses loaded, including blocking clauses added later.
    pub clauses: usize,
    /// Total literal occurrences over those clauses.
    pub literals: usize,
    /// Number of `solve_under` calls.
    pub solve_calls: usize,
    /// Wall-clock time spent inside the engine.
    pub solve_time: Duration,
}

/// An incremental SAT engine: clauses can be added between calls and every
/// call may carry its own assumptions.
pub trait Solver {
    /// Loads every clause of `cnf` into a fresh engine.
    fn new(cnf: &Cnf) -> Self
    where
        Self: Sized;

    /// Adds a clause permanently.
    fn add_clause(&mut self, clause: &[Literal]);

    /// Solves under temporary `assumptions`; `Ok(None)` means UNSAT.
    ///
    /// # Errors
    ///
    /// If the engine fails for a reason other than unsatisfiability.
    fn solve_under(&mut self, assumptions: &[Literal]) -> Result<Option<Solutions>>;

    /// Solves without assumptions.
    ///
    /// # Errors
    ///
    /// See [`Solver::solve_under`].
    fn solve(&mut self) -> Result<Option<Solutions>> {
        self.solve_under(&[])
    }

    /// Counters accumulated so far.
    fn stats(&self) -> SolutionStats;
}

/// `varisat` backend.
pub struct VarisatSolver {
    inner: varisat::Solver<'static>,
    num_vars: u32,
    stats: SolutionStats,
}

impl std::fmt::Debug for VarisatSolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VarisatSolver")
            .field("num_vars", &self.num_vars)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Solver for VarisatSolver {
    fn new(cnf: &Cnf) -> Self {
        let mut inner = varisat::Solver::new();
        for _ in 0..cnf.num_vars() {
            let _ = inner.new_var();
        }

        for clause in cnf {
            let lits = clause.iter().map(|&lit| varisat::Lit::from(lit)).collect_vec();
            inner.add_clause(&lits);
        }

        debug!(
            "loaded {} variables, {} clauses, {} literals",
            cnf.num_vars(),
            cnf.len(),
            cnf.literal_count()
        );

        Self {
            inner,
            num_vars: cnf.num_vars(),
            stats: SolutionStats {
                variables: cnf.num_vars() as usize,
                clauses: cnf.len(),
                literals: cnf.literal_count(),
                ..SolutionStats::default()
            },
        }
    }

    fn add_clause(&mut self, clause: &[Literal]) {
        for lit in clause {
            while lit.variable() > self.num_vars {
                let _ = self.inner.new_var();
                self.num_vars += 1;
            }
        }
        let lits = clause.iter().map(|&lit| varisat::Lit::from(lit)).collect_vec();
        self.inner.add_clause(&lits);
        self.stats.clauses += 1;
        self.stats.literals += clause.len();
    }

    fn solve_under(&mut self, assumptions: &[Literal]) -> Result<Option<Solutions>> {
        let lits = assumptions
            .iter()
            .map(|&lit| varisat::Lit::from(lit))
            .collect_vec();
        self.inner.assume(&lits);

        let time = Instant::now();
        let outcome = self.inner.solve();
        let elapsed = time.elapsed();

        self.stats.solve_calls += 1;
        self.stats.solve_time += elapsed;

        let satisfiable = outcome.map_err(|e| Error::Solver(e.to_string()))?;
        trace!(
            "solve call {} with {} assumptions: {} in {elapsed:?}",
            self.stats.solve_calls,
            assumptions.len(),
            if satisfiable { "SAT" } else { "UNSAT" }
        );

        if !satisfiable {
            return Ok(None);
        }

        let model = self
            .inner
            .model()
            .ok_or_else(|| Error::Solver("satisfiable answer without a model".to_string()))?;

        let true_vars = model
            .into_iter()
            .filter(|lit| lit.is_positive())
            .map(|lit| Literal::from(lit).variable());
        Ok(Some(Solutions::from_true_vars(self.num_vars, true_vars)))
    }

    fn stats(&self) -> SolutionStats {
        self.stats
    }
}

/// Collects up to `limit` models that differ on the `projection` variables.
///
/// Each model found is excluded with a blocking clause over `projection`
/// before the next call, so the solver's clause set grows with every model.
///
/// # Errors
///
/// Propagates engine failures.
pub fn enumerate<S: Solver>(
    solver: &mut S,
    projection: &[Variable],
    limit: usize,
) -> Result<Vec<Solutions>> {
    let mut found = Vec::new();
    while found.len() < limit {
        let Some(model) = solver.solve()? else {
            break;
        };
        let blocking = model
            .literals_of(projection)
            .into_iter()
            .map(|lit| !lit)
            .collect_vec();
        trace!("blocking model {} on {} variables", found.len() + 1, blocking.len());
        solver.add_clause(&blocking);
        found.push(model);
    }
    Ok(found)
}

/// One-shot solve of `cnf`.
///
/// # Errors
///
/// Propagates engine failures.
pub fn solve_cnf(cnf: &Cnf) -> Result<Option<Solutions>> {
    VarisatSolver::new(cnf).solve()
}

/// Number of distinct projected models, stopping once `limit` is reached.
///
/// # Errors
///
/// Propagates engine failures.
pub fn count_solutions(cnf: &Cnf, projection: &[Variable], limit: usize) -> Result<usize> {
    let mut solver = VarisatSolver::new(cnf);
    Ok(enumerate(&mut solver, projection, limit)?.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_simple_formula() {
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2], vec![-1], vec![2, 3]]);
        let mut solver = VarisatSolver::new(&cnf);
        let model = solver.solve().unwrap().expect("formula is satisfiable");
        assert!(!model.value(1));
        assert!(model.value(2));
        assert!(cnf.verify(&model));
    }

    #[test]
    fn test_unsat_is_none() {
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1], vec![-1]]);
        let mut solver = VarisatSolver::new(&cnf);
        assert_eq!(solver.solve().unwrap(), None);
    }

    #[test]
    fn test_assumptions_are_temporary() {
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2]]);
        let mut solver = VarisatSolver::new(&cnf);
        let refuted = solver
            .solve_under(&[Literal::negative(1), Literal::negative(2)])
            .unwrap();
        assert!(refuted.is_none());
        assert!(solver.solve().unwrap().is_some());
        assert_eq!(solver.stats().solve_calls, 2);
    }

    #[test]
    fn test_model_under_assumptions() {
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2], vec![-1, 3]]);
        let mut solver = VarisatSolver::new(&cnf);

        let model = solver
            .solve_under(&[Literal::positive(1)])
            .unwrap()
            .expect("x1 is consistent with the formula");
        assert!(model.value(1));
        assert!(model.value(3));
        assert!(cnf.verify(&model));

        let model = solver
            .solve_under(&[Literal::negative(2)])
            .unwrap()
            .expect("!x2 is consistent with the formula");
        assert!(!model.value(2));
        assert!(model.value(1));
    }

    #[test]
    fn test_enumerate_all_models() {
        // x1 ∨ x2 has three models over {x1, x2}.
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1, 2]]);
        assert_eq!(count_solutions(&cnf, &[1, 2], 10).unwrap(), 3);
        assert_eq!(count_solutions(&cnf, &[1, 2], 2).unwrap(), 2);
    }

    #[test]
    fn test_enumerate_projects_out_auxiliaries() {
        // x3 is free, but only x1 is projected: x1 is forced, so one model.
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1], vec![3, -3]]);
        assert_eq!(count_solutions(&cnf, &[1], 10).unwrap(), 1);
    }

    #[test]
    fn test_solutions_display() {
        let solutions = Solutions::from_true_vars(3, [1, 3]);
        assert_eq!(solutions.to_string(), "v 1 -2 3 0");
    }
}
