//! The common shape of every puzzle encoder.

use crate::error::Result;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Variable;
use crate::sat::solver::{Solutions, count_solutions, solve_cnf};
use log::debug;
use std::time::Instant;

/// A puzzle that can be translated to CNF and read back from a model.
pub trait Puzzle {
    /// What a solved puzzle looks like to a caller (a grid, a path, ...).
    type Solution;

    /// Builds the complete clause set: rules plus givens.
    fn to_cnf(&self) -> Cnf;

    /// The variables that identify a solution. Auxiliary variables introduced
    /// by counters are left out, so two models that only differ on them count
    /// as the same solution.
    fn projection(&self) -> Vec<Variable>;

    /// Reads the puzzle's answer out of a satisfying assignment.
    fn decode(&self, solutions: &Solutions) -> Self::Solution;

    /// Checks a candidate answer against the puzzle rules and givens,
    /// independently of the encoding.
    fn verify(&self, solution: &Self::Solution) -> bool;

    /// Human readable rendering of an answer.
    fn render(&self, solution: &Self::Solution) -> String;

    /// Encodes, solves and decodes. `Ok(None)` means the puzzle has no
    /// solution.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    fn solve(&self) -> Result<Option<Self::Solution>> {
        let time = Instant::now();
        let cnf = self.to_cnf();
        debug!(
            "encoded {} variables and {} clauses in {:?}",
            cnf.num_vars(),
            cnf.len(),
            time.elapsed()
        );
        Ok(solve_cnf(&cnf)?.map(|model| self.decode(&model)))
    }

    /// Counts solutions, stopping at `limit`.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    fn count_solutions(&self, limit: usize) -> Result<usize> {
        count_solutions(&self.to_cnf(), &self.projection(), limit)
    }

    /// Whether the puzzle has exactly one solution.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    fn is_unique(&self) -> Result<bool> {
        Ok(self.count_solutions(2)? == 1)
    }
}
