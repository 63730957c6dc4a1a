//! Mini Sudoku puzzles with a unique solution.
//!
//! A random complete grid is drawn from the engine, its blocking clause is
//! added to the solver, and clues are then removed in random order. Because
//! the drawn grid is blocked, any model found under the remaining clues
//! is a second solution, so a removal is kept only while the solver answers
//! UNSAT. Clues are passed as assumptions, which lets one incremental solver
//! serve the whole dig.

use crate::error::{Error, Result};
use crate::sat::literal::Literal;
use crate::sat::solver::{Solver, VarisatSolver};
use crate::sudoku::solver::{Board, SIZE, Variable, cells, decode_board, given_literals, rules_cnf};
use itertools::Itertools;
use log::{debug, info};

/// Fresh grids tried before giving up on a clue count.
pub const MAX_ATTEMPTS: usize = 50;

/// Generates a puzzle with exactly `pieces` clues and a unique solution.
///
/// # Errors
///
/// `PieceCount` unless `1 <= pieces <= 36`, `GenerationExhausted` when no
/// grid could be dug down that far, engine failures.
pub fn generate_mini_sudoku(pieces: usize, rng: &mut fastrand::Rng) -> Result<Board> {
    if pieces == 0 || pieces > SIZE * SIZE {
        return Err(Error::PieceCount(pieces));
    }

    let rules = rules_cnf();
    for attempt in 1..=MAX_ATTEMPTS {
        let mut solver = VarisatSolver::new(&rules);
        let solution = random_solution(&mut solver, rng)?;

        let blocking = given_literals(&solution).into_iter().map(|lit| !lit).collect_vec();
        solver.add_clause(&blocking);

        let puzzle = dig(&mut solver, &solution, pieces, rng)?;
        if puzzle.givens() == pieces {
            info!(
                "generated a {pieces}-piece puzzle on attempt {attempt} ({} solve calls)",
                solver.stats().solve_calls
            );
            return Ok(puzzle);
        }
        debug!(
            "attempt {attempt} stopped at {} pieces, wanted {pieces}",
            puzzle.givens()
        );
    }

    Err(Error::GenerationExhausted {
        pieces,
        attempts: MAX_ATTEMPTS,
    })
}

/// Draws a complete grid. The engine is deterministic, so the randomness
/// comes from a shuffled first row plus one random clue further down that is
/// kept only if it is consistent.
fn random_solution(solver: &mut VarisatSolver, rng: &mut fastrand::Rng) -> Result<Board> {
    let mut first_row = (1..=SIZE).collect_vec();
    rng.shuffle(&mut first_row);
    let mut assumptions: Vec<Literal> = first_row
        .iter()
        .enumerate()
        .map(|(c, &v)| Variable::new(0, c, v).literal())
        .collect();

    let extra = Variable::new(
        rng.usize(1..SIZE),
        rng.usize(0..SIZE),
        rng.usize(1..=SIZE),
    );
    assumptions.push(extra.literal());

    if let Some(model) = solver.solve_under(&assumptions)? {
        return Ok(decode_board(&model));
    }

    let _ = assumptions.pop();
    let model = solver
        .solve_under(&assumptions)?
        .ok_or_else(|| Error::Solver("a valid first row has no completion".to_string()))?;
    Ok(decode_board(&model))
}

/// Removes clues from `solution` while the puzzle stays unique, stopping at
/// `pieces`. Returns whatever it reached.
fn dig(
    solver: &mut VarisatSolver,
    solution: &Board,
    pieces: usize,
    rng: &mut fastrand::Rng,
) -> Result<Board> {
    let mut puzzle = solution.clone();
    let mut order = cells().collect_vec();
    rng.shuffle(&mut order);

    for (r, c) in order {
        if puzzle.givens() <= pieces {
            break;
        }
        let value = puzzle.get(r, c);
        puzzle.set(r, c, 0)?;
        if solver.solve_under(&given_literals(&puzzle))?.is_some() {
            puzzle.set(r, c, value)?;
        }
    }

    Ok(puzzle)
}
