//! SAT encodings of LinkedIn-style logic puzzles: Mini Sudoku, Queens, Tango
//! and Zip.
//!
//! Every puzzle is translated into CNF with the helpers in [`sat::encoding`],
//! handed to an incremental SAT engine through the [`sat::solver::Solver`]
//! trait, and decoded back into a grid or path. Uniqueness checks enumerate
//! models with blocking clauses, and the Mini Sudoku generator digs clues out
//! of a random grid while the puzzle stays unique.

#![deny(missing_docs)]

/// Error type and result alias.
pub mod error;

pub(crate) mod parse;

/// The `Puzzle` trait implemented by every encoder.
pub mod puzzle;

/// CNF building blocks, DIMACS I/O and the SAT engine binding.
pub mod sat;

/// The 6x6 Mini Sudoku encoder and generator.
pub mod sudoku;

/// The Queens (one-star Star Battle) encoder.
pub mod queens;

/// The Tango (binary puzzle) encoder.
pub mod tango;

/// The Zip (numbered Hamiltonian path) encoder.
pub mod zip;

pub use error::{Error, Result};
pub use puzzle::Puzzle;
