#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Mini Sudoku: a 6x6 grid with 2x3 boxes.

/// The clause encoding, decoding and file format.
pub mod solver;

/// Random puzzles with a unique solution.
pub mod generator;
