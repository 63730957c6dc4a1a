#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Queens: one queen per row, column and colour region.

/// The clause encoding, decoding and file format.
pub mod solver;
