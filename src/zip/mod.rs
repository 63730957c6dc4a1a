#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Zip: one path through every cell, visiting numbered checkpoints in order.

/// The positional path encoding, decoding and file format.
pub mod solver;
