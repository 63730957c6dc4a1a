#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Tango: fill an even sized grid with suns and moons.

/// The clause encoding, decoding and file format.
pub mod solver;
