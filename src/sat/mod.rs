//! CNF construction, constraint encodings and the SAT backend seam.

pub mod cnf;
pub mod dimacs;
pub mod encoding;
pub mod literal;
pub mod solver;
