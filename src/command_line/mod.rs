//! Argument parsing and the reporting glue around the library.

pub(crate) mod cli;
