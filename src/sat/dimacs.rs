#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A reader for the DIMACS CNF format.
//!
//! Comment lines start with `c`, the problem line with `p`. The counts on
//! the problem line are not trusted; the variable count is derived from the
//! clauses. A line holding only `%` ends the data, as in the SATLIB files.
//! Puzzles are written out through `Cnf`'s `Display` impl.

use crate::error::{Error, Result};
use crate::sat::cnf::Cnf;
use crate::sat::literal::Literal;
use std::io::{self, BufRead};
use std::path::Path;

/// Largest DIMACS variable the engine can represent.
const MAX_VARIABLE: usize = varisat::Var::max_count();

/// Parses DIMACS text from `reader`.
///
/// A clause may span several lines; it ends at the first `0`. A trailing
/// clause without a terminating `0` is still accepted.
///
/// # Errors
///
/// I/O failures, any token that is not an integer, and variables beyond
/// what the engine can represent.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf> {
    let mut cnf = Cnf::new();
    let mut pending: Vec<Literal> = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            Some(&"%") => break,
            None => {}
            Some(first) if first.starts_with('c') || first.starts_with('p') => {}
            Some(_) => {
                for token in parts {
                    let value = token.parse::<i32>().map_err(|e| {
                        Error::parse(index + 1, format!("invalid literal '{token}': {e}"))
                    })?;
                    if value.unsigned_abs() as usize > MAX_VARIABLE {
                        return Err(Error::parse(
                            index + 1,
                            format!("variable in '{token}' exceeds {MAX_VARIABLE}"),
                        ));
                    }
                    if value == 0 {
                        cnf.add_clause(pending.drain(..));
                    } else {
                        pending.push(Literal::from_i32(value));
                    }
                }
            }
        }
    }

    if !pending.is_empty() {
        cnf.add_clause(pending);
    }

    Ok(cnf)
}

/// Opens `path` and parses it as DIMACS.
///
/// # Errors
///
/// See [`parse_dimacs`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<Cnf> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_simple_dimacs() {
        let dimacs_content = "c This is a comment\n\
                              p cnf 3 2\n\
                              1 -2 0\n\
                              2 3 0\n";
        let cnf = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(cnf.len(), 2, "Should parse 2 clauses");
        assert_eq!(cnf.num_vars(), 3);

        let clauses: Vec<Vec<i32>> = cnf
            .iter()
            .map(|c| c.iter().map(|l| l.to_i32()).collect())
            .collect();
        assert_eq!(clauses, vec![vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn test_parse_dimacs_with_end_marker() {
        let dimacs_content = "p cnf 2 2\n\
                              \n\
                              1 0\n\
                              \n\
                              -2 0\n\
                              %\n\
                              c this should be ignored\n\
                              3 0\n";
        let cnf = parse_dimacs(Cursor::new(dimacs_content)).unwrap();

        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.num_vars(), 2);
    }

    #[test]
    fn test_parse_clause_across_lines() {
        let cnf = parse_dimacs(Cursor::new("1 2\n3 0 -1\n")).unwrap();
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.literal_count(), 4);
    }

    #[test]
    fn test_parse_dimacs_malformed_literal() {
        let err = parse_dimacs(Cursor::new("p cnf 1 1\n1 abc 0\n")).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_comment_without_space() {
        let cnf = parse_dimacs(Cursor::new("c\ncomment\n1 2 0\n")).unwrap();
        assert_eq!(cnf.len(), 1);
    }

    #[test]
    fn test_parse_dimacs_variable_too_large() {
        let too_large = (MAX_VARIABLE + 1).to_string();
        for token in ["-2147483648", too_large.as_str()] {
            let text = format!("p cnf 1 2\n1 0\n{token} 0\n");
            match parse_dimacs(Cursor::new(text)).unwrap_err() {
                Error::Parse { line, message } => {
                    assert_eq!(line, 3);
                    assert!(message.contains(token));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        let largest = format!("-{MAX_VARIABLE} 0\n");
        let cnf = parse_dimacs(Cursor::new(largest)).unwrap();
        assert_eq!(cnf.num_vars() as usize, MAX_VARIABLE);
    }

    #[test]
    fn test_export_then_parse() {
        let cnf = Cnf::from_dimacs_clauses(vec![vec![1, -3], vec![2], vec![-1, -2, 3]]);
        let parsed = parse_dimacs(Cursor::new(cnf.to_string())).unwrap();
        assert_eq!(parsed, cnf);
    }
}
