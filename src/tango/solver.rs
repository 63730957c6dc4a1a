use crate::error::{Error, Result};
use crate::parse::{cell_pair, content_lines};
use crate::puzzle::Puzzle;
use crate::sat::cnf::Cnf;
use crate::sat::encoding::{at_least_one, equal, exactly_k, not_equal};
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Solutions;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A `(row, col)` cell, 0-based.
pub type Cell = (usize, usize);
/// Two orthogonally adjacent cells joined by a clue.
pub type Pair = (Cell, Cell);

/// The two symbols of a Tango grid. A Sun is a true variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Written `S`.
    Sun,
    /// Written `M`.
    Moon,
}

impl Symbol {
    /// `Sun` for a true variable, `Moon` otherwise.
    #[must_use]
    pub const fn from_bool(sun: bool) -> Self {
        if sun { Self::Sun } else { Self::Moon }
    }

    /// Whether this is a Sun.
    #[must_use]
    pub const fn is_sun(self) -> bool {
        matches!(self, Self::Sun)
    }

    /// The character used in files and rendering.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Sun => 'S',
            Self::Moon => 'M',
        }
    }
}

/// A Tango instance: an even sized grid of suns and moons with `=` and `x`
/// clues between cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tango {
    size: usize,
    grid: Vec<Vec<Option<Symbol>>>,
    equals: Vec<Pair>,
    diffs: Vec<Pair>,
}

impl Tango {
    /// # Errors
    ///
    /// `OddSize` for an odd or zero side, `InvalidGrid` for a non-square
    /// grid, `OutOfBounds` for clue cells off the board.
    pub fn new(grid: Vec<Vec<Option<Symbol>>>, equals: Vec<Pair>, diffs: Vec<Pair>) -> Result<Self> {
        let size = grid.len();
        if size == 0 || size % 2 != 0 {
            return Err(Error::OddSize(size));
        }
        if let Some(row) = grid.iter().find(|row| row.len() != size) {
            return Err(Error::InvalidGrid(format!(
                "tango grid is {size} rows high but a row has {} cells",
                row.len()
            )));
        }
        for &(row, col) in equals.iter().chain(&diffs).flat_map(|(a, b)| [a, b]) {
            if row >= size || col >= size {
                return Err(Error::OutOfBounds {
                    row,
                    col,
                    rows: size,
                    cols: size,
                });
            }
        }

        Ok(Self {
            size,
            grid,
            equals,
            diffs,
        })
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Variable for "(r, c) is a sun".
    #[allow(clippy::cast_possible_truncation)]
    const fn var(&self, r: usize, c: usize) -> Variable {
        (r * self.size + c + 1) as Variable
    }

    fn lit(&self, (r, c): Cell) -> Literal {
        Literal::positive(self.var(r, c))
    }

    fn generate_given_clauses(&self, cnf: &mut Cnf) {
        for (r, row) in self.grid.iter().enumerate() {
            for (c, symbol) in row.iter().enumerate() {
                if let Some(symbol) = symbol {
                    cnf.add_clause([Literal::new(self.var(r, c), symbol.is_sun())]);
                }
            }
        }
    }

    fn generate_pair_clauses(&self, cnf: &mut Cnf) {
        for &(a, b) in &self.equals {
            equal(cnf, self.lit(a), self.lit(b));
        }
        for &(a, b) in &self.diffs {
            not_equal(cnf, self.lit(a), self.lit(b));
        }
    }

    /// No three consecutive equal symbols, in rows or columns.
    fn generate_run_clauses(&self, cnf: &mut Cnf) {
        for i in 0..self.size {
            for j in 0..self.size.saturating_sub(2) {
                let horizontal = [self.lit((i, j)), self.lit((i, j + 1)), self.lit((i, j + 2))];
                let vertical = [self.lit((j, i)), self.lit((j + 1, i)), self.lit((j + 2, i))];
                for run in [horizontal, vertical] {
                    at_least_one(cnf, &run);
                    at_least_one(cnf, &run.map(|lit| !lit));
                }
            }
        }
    }

    fn generate_balance_clauses(&self, cnf: &mut Cnf) {
        let half = self.size / 2;
        for i in 0..self.size {
            let row = (0..self.size).map(|c| self.lit((i, c))).collect_vec();
            exactly_k(cnf, &row, half);
            let col = (0..self.size).map(|r| self.lit((r, i))).collect_vec();
            exactly_k(cnf, &col, half);
        }
    }
}

impl Puzzle for Tango {
    type Solution = Vec<Vec<Symbol>>;

    fn to_cnf(&self) -> Cnf {
        let mut cnf = Cnf::new();
        #[allow(clippy::cast_possible_truncation)]
        cnf.reserve_vars((self.size * self.size) as Variable);
        self.generate_given_clauses(&mut cnf);
        self.generate_pair_clauses(&mut cnf);
        self.generate_run_clauses(&mut cnf);
        self.generate_balance_clauses(&mut cnf);
        cnf
    }

    fn projection(&self) -> Vec<Variable> {
        #[allow(clippy::cast_possible_truncation)]
        let cells = (self.size * self.size) as Variable;
        (1..=cells).collect()
    }

    fn decode(&self, solutions: &Solutions) -> Vec<Vec<Symbol>> {
        (0..self.size)
            .map(|r| {
                (0..self.size)
                    .map(|c| Symbol::from_bool(solutions.value(self.var(r, c))))
                    .collect()
            })
            .collect()
    }

    fn verify(&self, solution: &Vec<Vec<Symbol>>) -> bool {
        let n = self.size;
        if solution.len() != n || solution.iter().any(|row| row.len() != n) {
            return false;
        }
        let at = |(r, c): Cell| solution[r][c];

        let givens_ok = self.grid.iter().zip(solution).all(|(given, row)| {
            given
                .iter()
                .zip(row)
                .all(|(g, s)| g.is_none_or(|g| g == *s))
        });
        let equals_ok = self.equals.iter().all(|&(a, b)| at(a) == at(b));
        let diffs_ok = self.diffs.iter().all(|&(a, b)| at(a) != at(b));

        let lines_ok = (0..n)
            .flat_map(|i| {
                [
                    (0..n).map(|c| solution[i][c]).collect_vec(),
                    (0..n).map(|r| solution[r][i]).collect_vec(),
                ]
            })
            .all(|line| {
                let suns = line.iter().filter(|s| s.is_sun()).count();
                suns * 2 == n && line.windows(3).all(|w| !(w[0] == w[1] && w[1] == w[2]))
            });

        givens_ok && equals_ok && diffs_ok && lines_ok
    }

    fn render(&self, solution: &Vec<Vec<Symbol>>) -> String {
        solution
            .iter()
            .map(|row| row.iter().map(|s| s.as_char()).join(" "))
            .join("\n")
    }
}

impl Display for Tango {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in &self.grid {
            let line = row
                .iter()
                .map(|cell| cell.map_or('.', Symbol::as_char))
                .join(" ");
            writeln!(f, "{line}")?;
        }
        for ((r1, c1), (r2, c2)) in &self.equals {
            writeln!(f, "= {r1} {c1} {r2} {c2}")?;
        }
        for ((r1, c1), (r2, c2)) in &self.diffs {
            writeln!(f, "x {r1} {c1} {r2} {c2}")?;
        }
        Ok(())
    }
}

/// Parses grid rows of `S`, `M` and `.` (spaces optional) followed by clue
/// lines `= r1 c1 r2 c2` and `x r1 c1 r2 c2`.
///
/// # Errors
///
/// `Parse` for unknown cells or malformed clues, plus everything
/// [`Tango::new`] rejects.
pub fn parse_tango(text: &str) -> Result<Tango> {
    let mut grid = Vec::new();
    let mut equals = Vec::new();
    let mut diffs = Vec::new();

    for (line, content) in content_lines(text) {
        let tokens = content.split_whitespace().collect_vec();
        match tokens.as_slice() {
            ["=", rest @ ..] => equals.push(cell_pair(line, rest)?),
            ["x" | "X", rest @ ..] => diffs.push(cell_pair(line, rest)?),
            _ => {
                if !equals.is_empty() || !diffs.is_empty() {
                    return Err(Error::parse(line, "grid row after clue lines"));
                }
                let row = content
                    .chars()
                    .filter(|ch| !ch.is_whitespace())
                    .map(|ch| match ch.to_ascii_uppercase() {
                        'S' => Ok(Some(Symbol::Sun)),
                        'M' => Ok(Some(Symbol::Moon)),
                        '.' => Ok(None),
                        _ => Err(Error::parse(line, format!("invalid cell '{ch}'"))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                grid.push(row);
            }
        }
    }

    Tango::new(grid, equals, diffs)
}

/// # Errors
///
/// I/O errors and everything [`parse_tango`] rejects.
pub fn parse_tango_file(path: impl AsRef<Path>) -> Result<Tango> {
    parse_tango(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
        . M S S M .\n\
        M . . . . M\n\
        S . . . . M\n\
        S . . . . S\n\
        M . . . . S\n\
        . S M M S .\n\
        = 1 1 2 1\n\
        = 3 1 3 2\n\
        x 1 2 2 2\n\
        x 1 3 1 4\n\
        x 2 3 2 4\n\
        x 3 3 4 3\n\
        x 3 4 4 4\n\
        x 4 1 4 2\n";

    #[test]
    fn test_example_solves() {
        let tango = parse_tango(EXAMPLE).unwrap();
        assert_eq!(tango.size(), 6);
        let solution = tango.solve().unwrap().expect("example is solvable");
        assert!(tango.verify(&solution));
        assert_eq!(
            tango.render(&solution),
            "M M S S M S\n\
             M S S M S M\n\
             S S M S M M\n\
             S M M S M S\n\
             M M S M S S\n\
             S S M M S M"
        );
    }

    #[test]
    fn test_example_is_unique() {
        let tango = parse_tango(EXAMPLE).unwrap();
        assert!(tango.is_unique().unwrap());
    }

    #[test]
    fn test_empty_two_by_two() {
        let tango = Tango::new(vec![vec![None; 2]; 2], vec![], vec![]).unwrap();
        // SM/MS and MS/SM.
        assert_eq!(tango.count_solutions(10).unwrap(), 2);
    }

    #[test]
    fn test_contradicting_clues_are_unsat() {
        let pair = ((0, 0), (0, 1));
        let tango = Tango::new(vec![vec![None; 2]; 2], vec![pair], vec![pair]).unwrap();
        assert_eq!(tango.solve().unwrap(), None);
    }

    #[test]
    fn test_odd_size() {
        assert!(matches!(
            Tango::new(vec![vec![None; 3]; 3], vec![], vec![]),
            Err(Error::OddSize(3))
        ));
        assert!(matches!(
            Tango::new(vec![], vec![], vec![]),
            Err(Error::OddSize(0))
        ));
    }

    #[test]
    fn test_clue_out_of_bounds() {
        let result = Tango::new(vec![vec![None; 2]; 2], vec![((0, 0), (0, 2))], vec![]);
        assert!(matches!(result, Err(Error::OutOfBounds { row: 0, col: 2, .. })));
    }

    #[test]
    fn test_verify_rejects_triple() {
        use Symbol::{Moon as M, Sun as S};
        let tango = Tango::new(vec![vec![None; 4]; 4], vec![], vec![]).unwrap();
        let bad = vec![
            vec![S, S, S, M],
            vec![M, M, S, S],
            vec![S, M, M, S],
            vec![M, S, M, M],
        ];
        assert!(!tango.verify(&bad));
    }

    #[test]
    fn test_parse_rejects_unknown_cell() {
        assert!(matches!(
            parse_tango("S M\nM Q\n"),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_display_round_trips() {
        let tango = parse_tango(EXAMPLE).unwrap();
        assert_eq!(parse_tango(&tango.to_string()).unwrap(), tango);
    }
}
