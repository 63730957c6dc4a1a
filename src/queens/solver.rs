use crate::error::{Error, Result};
use crate::parse::content_lines;
use crate::puzzle::Puzzle;
use crate::sat::cnf::Cnf;
use crate::sat::encoding::exactly_one;
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Solutions;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A `(row, col)` cell, 0-based.
pub type Position = (usize, usize);

/// The 20 November 2025 daily board, with two queens given.
pub const EXAMPLE: [[usize; 8]; 8] = [
    [1, 2, 2, 3, 4, 4, 4, 5],
    [1, 1, 2, 3, 3, 4, 4, 5],
    [6, 1, 1, 1, 1, 4, 4, 5],
    [6, 6, 1, 1, 1, 1, 4, 5],
    [7, 7, 1, 1, 1, 1, 4, 1],
    [8, 7, 1, 1, 1, 1, 1, 1],
    [8, 8, 8, 1, 1, 1, 1, 1],
    [8, 8, 8, 8, 8, 1, 1, 1],
];
/// Queens given on [`EXAMPLE`].
pub const EXAMPLE_QUEENS: [Position; 2] = [(0, 2), (1, 4)];

/// A Queens (one-star Star Battle) instance: an n x n grid of region labels,
/// some queens already placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queens {
    grid: Vec<Vec<usize>>,
    size: usize,
    /// Cells of each region, regions ordered by label.
    regions: Vec<Vec<Position>>,
    queens: Vec<Position>,
    forbid_touching: bool,
}

impl Queens {
    /// # Errors
    ///
    /// `InvalidGrid` for an empty or non-square grid, `RegionCount` unless
    /// there are exactly n distinct labels, `OutOfBounds` for given queens
    /// off the board.
    pub fn new(grid: Vec<Vec<usize>>, queens: Vec<Position>) -> Result<Self> {
        let size = grid.len();
        if size == 0 || grid.iter().any(|row| row.len() != size) {
            return Err(Error::InvalidGrid(
                "queens grid must be square and non-empty".to_string(),
            ));
        }

        let mut by_label: FxHashMap<usize, Vec<Position>> = FxHashMap::default();
        for (r, row) in grid.iter().enumerate() {
            for (c, &label) in row.iter().enumerate() {
                by_label.entry(label).or_default().push((r, c));
            }
        }
        if by_label.len() != size {
            return Err(Error::RegionCount {
                regions: by_label.len(),
                size,
            });
        }
        let regions = by_label
            .into_iter()
            .sorted_by_key(|(label, _)| *label)
            .map(|(_, cells)| cells)
            .collect();

        if let Some(&(row, col)) = queens.iter().find(|&&(r, c)| r >= size || c >= size) {
            return Err(Error::OutOfBounds {
                row,
                col,
                rows: size,
                cols: size,
            });
        }

        Ok(Self {
            grid,
            size,
            regions,
            queens,
            forbid_touching: false,
        })
    }

    /// Also forbids queens on diagonally touching cells, as the LinkedIn
    /// variant of the puzzle does.
    #[must_use]
    pub fn forbid_touching(mut self, forbid: bool) -> Self {
        self.forbid_touching = forbid;
        self
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// The given queens.
    #[must_use]
    pub fn queens(&self) -> &[Position] {
        &self.queens
    }

    /// Region label of every cell.
    #[must_use]
    pub fn grid(&self) -> &[Vec<usize>] {
        &self.grid
    }

    /// Variable for "a queen stands on (r, c)": `r * n + c + 1`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn var(&self, r: usize, c: usize) -> Variable {
        (r * self.size + c + 1) as Variable
    }

    fn lit(&self, r: usize, c: usize) -> Literal {
        Literal::positive(self.var(r, c))
    }

    fn generate_given_clauses(&self, cnf: &mut Cnf) {
        for &(r, c) in &self.queens {
            cnf.add_clause([self.lit(r, c)]);
        }
    }

    fn generate_row_col_clauses(&self, cnf: &mut Cnf) {
        for i in 0..self.size {
            let row = (0..self.size).map(|c| self.lit(i, c)).collect_vec();
            exactly_one(cnf, &row);
            let col = (0..self.size).map(|r| self.lit(r, i)).collect_vec();
            exactly_one(cnf, &col);
        }
    }

    fn generate_region_clauses(&self, cnf: &mut Cnf) {
        for region in &self.regions {
            let cells = region.iter().map(|&(r, c)| self.lit(r, c)).collect_vec();
            exactly_one(cnf, &cells);
        }
    }

    /// Rows and columns already keep queens from touching orthogonally, so
    /// only the two downward diagonals of each cell need a clause.
    fn generate_touching_clauses(&self, cnf: &mut Cnf) {
        for r in 0..self.size.saturating_sub(1) {
            for c in 0..self.size {
                if c > 0 {
                    cnf.add_clause([!self.lit(r, c), !self.lit(r + 1, c - 1)]);
                }
                if c + 1 < self.size {
                    cnf.add_clause([!self.lit(r, c), !self.lit(r + 1, c + 1)]);
                }
            }
        }
    }
}

impl Puzzle for Queens {
    type Solution = Vec<Position>;

    fn to_cnf(&self) -> Cnf {
        let mut cnf = Cnf::new();
        #[allow(clippy::cast_possible_truncation)]
        cnf.reserve_vars((self.size * self.size) as Variable);
        self.generate_given_clauses(&mut cnf);
        self.generate_row_col_clauses(&mut cnf);
        self.generate_region_clauses(&mut cnf);
        if self.forbid_touching {
            self.generate_touching_clauses(&mut cnf);
        }
        cnf
    }

    fn projection(&self) -> Vec<Variable> {
        (0..self.size)
            .cartesian_product(0..self.size)
            .map(|(r, c)| self.var(r, c))
            .collect()
    }

    fn decode(&self, solutions: &Solutions) -> Vec<Position> {
        (0..self.size)
            .cartesian_product(0..self.size)
            .filter(|&(r, c)| solutions.value(self.var(r, c)))
            .collect()
    }

    fn verify(&self, solution: &Vec<Position>) -> bool {
        let n = self.size;
        if solution.len() != n || solution.iter().any(|&(r, c)| r >= n || c >= n) {
            return false;
        }
        let placed: FxHashSet<Position> = solution.iter().copied().collect();

        let rows_ok = solution.iter().map(|&(r, _)| r).all_unique();
        let cols_ok = solution.iter().map(|&(_, c)| c).all_unique();
        let regions_ok = solution.iter().map(|&(r, c)| self.grid[r][c]).all_unique();
        let givens_ok = self.queens.iter().all(|q| placed.contains(q));
        let touching_ok = !self.forbid_touching
            || solution
                .iter()
                .tuple_combinations()
                .all(|(&(r1, c1), &(r2, c2))| r1.abs_diff(r2) > 1 || c1.abs_diff(c2) > 1);

        rows_ok && cols_ok && regions_ok && givens_ok && touching_ok
    }

    fn render(&self, solution: &Vec<Position>) -> String {
        let placed: FxHashSet<Position> = solution.iter().copied().collect();
        render_grid(&self.grid, &placed)
    }
}

fn render_grid(grid: &[Vec<usize>], queens: &FxHashSet<Position>) -> String {
    let width = grid.iter().flatten().max().map_or(1, |m| m.to_string().len());
    grid.iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, label)| {
                    if queens.contains(&(r, c)) {
                        format!("{:>width$}", "Q")
                    } else {
                        format!("{label:>width$}")
                    }
                })
                .join(" ")
        })
        .join("\n")
}

impl Display for Queens {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let given: FxHashSet<Position> = self.queens.iter().copied().collect();
        writeln!(f, "{}", render_grid(&self.grid, &given))
    }
}

/// Parses rows of whitespace separated region labels. Labels are arbitrary
/// tokens (`1`, `a`, `red`); a trailing `*` marks a given queen.
///
/// # Errors
///
/// `Parse` for an empty label, plus everything [`Queens::new`] rejects.
pub fn parse_queens(text: &str) -> Result<Queens> {
    let mut labels: FxHashMap<String, usize> = FxHashMap::default();
    let mut grid = Vec::new();
    let mut queens = Vec::new();

    for (r, (line, content)) in content_lines(text).enumerate() {
        let mut row = Vec::new();
        for (c, token) in content.split_whitespace().enumerate() {
            let (name, is_queen) = token
                .strip_suffix('*')
                .map_or((token, false), |name| (name, true));
            if name.is_empty() {
                return Err(Error::parse(line, "queen marker without a region label"));
            }
            let next = labels.len() + 1;
            row.push(*labels.entry(name.to_string()).or_insert(next));
            if is_queen {
                queens.push((r, c));
            }
        }
        grid.push(row);
    }

    Queens::new(grid, queens)
}

/// # Errors
///
/// I/O errors and everything [`parse_queens`] rejects.
pub fn parse_queens_file(path: impl AsRef<Path>) -> Result<Queens> {
    parse_queens(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Queens {
        let grid = EXAMPLE.iter().map(|row| row.to_vec()).collect();
        Queens::new(grid, EXAMPLE_QUEENS.to_vec()).unwrap()
    }

    #[test]
    fn test_daily_11_20_2025() {
        let queens = example();
        let solution = queens.solve().unwrap().expect("daily board is solvable");
        assert_eq!(solution.len(), 8);
        assert!(solution.contains(&(0, 2)));
        assert!(solution.contains(&(1, 4)));
        assert!(queens.verify(&solution));
    }

    #[test]
    fn test_touching_rule_makes_daily_unique() {
        let plain = example();
        assert_eq!(plain.count_solutions(10).unwrap(), 2);

        let queens = plain.forbid_touching(true);
        assert!(queens.is_unique().unwrap());
        let solution = queens.solve().unwrap().unwrap();
        assert!(queens.verify(&solution));
    }

    #[test]
    fn test_region_count_mismatch() {
        let grid = vec![vec![1, 1], vec![1, 1]];
        assert!(matches!(
            Queens::new(grid, vec![]),
            Err(Error::RegionCount { regions: 1, size: 2 })
        ));
    }

    #[test]
    fn test_non_square_grid() {
        let grid = vec![vec![1, 2, 3], vec![1, 2]];
        assert!(matches!(Queens::new(grid, vec![]), Err(Error::InvalidGrid(_))));
    }

    #[test]
    fn test_queen_out_of_bounds() {
        let grid = vec![vec![1]];
        assert!(matches!(
            Queens::new(grid, vec![(0, 3)]),
            Err(Error::OutOfBounds { row: 0, col: 3, .. })
        ));
    }

    #[test]
    fn test_conflicting_givens_unsat() {
        let grid = (0..4).map(|r| vec![r + 1; 4]).collect();
        let queens = Queens::new(grid, vec![(0, 0), (1, 0)]).unwrap();
        assert_eq!(queens.solve().unwrap(), None);
    }

    #[test]
    fn test_single_cell() {
        let queens = Queens::new(vec![vec![9]], vec![]).unwrap();
        assert_eq!(queens.solve().unwrap(), Some(vec![(0, 0)]));
        assert!(queens.is_unique().unwrap());
    }

    #[test]
    fn test_rows_as_regions_counts_permutations() {
        // With one region per row the region rule is implied, so every
        // permutation matrix is a solution: 4! of them.
        let grid = (0..4).map(|r| vec![r; 4]).collect();
        let queens = Queens::new(grid, vec![]).unwrap();
        assert_eq!(queens.count_solutions(100).unwrap(), 24);
    }

    #[test]
    fn test_parse_queens() {
        let text = "a a b\n\
                    a c* b\n\
                    c c b\n";
        let queens = parse_queens(text).unwrap();
        assert_eq!(queens.size(), 3);
        assert_eq!(queens.queens(), &[(1, 1)]);
        assert_eq!(queens.grid()[2], vec![3, 3, 2]);
    }

    #[test]
    fn test_parse_queens_rejects_bare_marker() {
        assert!(matches!(
            parse_queens("1 *\n2 2\n"),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_render_marks_queens() {
        let queens = Queens::new(vec![vec![1, 2], vec![2, 2]], vec![]).unwrap();
        let rendered = queens.render(&vec![(0, 0)]);
        assert_eq!(rendered, "Q 2\n2 2");
    }
}
