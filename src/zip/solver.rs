use crate::error::{Error, Result};
use crate::parse::{cell_pair, content_lines, number};
use crate::puzzle::Puzzle;
use crate::sat::cnf::Cnf;
use crate::sat::encoding::{exactly_one, implies, or_equals};
use crate::sat::literal::{Literal, Variable};
use crate::sat::solver::Solutions;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{Display, Formatter};
use std::path::Path;

/// A `(row, col)` cell, 0-based.
pub type Cell = (usize, usize);
/// A wall between two orthogonally adjacent cells.
pub type Wall = (Cell, Cell);

/// A Zip instance: draw one path through every cell, visiting the numbered
/// checkpoints in order and never crossing a wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zip {
    grid: Vec<Vec<usize>>,
    rows: usize,
    cols: usize,
    /// Normalised so that the smaller cell comes first.
    walls: FxHashSet<Wall>,
    /// `checkpoints[k - 1]` is the cell numbered k.
    checkpoints: Vec<Cell>,
}

impl Zip {
    /// # Errors
    ///
    /// `InvalidGrid` for an empty or ragged grid, `DuplicateNumber` and
    /// `MissingNumber` unless the numbers are exactly 1..=K, `OutOfBounds`
    /// for walls off the board.
    pub fn new(grid: Vec<Vec<usize>>, walls: Vec<Wall>) -> Result<Self> {
        let rows = grid.len();
        let cols = grid.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidGrid("zip grid is empty".to_string()));
        }
        if grid.iter().any(|row| row.len() != cols) {
            return Err(Error::InvalidGrid("zip grid rows differ in length".to_string()));
        }

        let mut numbered: FxHashMap<usize, Cell> = FxHashMap::default();
        for (r, row) in grid.iter().enumerate() {
            for (c, &n) in row.iter().enumerate() {
                if n > 0 && numbered.insert(n, (r, c)).is_some() {
                    return Err(Error::DuplicateNumber(n));
                }
            }
        }
        let max = numbered.keys().copied().max().unwrap_or(0);
        let checkpoints = (1..=max.max(1))
            .map(|k| numbered.get(&k).copied().ok_or(Error::MissingNumber(k)))
            .collect::<Result<Vec<_>>>()?;

        let mut normalised = FxHashSet::default();
        for (a, b) in walls {
            if let Some(&(row, col)) = [a, b].iter().find(|&&(r, c)| r >= rows || c >= cols) {
                return Err(Error::OutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            normalised.insert((a.min(b), a.max(b)));
        }

        Ok(Self {
            grid,
            rows,
            cols,
            walls: normalised,
            checkpoints,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Checkpoint cells in visiting order.
    #[must_use]
    pub fn checkpoints(&self) -> &[Cell] {
        &self.checkpoints
    }

    const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    const fn index(&self, (r, c): Cell) -> usize {
        r * self.cols + c
    }

    const fn cell(&self, index: usize) -> Cell {
        (index / self.cols, index % self.cols)
    }

    /// Whether a wall separates `a` from `b`, in either order.
    #[must_use]
    pub fn is_wall_between(&self, a: Cell, b: Cell) -> bool {
        self.walls.contains(&(a.min(b), a.max(b)))
    }

    /// Orthogonal neighbours of `cell` that no wall separates from it.
    fn open_neighbours(&self, (r, c): Cell) -> impl Iterator<Item = Cell> + '_ {
        let up = r.checked_sub(1).map(|r| (r, c));
        let down = (r + 1 < self.rows).then_some((r + 1, c));
        let left = c.checked_sub(1).map(|c| (r, c));
        let right = (c + 1 < self.cols).then_some((r, c + 1));
        [up, down, left, right]
            .into_iter()
            .flatten()
            .filter(move |&next| !self.is_wall_between((r, c), next))
    }

    /// Variable for "step `step` visits `cell`": `step * N + index + 1`.
    #[allow(clippy::cast_possible_truncation)]
    const fn var(&self, step: usize, cell: Cell) -> Variable {
        (step * self.cell_count() + self.index(cell) + 1) as Variable
    }

    fn pos(&self, step: usize, cell: Cell) -> Literal {
        Literal::positive(self.var(step, cell))
    }

    fn generate_step_clauses(&self, cnf: &mut Cnf) {
        let n = self.cell_count();
        for step in 0..n {
            let cells = (0..n).map(|i| self.pos(step, self.cell(i))).collect_vec();
            exactly_one(cnf, &cells);
        }
        for i in 0..n {
            let steps = (0..n).map(|step| self.pos(step, self.cell(i))).collect_vec();
            exactly_one(cnf, &steps);
        }
    }

    fn generate_endpoint_clauses(&self, cnf: &mut Cnf) {
        let last_step = self.cell_count() - 1;
        cnf.add_clause([self.pos(0, self.checkpoints[0])]);
        if let Some(&last) = self.checkpoints.last() {
            cnf.add_clause([self.pos(last_step, last)]);
        }
    }

    fn generate_adjacency_clauses(&self, cnf: &mut Cnf) {
        let n = self.cell_count();
        for step in 0..n.saturating_sub(1) {
            for i in 0..n {
                let from = self.cell(i);
                let next = self
                    .open_neighbours(from)
                    .map(|to| self.pos(step + 1, to))
                    .collect_vec();
                implies(cnf, self.pos(step, from), &next);
            }
        }
    }

    /// `seen[i]` is true once checkpoint k-1 has been visited at or before
    /// step i. Checkpoint k may only be visited at step i if `seen[i - 1]`.
    fn generate_ordering_clauses(&self, cnf: &mut Cnf) {
        let n = self.cell_count();
        for (prev, &next) in self.checkpoints.iter().tuple_windows() {
            cnf.add_clause([!self.pos(0, next)]);

            let mut seen = self.pos(0, *prev);
            for step in 1..n {
                cnf.add_clause([!self.pos(step, next), seen]);
                if step + 1 < n {
                    let now = Literal::positive(cnf.new_var());
                    or_equals(cnf, now, &[seen, self.pos(step, *prev)]);
                    seen = now;
                }
            }
        }
    }

    /// Draws step numbers (0 is the first step) with `|` between cells split
    /// by a vertical wall and `----` under cells split by a horizontal one.
    #[must_use]
    pub fn render_path(&self, path: &[Cell]) -> String {
        let mut steps = vec![vec![None; self.cols]; self.rows];
        for (step, &(r, c)) in path.iter().enumerate() {
            if r < self.rows && c < self.cols {
                steps[r][c] = Some(step);
            }
        }

        let mut lines = Vec::with_capacity(self.rows * 2);
        for r in 0..self.rows {
            let mut line = String::new();
            for c in 0..self.cols {
                match steps[r][c] {
                    Some(step) => line.push_str(&format!("{step:3} ")),
                    None => line.push_str("  . "),
                }
                if c + 1 < self.cols {
                    line.push(if self.is_wall_between((r, c), (r, c + 1)) { '|' } else { ' ' });
                }
            }
            lines.push(line.trim_end().to_string());

            if r + 1 < self.rows {
                let walls = (0..self.cols)
                    .map(|c| {
                        if self.is_wall_between((r, c), (r + 1, c)) { "----" } else { "    " }
                    })
                    .join(" ");
                if !walls.trim().is_empty() {
                    lines.push(walls.trim_end().to_string());
                }
            }
        }
        lines.join("\n")
    }
}

impl Puzzle for Zip {
    type Solution = Vec<Cell>;

    fn to_cnf(&self) -> Cnf {
        let n = self.cell_count();
        let mut cnf = Cnf::new();
        #[allow(clippy::cast_possible_truncation)]
        cnf.reserve_vars((n * n) as Variable);
        self.generate_step_clauses(&mut cnf);
        self.generate_endpoint_clauses(&mut cnf);
        self.generate_adjacency_clauses(&mut cnf);
        self.generate_ordering_clauses(&mut cnf);
        cnf
    }

    fn projection(&self) -> Vec<Variable> {
        #[allow(clippy::cast_possible_truncation)]
        let positions = (self.cell_count() * self.cell_count()) as Variable;
        (1..=positions).collect()
    }

    fn decode(&self, solutions: &Solutions) -> Vec<Cell> {
        let n = self.cell_count();
        (0..n)
            .filter_map(|step| {
                (0..n)
                    .map(|i| self.cell(i))
                    .find(|&cell| solutions.value(self.var(step, cell)))
            })
            .collect()
    }

    fn verify(&self, path: &Vec<Cell>) -> bool {
        if path.len() != self.cell_count()
            || path.iter().any(|&(r, c)| r >= self.rows || c >= self.cols)
            || !path.iter().all_unique()
        {
            return false;
        }

        let moves_ok = path.iter().tuple_windows().all(|(&a, &b)| {
            a.0.abs_diff(b.0) + a.1.abs_diff(b.1) == 1 && !self.is_wall_between(a, b)
        });
        let ends_ok = path.first() == self.checkpoints.first()
            && path.last() == self.checkpoints.last();
        let visits = path
            .iter()
            .enumerate()
            .map(|(step, &cell)| (cell, step))
            .collect::<FxHashMap<_, _>>();
        let order_ok = self
            .checkpoints
            .iter()
            .map(|cell| visits[cell])
            .tuple_windows()
            .all(|(a, b)| a < b);

        moves_ok && ends_ok && order_ok
    }

    fn render(&self, path: &Vec<Cell>) -> String {
        self.render_path(path)
    }
}

impl Display for Zip {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in &self.grid {
            writeln!(f, "{}", row.iter().join(" "))?;
        }
        for ((r1, c1), (r2, c2)) in self.walls.iter().sorted() {
            writeln!(f, "wall {r1} {c1} {r2} {c2}")?;
        }
        Ok(())
    }
}

/// Parses grid rows of integers (0 for a blank cell) followed by
/// `wall r1 c1 r2 c2` lines.
///
/// # Errors
///
/// `Parse` for malformed numbers or wall lines, plus everything
/// [`Zip::new`] rejects.
pub fn parse_zip(text: &str) -> Result<Zip> {
    let mut grid = Vec::new();
    let mut walls = Vec::new();

    for (line, content) in content_lines(text) {
        let tokens = content.split_whitespace().collect_vec();
        if let ["wall", rest @ ..] = tokens.as_slice() {
            walls.push(cell_pair(line, rest)?);
        } else if walls.is_empty() {
            let row = tokens
                .iter()
                .map(|token| number(line, token))
                .collect::<Result<Vec<_>>>()?;
            grid.push(row);
        } else {
            return Err(Error::parse(line, "grid row after wall lines"));
        }
    }

    Zip::new(grid, walls)
}

/// # Errors
///
/// I/O errors and everything [`parse_zip`] rejects.
pub fn parse_zip_file(path: impl AsRef<Path>) -> Result<Zip> {
    parse_zip(&std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
        1 0 0 0 0 0\n\
        0 2 0 0 0 0\n\
        0 0 0 0 0 0\n\
        0 0 0 3 0 0\n\
        0 0 0 0 0 0\n\
        4 0 0 0 0 0\n\
        wall 0 0 1 0\n\
        wall 0 2 1 2\n\
        wall 1 1 2 1\n\
        wall 2 0 3 0\n\
        wall 2 3 3 3\n\
        wall 3 2 4 2\n\
        wall 3 5 4 5\n\
        wall 4 0 5 0\n\
        wall 4 3 5 3\n\
        wall 4 4 5 4\n";

    #[test]
    fn test_example_solves() {
        let zip = parse_zip(EXAMPLE).unwrap();
        assert_eq!(zip.checkpoints(), &[(0, 0), (1, 1), (3, 3), (5, 0)]);

        let path = zip.solve().unwrap().expect("example has a path");
        assert_eq!(path.len(), 36);
        assert_eq!(path[0], (0, 0));
        assert_eq!(path[35], (5, 0));
        assert!(zip.verify(&path));
    }

    #[test]
    fn test_example_solution_count() {
        let zip = parse_zip(EXAMPLE).unwrap();
        assert_eq!(zip.count_solutions(20).unwrap(), 6);
        assert!(!zip.is_unique().unwrap());
    }

    #[test]
    fn test_ordering_is_enforced() {
        // Two snakes join opposite corners of a 3x3 grid. The checkpoints
        // on the other corners decide which one is legal.
        let zip = Zip::new(vec![vec![1, 0, 2], vec![0, 0, 0], vec![3, 0, 4]], vec![]).unwrap();
        assert_eq!(zip.count_solutions(10).unwrap(), 1);
        let path = zip.solve().unwrap().unwrap();
        assert_eq!(&path[..3], &[(0, 0), (0, 1), (0, 2)]);

        let zip = Zip::new(vec![vec![1, 0, 3], vec![0, 0, 0], vec![2, 0, 4]], vec![]).unwrap();
        let path = zip.solve().unwrap().unwrap();
        assert_eq!(&path[..3], &[(0, 0), (1, 0), (2, 0)]);
    }

    #[test]
    fn test_wall_blocks_only_path() {
        let walls = vec![((0, 1), (0, 0))];
        let zip = Zip::new(vec![vec![1, 0, 2]], walls).unwrap();
        assert_eq!(zip.solve().unwrap(), None);
        assert!(zip.is_wall_between((0, 0), (0, 1)));
    }

    #[test]
    fn test_single_cell() {
        let zip = Zip::new(vec![vec![1]], vec![]).unwrap();
        assert_eq!(zip.solve().unwrap(), Some(vec![(0, 0)]));
    }

    #[test]
    fn test_number_validation() {
        assert!(matches!(
            Zip::new(vec![vec![1, 3]], vec![]),
            Err(Error::MissingNumber(2))
        ));
        assert!(matches!(
            Zip::new(vec![vec![0, 0]], vec![]),
            Err(Error::MissingNumber(1))
        ));
        assert!(matches!(
            Zip::new(vec![vec![1, 2, 2]], vec![]),
            Err(Error::DuplicateNumber(2))
        ));
        assert!(matches!(Zip::new(vec![], vec![]), Err(Error::InvalidGrid(_))));
        assert!(matches!(
            Zip::new(vec![vec![1, 2], vec![0]], vec![]),
            Err(Error::InvalidGrid(_))
        ));
    }

    #[test]
    fn test_verify_rejects_wall_crossing() {
        let zip = Zip::new(vec![vec![1, 2]], vec![((0, 0), (0, 1))]).unwrap();
        assert!(!zip.verify(&vec![(0, 0), (0, 1)]));
    }

    #[test]
    fn test_render_path() {
        let zip = Zip::new(vec![vec![1, 0], vec![0, 2]], vec![((0, 0), (1, 0))]).unwrap();
        let rendered = zip.render_path(&[(0, 0), (0, 1), (1, 1), (1, 0)]);
        assert_eq!(rendered, "  0    1\n----\n  3    2");

        let zip = Zip::new(vec![vec![1, 2], vec![0, 0]], vec![((0, 1), (0, 0))]).unwrap();
        let rendered = zip.render_path(&[(0, 0), (1, 0), (1, 1), (0, 1)]);
        assert_eq!(rendered, "  0 |  3\n  1    2");
    }

    #[test]
    fn test_parse_rejects_bad_wall() {
        assert!(matches!(
            parse_zip("1 2\nwall 0 0 0\n"),
            Err(Error::Parse { line: 2, .. })
        ));
    }
}
