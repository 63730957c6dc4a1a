use crate::error::{Error, Result};
use crate::parse::content_lines;
use crate::puzzle::Puzzle;
use crate::sat::cnf::Cnf;
use crate::sat::encoding::{at_least_one, at_most_one, exactly_one};
use crate::sat::literal::{Literal, Variable as SatVariable};
use crate::sat::solver::Solutions;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Side length of the grid and largest value.
pub const SIZE: usize = 6;
/// Boxes are two rows tall.
pub const BOX_ROWS: usize = 2;
/// Boxes are three columns wide.
pub const BOX_COLS: usize = 3;

/// A puzzle with twelve givens and a unique solution.
pub const EXAMPLE: [[usize; SIZE]; SIZE] = [
    [0, 0, 3, 4, 0, 0],
    [0, 2, 0, 0, 5, 0],
    [1, 0, 0, 0, 0, 6],
    [0, 0, 5, 3, 0, 0],
    [0, 6, 0, 0, 1, 0],
    [2, 0, 0, 0, 0, 4],
];

/// A 6x6 grid of values `0..=6`, `0` marking an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board([[usize; SIZE]; SIZE]);

impl Board {
    /// A board with every cell empty.
    #[must_use]
    pub const fn empty() -> Self {
        Self([[0; SIZE]; SIZE])
    }

    /// Checks shape and value range.
    ///
    /// # Errors
    ///
    /// `InvalidGrid` unless the board is 6x6, `InvalidValue` for values above 6.
    pub fn new(rows: Vec<Vec<usize>>) -> Result<Self> {
        if rows.len() != SIZE || rows.iter().any(|row| row.len() != SIZE) {
            return Err(Error::InvalidGrid(format!("grid must be {SIZE}x{SIZE}")));
        }
        let mut board = Self::empty();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                board.set(r, c, value)?;
            }
        }
        Ok(board)
    }

    /// Value at `(row, col)`, `0` if empty.
    #[must_use]
    pub const fn get(&self, row: usize, col: usize) -> usize {
        self.0[row][col]
    }

    /// Writes `value` into `(row, col)`; `0` clears the cell.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for values above 6.
    pub fn set(&mut self, row: usize, col: usize, value: usize) -> Result<()> {
        if value > SIZE {
            return Err(Error::InvalidValue { row, col, value });
        }
        self.0[row][col] = value;
        Ok(())
    }

    /// Number of filled cells.
    #[must_use]
    pub fn givens(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// The rows, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &[usize; SIZE]> {
        self.0.iter()
    }

    /// Filled cells as `(row, col, value)`.
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        cells().filter_map(|(r, c)| {
            let v = self.0[r][c];
            (v != 0).then_some((r, c, v))
        })
    }
}

impl TryFrom<[[usize; SIZE]; SIZE]> for Board {
    type Error = Error;

    fn try_from(grid: [[usize; SIZE]; SIZE]) -> Result<Self> {
        let mut board = Self::empty();
        for (r, row) in grid.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                board.set(r, c, value)?;
            }
        }
        Ok(board)
    }
}

impl TryFrom<Vec<Vec<usize>>> for Board {
    type Error = Error;

    fn try_from(rows: Vec<Vec<usize>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<Board> for Vec<Vec<usize>> {
    fn from(board: Board) -> Self {
        board.0.iter().map(|row| row.to_vec()).collect()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (r, row) in self.0.iter().enumerate() {
            if r > 0 && r % BOX_ROWS == 0 {
                writeln!(f, "------+------")?;
            }
            let line = row
                .chunks(BOX_COLS)
                .map(|chunk| {
                    chunk
                        .iter()
                        .map(|&v| if v == 0 { ".".to_string() } else { v.to_string() })
                        .join(" ")
                })
                .join(" | ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// "Cell (row, col) holds num", rows and columns 0-based, num in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variable {
    /// 0-based row.
    pub row: usize,
    /// 0-based column.
    pub col: usize,
    /// Value in `1..=6`.
    pub num: usize,
}

impl Variable {
    /// Bundles a cell and a value.
    #[must_use]
    pub const fn new(row: usize, col: usize, num: usize) -> Self {
        Self { row, col, num }
    }

    /// `row * 36 + col * 6 + num`, so the 216 variables are `1..=216`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn encode(&self) -> SatVariable {
        (self.row * SIZE * SIZE + self.col * SIZE + self.num) as SatVariable
    }

    /// Positive literal of [`Variable::encode`].
    #[must_use]
    pub fn literal(&self) -> Literal {
        Literal::positive(self.encode())
    }
}

/// Total number of variables of the direct encoding.
#[allow(clippy::cast_possible_truncation)]
pub const NUM_VARS: SatVariable = (SIZE * SIZE * SIZE) as SatVariable;

pub(crate) fn cells() -> impl Iterator<Item = (usize, usize)> {
    (0..SIZE).cartesian_product(0..SIZE)
}

fn lit(row: usize, col: usize, num: usize) -> Literal {
    Variable::new(row, col, num).literal()
}

/// Every cell holds exactly one value.
fn generate_cell_clauses(cnf: &mut Cnf) {
    for (r, c) in cells() {
        let options = (1..=SIZE).map(|v| lit(r, c, v)).collect_vec();
        exactly_one(cnf, &options);
    }
}

/// Each value once per row and once per column.
fn generate_line_clauses(cnf: &mut Cnf) {
    for i in 0..SIZE {
        for v in 1..=SIZE {
            let row = (0..SIZE).map(|c| lit(i, c, v)).collect_vec();
            exactly_one(cnf, &row);

            let col = (0..SIZE).map(|r| lit(r, i, v)).collect_vec();
            exactly_one(cnf, &col);
        }
    }
}

/// Each value once per 2x3 box.
fn generate_block_clauses(cnf: &mut Cnf) {
    for br in (0..SIZE).step_by(BOX_ROWS) {
        for bc in (0..SIZE).step_by(BOX_COLS) {
            for v in 1..=SIZE {
                let block = (br..br + BOX_ROWS)
                    .cartesian_product(bc..bc + BOX_COLS)
                    .map(|(r, c)| lit(r, c, v))
                    .collect_vec();
                at_least_one(cnf, &block);
                at_most_one(cnf, &block);
            }
        }
    }
}

fn generate_pre_filled_clauses(cnf: &mut Cnf, board: &Board) {
    for (r, c, v) in board.filled() {
        cnf.add_clause([lit(r, c, v)]);
    }
}

/// The rule clauses without any givens. The generator reuses them and
/// supplies clues as assumptions instead.
#[must_use]
pub fn rules_cnf() -> Cnf {
    let mut cnf = Cnf::new();
    cnf.reserve_vars(NUM_VARS);
    generate_cell_clauses(&mut cnf);
    generate_line_clauses(&mut cnf);
    generate_block_clauses(&mut cnf);
    cnf
}

/// Givens of `board` as literals, for use as assumptions.
#[must_use]
pub fn given_literals(board: &Board) -> Vec<Literal> {
    board.filled().map(|(r, c, v)| lit(r, c, v)).collect()
}

/// Reads the grid out of a model: the value whose variable is true.
#[must_use]
pub fn decode_board(solutions: &Solutions) -> Board {
    let mut board = Board::empty();
    for (r, c) in cells() {
        if let Some(v) = (1..=SIZE).find(|&v| solutions.check(lit(r, c, v))) {
            board.0[r][c] = v;
        }
    }
    board
}

/// A Mini Sudoku instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniSudoku {
    /// The givens.
    pub board: Board,
}

impl MiniSudoku {
    /// Wraps a board of givens.
    #[must_use]
    pub const fn new(board: Board) -> Self {
        Self { board }
    }
}

impl From<Board> for MiniSudoku {
    fn from(board: Board) -> Self {
        Self::new(board)
    }
}

impl Display for MiniSudoku {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board)
    }
}

impl Puzzle for MiniSudoku {
    type Solution = Board;

    fn to_cnf(&self) -> Cnf {
        let mut cnf = rules_cnf();
        generate_pre_filled_clauses(&mut cnf, &self.board);
        cnf
    }

    fn projection(&self) -> Vec<SatVariable> {
        (1..=NUM_VARS).collect()
    }

    fn decode(&self, solutions: &Solutions) -> Board {
        decode_board(solutions)
    }

    fn verify(&self, solution: &Board) -> bool {
        let complete = solution.0.iter().flatten().all(|&v| (1..=SIZE).contains(&v));
        let keeps_givens = self
            .board
            .filled()
            .all(|(r, c, v)| solution.get(r, c) == v);

        let rows_ok = (0..SIZE).all(|r| (0..SIZE).map(|c| solution.get(r, c)).all_unique());
        let cols_ok = (0..SIZE).all(|c| (0..SIZE).map(|r| solution.get(r, c)).all_unique());
        let boxes_ok = (0..SIZE).step_by(BOX_ROWS).all(|br| {
            (0..SIZE).step_by(BOX_COLS).all(|bc| {
                (br..br + BOX_ROWS)
                    .cartesian_product(bc..bc + BOX_COLS)
                    .map(|(r, c)| solution.get(r, c))
                    .all_unique()
            })
        });

        complete && keeps_givens && rows_ok && cols_ok && boxes_ok
    }

    fn render(&self, solution: &Board) -> String {
        solution.to_string()
    }
}

/// Parses six rows of six cells. Cells are the digits `1`-`6`, with `0` or
/// `.` for empty; they may be written together (`0034..`) or separated by
/// whitespace.
///
/// # Errors
///
/// `Parse` for unknown characters or wrong row lengths, `InvalidGrid` for
/// the wrong number of rows.
pub fn parse_sudoku(text: &str) -> Result<MiniSudoku> {
    let mut rows = Vec::new();
    for (line, content) in content_lines(text) {
        let row = content
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| match ch {
                '.' => Ok(0),
                _ => ch
                    .to_digit(10)
                    .map(|d| d as usize)
                    .ok_or_else(|| Error::parse(line, format!("invalid cell '{ch}'"))),
            })
            .collect::<Result<Vec<_>>>()?;
        if row.len() != SIZE {
            return Err(Error::parse(
                line,
                format!("expected {SIZE} cells, found {}", row.len()),
            ));
        }
        rows.push(row);
    }
    Ok(MiniSudoku::new(Board::new(rows)?))
}

/// # Errors
///
/// I/O errors and everything [`parse_sudoku`] rejects.
pub fn parse_sudoku_file(path: impl AsRef<Path>) -> Result<MiniSudoku> {
    parse_sudoku(&std::fs::read_to_string(path)?)
}
