//! Error type shared by the encoders, parsers and the SAT backend.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while reading, encoding or solving a puzzle.
#[derive(Debug, Error)]
pub enum Error {
    /// The grid does not have the dimensions the puzzle requires.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// A cell holds a value outside the puzzle's alphabet.
    #[error("invalid value {value} at ({row}, {col})")]
    InvalidValue {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The value found there.
        value: usize,
    },

    /// A Queens grid must have exactly as many regions as rows.
    #[error("number of regions ({regions}) must equal grid size ({size})")]
    RegionCount {
        /// Distinct labels in the grid.
        regions: usize,
        /// Side length of the grid.
        size: usize,
    },

    /// Tango grids are balanced, so their side length must be even.
    #[error("tango grid size must be even and positive, got {0}")]
    OddSize(usize),

    /// A clue or given refers to a cell that is not on the board.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
        /// Rows on the board.
        rows: usize,
        /// Columns on the board.
        cols: usize,
    },

    /// A Zip checkpoint number between 1 and the maximum does not appear.
    #[error("checkpoint {0} is missing")]
    MissingNumber(usize),

    /// A Zip checkpoint number appears on more than one cell.
    #[error("checkpoint {0} appears more than once")]
    DuplicateNumber(usize),

    /// A Mini Sudoku has between 1 and 36 clues.
    #[error("a mini sudoku has between 1 and 36 pieces, got {0}")]
    PieceCount(usize),

    /// The generator could not reach the requested clue count.
    #[error("could not generate a unique puzzle with {pieces} pieces after {attempts} attempts")]
    GenerationExhausted {
        /// Requested number of clues.
        pieces: usize,
        /// Fresh grids tried before giving up.
        attempts: usize,
    },

    /// Malformed puzzle or DIMACS text.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Reading a puzzle or DIMACS file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The SAT engine reported a failure (not an UNSAT answer).
    #[error("solver failure: {0}")]
    Solver(String),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
