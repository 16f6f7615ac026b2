//! Error types shared by the encoders, decoders and the solver wrapper

use crate::sokoban::Position;
use std::time::Duration;
use thiserror::Error;

/// Structural problems with a Sokoban level, reported before encoding starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("level contains no rows")]
    Empty,

    #[error("row {row} has length {len}, expected {expected}")]
    RaggedRow { row: usize, len: usize, expected: usize },

    #[error("unknown symbol '{symbol}' at {pos}")]
    UnknownSymbol { symbol: char, pos: Position },

    #[error("no player start marker ('P' or 'Y') found")]
    MissingPlayer,

    #[error("multiple player start markers: {first} and {second}")]
    MultiplePlayers { first: Position, second: Position },

    #[error("{boxes} boxes but only {goals} goal cells")]
    TooFewGoals { boxes: usize, goals: usize },

    #[error("horizon {horizon} needs more variables than a SAT id can address")]
    EncodingTooLarge { horizon: usize },
}

/// A model that does not describe any coherent trajectory.
///
/// This always points at a mismatch between the encoder and the solver, so it
/// is kept apart from ordinary unsatisfiability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no player position is true at time {t}")]
    MissingPlayer { t: usize },

    #[error("player occupies {count} cells at time {t}")]
    AmbiguousPlayer { t: usize, count: usize },

    #[error("box {b} has no position at time {t}")]
    MissingBox { b: usize, t: usize },

    #[error("box {b} occupies {count} cells at time {t}")]
    AmbiguousBox { b: usize, t: usize, count: usize },

    #[error("player jumps from {from} to {to} between times {t} and {next}", next = .t + 1)]
    IllegalDisplacement { t: usize, from: Position, to: Position },

    #[error("sudoku cell ({row}, {col}) has {count} true digits")]
    SudokuCell { row: usize, col: usize, count: usize },
}

/// The SAT backend returned neither SAT nor UNSAT
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    #[error("solver stopped after {0:?} without an answer")]
    Timeout(Duration),

    #[error("solver was interrupted without an answer")]
    Interrupted,
}

/// Failures of the Sokoban pipeline (the no-plan outcome is not an error)
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("malformed level: {0}")]
    Grid(#[from] GridError),

    #[error("inconsistent model: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error("decoded plan does not replay: {0}")]
    Verification(String),
}

/// Failures of the Sudoku pipeline (an unsolvable board is not an error)
#[derive(Debug, Error)]
pub enum SudokuError {
    #[error("cell ({row}, {col}) holds {value}, expected 0..=9")]
    InvalidDigit { row: usize, col: usize, value: u8 },

    #[error("inconsistent model: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}
