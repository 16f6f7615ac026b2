//! Sudoku completion through the same SAT pipeline

pub mod board;
pub mod encoder;

pub use board::SudokuBoard;

use crate::error::SudokuError;
use crate::sat::{solve_clauses, SolveOutcome, SolverOptions};
use log::info;
use serde::{Deserialize, Serialize};

/// Result of a Sudoku solve; an unsolvable board is not an error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "board", rename_all = "snake_case")]
pub enum SudokuOutcome {
    Solved(SudokuBoard),
    NoSolution,
}

impl SudokuOutcome {
    pub fn board(&self) -> Option<&SudokuBoard> {
        match self {
            SudokuOutcome::Solved(board) => Some(board),
            SudokuOutcome::NoSolution => None,
        }
    }
}

/// Complete a 9x9 grid where 0 marks a blank
pub fn solve_sudoku(grid: [[u8; 9]; 9]) -> Result<SudokuOutcome, SudokuError> {
    let clues = SudokuBoard::new(grid)?;
    solve_board(&clues, &SolverOptions::default())
}

/// Complete `clues` under the given solver options
pub fn solve_board(clues: &SudokuBoard, options: &SolverOptions) -> Result<SudokuOutcome, SudokuError> {
    let clauses = encoder::encode(clues);
    info!("sudoku with {} clues encoded into {} clauses", clues.clue_count(), clauses.len());

    match solve_clauses(&clauses, encoder::VARIABLE_COUNT, options)? {
        SolveOutcome::Satisfiable(model) => Ok(SudokuOutcome::Solved(encoder::decode(&model)?)),
        SolveOutcome::Unsatisfiable => Ok(SudokuOutcome::NoSolution),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: [[u8; 9]; 9] = [
        [5, 3, 0, 0, 7, 0, 0, 0, 0],
        [6, 0, 0, 1, 9, 5, 0, 0, 0],
        [0, 9, 8, 0, 0, 0, 0, 6, 0],
        [8, 0, 0, 0, 6, 0, 0, 0, 3],
        [4, 0, 0, 8, 0, 3, 0, 0, 1],
        [7, 0, 0, 0, 2, 0, 0, 0, 6],
        [0, 6, 0, 0, 0, 0, 2, 8, 0],
        [0, 0, 0, 4, 1, 9, 0, 0, 5],
        [0, 0, 0, 0, 8, 0, 0, 7, 9],
    ];

    #[test]
    fn test_solves_classic_puzzle() {
        let outcome = solve_sudoku(PUZZLE).unwrap();
        let board = outcome.board().unwrap();
        let clues = SudokuBoard::new(PUZZLE).unwrap();

        assert!(board.is_solved_from(&clues));
        assert_eq!(board.cells()[0], [5, 3, 4, 6, 7, 8, 9, 1, 2]);
    }

    #[test]
    fn test_empty_grid_is_solvable() {
        let outcome = solve_sudoku([[0; 9]; 9]).unwrap();
        assert!(outcome.board().unwrap().is_valid_solution());
    }

    #[test]
    fn test_duplicate_clues_have_no_solution() {
        let mut grid = [[0u8; 9]; 9];
        grid[0][0] = 5;
        grid[0][8] = 5;
        assert_eq!(solve_sudoku(grid).unwrap(), SudokuOutcome::NoSolution);
    }

    #[test]
    fn test_invalid_digit() {
        let mut grid = PUZZLE;
        grid[2][2] = 10;
        assert!(matches!(
            solve_sudoku(grid),
            Err(SudokuError::InvalidDigit { row: 2, col: 2, value: 10 })
        ));
    }
}
