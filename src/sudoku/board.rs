//! 9x9 Sudoku board

use crate::error::SudokuError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const SIZE: usize = 9;
pub const BLOCK: usize = 3;

/// A board of digits, 0 marking an empty cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SudokuBoard {
    cells: [[u8; SIZE]; SIZE],
}

impl SudokuBoard {
    /// Wrap a grid, rejecting digits above 9
    pub fn new(cells: [[u8; SIZE]; SIZE]) -> Result<Self, SudokuError> {
        for (row, line) in cells.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value as usize > SIZE {
                    return Err(SudokuError::InvalidDigit { row, col, value });
                }
            }
        }
        Ok(Self { cells })
    }

    pub fn empty() -> Self {
        Self { cells: [[0; SIZE]; SIZE] }
    }

    /// Parse nine lines of nine symbols; `.` and `0` are blanks, whitespace
    /// inside a line is ignored
    pub fn parse(content: &str) -> Result<Self> {
        let lines: Vec<&str> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(';'))
            .collect();

        if lines.len() != SIZE {
            anyhow::bail!("expected {} rows, found {}", SIZE, lines.len());
        }

        let mut cells = [[0u8; SIZE]; SIZE];
        for (row, line) in lines.iter().enumerate() {
            let symbols: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if symbols.len() != SIZE {
                anyhow::bail!("row {} has {} cells, expected {}", row, symbols.len(), SIZE);
            }
            for (col, symbol) in symbols.into_iter().enumerate() {
                cells[row][col] = match symbol {
                    '.' | '0' => 0,
                    '1'..='9' => symbol as u8 - b'0',
                    other => anyhow::bail!("invalid symbol '{}' at ({}, {})", other, row, col),
                };
            }
        }

        Ok(Self::new(cells)?)
    }

    /// Load a board from a text file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read sudoku file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse sudoku file: {}", path.display()))
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, digit: u8) {
        self.cells[row][col] = digit;
    }

    pub fn cells(&self) -> &[[u8; SIZE]; SIZE] {
        &self.cells
    }

    /// Filled cells as `(row, col, digit)`
    pub fn clues(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .filter(|(_, &d)| d != 0)
                .map(move |(col, &d)| (row, col, d))
        })
    }

    pub fn clue_count(&self) -> usize {
        self.clues().count()
    }

    /// Every row, column and block holds each digit once
    pub fn is_valid_solution(&self) -> bool {
        let full = |digits: [u8; SIZE]| {
            let mut seen = [false; SIZE + 1];
            digits
                .iter()
                .all(|&d| d != 0 && d as usize <= SIZE && !std::mem::replace(&mut seen[d as usize], true))
        };

        (0..SIZE).all(|i| {
            let row = self.cells[i];
            let col = std::array::from_fn(|r| self.cells[r][i]);
            let (br, bc) = (i / BLOCK * BLOCK, i % BLOCK * BLOCK);
            let block = std::array::from_fn(|k| self.cells[br + k / BLOCK][bc + k % BLOCK]);
            full(row) && full(col) && full(block)
        })
    }

    /// A valid solution that keeps every clue of `clues`
    pub fn is_solved_from(&self, clues: &SudokuBoard) -> bool {
        self.is_valid_solution() && clues.clues().all(|(row, col, d)| self.get(row, col) == d)
    }
}

impl fmt::Display for SudokuBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, line) in self.cells.iter().enumerate() {
            if row > 0 && row % BLOCK == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for (col, &d) in line.iter().enumerate() {
                if col > 0 && col % BLOCK == 0 {
                    write!(f, "| ")?;
                }
                let symbol = if d == 0 { '.' } else { (b'0' + d) as char };
                write!(f, "{}", symbol)?;
                if col + 1 < SIZE {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
