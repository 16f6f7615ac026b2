//! CNF encoding of Sudoku completion

use super::board::{SudokuBoard, BLOCK, SIZE};
use crate::error::DecodeError;
use crate::sat::{AtMostOneEncoding, ClauseSet, Model, Var};

/// Variable of "cell `(row, col)` holds `digit`", id `81*row + 9*col + digit`
pub fn cell_var(row: usize, col: usize, digit: u8) -> Var {
    Var::from_small_index((SIZE * SIZE * row + SIZE * col + (digit as usize - 1)) as u16)
}

/// Total number of variables
pub const VARIABLE_COUNT: usize = SIZE * SIZE * SIZE;

fn exactly_one(set: &mut ClauseSet, vars: &[Var]) {
    set.exactly_one(vars, AtMostOneEncoding::Pairwise, &[]);
}

fn digits() -> impl Iterator<Item = u8> {
    1..=SIZE as u8
}

/// Clauses whose models are exactly the completions of `clues`
pub fn encode(clues: &SudokuBoard) -> ClauseSet {
    let mut set = ClauseSet::new();

    for row in 0..SIZE {
        for col in 0..SIZE {
            let vars: Vec<Var> = digits().map(|d| cell_var(row, col, d)).collect();
            exactly_one(&mut set, &vars);
        }
    }

    for d in digits() {
        for row in 0..SIZE {
            let vars: Vec<Var> = (0..SIZE).map(|col| cell_var(row, col, d)).collect();
            exactly_one(&mut set, &vars);
        }
        for col in 0..SIZE {
            let vars: Vec<Var> = (0..SIZE).map(|row| cell_var(row, col, d)).collect();
            exactly_one(&mut set, &vars);
        }
        for block in 0..SIZE {
            let (top, left) = (block / BLOCK * BLOCK, block % BLOCK * BLOCK);
            let vars: Vec<Var> = (0..SIZE)
                .map(|k| cell_var(top + k / BLOCK, left + k % BLOCK, d))
                .collect();
            exactly_one(&mut set, &vars);
        }
    }

    for (row, col, d) in clues.clues() {
        set.add_unit(cell_var(row, col, d).positive());
    }

    set
}

/// Read the unique true digit of every cell
pub fn decode(model: &Model) -> Result<SudokuBoard, DecodeError> {
    let mut board = SudokuBoard::empty();
    for row in 0..SIZE {
        for col in 0..SIZE {
            let mut true_digits = digits().filter(|&d| model.value(cell_var(row, col, d)));
            match (true_digits.next(), true_digits.count()) {
                (Some(d), 0) => board.set(row, col, d),
                (None, _) => return Err(DecodeError::SudokuCell { row, col, count: 0 }),
                (Some(_), rest) => return Err(DecodeError::SudokuCell { row, col, count: rest + 1 }),
            }
        }
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_layout() {
        assert_eq!(cell_var(0, 0, 1).id(), 1);
        assert_eq!(cell_var(0, 0, 9).id(), 9);
        assert_eq!(cell_var(0, 1, 1).id(), 10);
        assert_eq!(cell_var(1, 0, 1).id(), 82);
        assert_eq!(cell_var(8, 8, 9).id() as usize, VARIABLE_COUNT);
    }

    #[test]
    fn test_clause_count() {
        let empty = SudokuBoard::empty();
        let set = encode(&empty);
        // 4 families of 81 groups, each 1 + C(9, 2) clauses
        assert_eq!(set.len(), 4 * 81 * (1 + 36));
        assert_eq!(set.max_var(), VARIABLE_COUNT);
    }

    #[test]
    fn test_decode_rejects_ambiguous_cell() {
        let mut vars: Vec<Var> = Vec::new();
        for row in 0..SIZE {
            for col in 0..SIZE {
                vars.push(cell_var(row, col, 1));
            }
        }
        vars.push(cell_var(2, 3, 5));
        let model: Model = vars.into_iter().collect();

        assert_eq!(decode(&model), Err(DecodeError::SudokuCell { row: 2, col: 3, count: 2 }));
    }

    #[test]
    fn test_decode_rejects_empty_cell() {
        let model = Model::default();
        assert_eq!(decode(&model), Err(DecodeError::SudokuCell { row: 0, col: 0, count: 0 }));
    }
}
