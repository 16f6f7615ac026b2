//! Sokoban and Sudoku SAT Solver
//!
//! This library encodes bounded-horizon Sokoban planning and Sudoku completion
//! as propositional satisfiability, solves them with CaDiCaL and decodes the
//! models back into move sequences and boards.

pub mod config;
pub mod error;
pub mod planning;
pub mod sat;
pub mod sokoban;
pub mod sudoku;
pub mod utils;

pub use config::Settings;
pub use error::{DecodeError, GridError, SolveError, SolverError, SudokuError};
pub use planning::{Plan, PlanOutcome, SokobanProblem};
pub use sokoban::{Direction, Level, Position};
pub use sudoku::{solve_sudoku, SudokuBoard, SudokuOutcome};

/// Plan for the level given by `rows` within `horizon` steps using default
/// settings
pub fn solve_sokoban<S: AsRef<str>>(rows: &[S], horizon: usize) -> Result<PlanOutcome, SolveError> {
    let mut settings = Settings::default();
    settings.planning.horizon = horizon;
    solve_sokoban_with(rows, settings)
}

/// Plan for the level given by `rows` under explicit settings
pub fn solve_sokoban_with<S: AsRef<str>>(rows: &[S], settings: Settings) -> Result<PlanOutcome, SolveError> {
    let level = Level::from_rows(rows)?;
    SokobanProblem::new(level, settings)?.solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_scenario() {
        let rows = ["#.#", ".P.", "#B#", "#G#"];

        let plan = solve_sokoban(&rows, 2).unwrap().into_plan().unwrap();
        assert_eq!(plan.moves.first(), Some(&Direction::Down));
        assert_eq!(plan.push_count(), 1);

        assert!(solve_sokoban(&rows, 1).unwrap().is_plan());
        assert!(!solve_sokoban(&rows, 0).unwrap().is_plan());
    }

    #[test]
    fn test_malformed_level() {
        let result = solve_sokoban(&["#P#", "#B"], 3);
        assert!(matches!(
            result,
            Err(SolveError::Grid(GridError::RaggedRow { row: 1, len: 2, expected: 3 }))
        ));

        let result = solve_sokoban(&["#.#", "#B#", "#G#"], 3);
        assert!(matches!(result, Err(SolveError::Grid(GridError::MissingPlayer))));

        let result = solve_sokoban(&["#####", "#PBG#", "#####"], usize::MAX);
        assert!(matches!(result, Err(SolveError::Grid(GridError::EncodingTooLarge { .. }))));
    }

    #[test]
    fn test_owned_rows() {
        let rows: Vec<String> = vec!["#####".into(), "#PBG#".into(), "#####".into()];
        let plan = solve_sokoban(rows.as_slice(), 1).unwrap().into_plan().unwrap();
        assert_eq!(plan.move_string(), "R");
    }
}
