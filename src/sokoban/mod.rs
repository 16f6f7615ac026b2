//! Sokoban level model and rules

pub mod grid;
pub mod io;
pub mod rules;

pub use grid::{Cell, Direction, Level, Position};
pub use io::{create_example_levels, load_level_from_file, parse_level_from_string, save_level_to_file};
pub use rules::{MoveViolation, SokobanRules, State, Step};
