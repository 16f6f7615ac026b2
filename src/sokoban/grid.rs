//! Static level model for Sokoban puzzles

use crate::error::GridError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A cell coordinate. `row` grows downwards, `col` grows to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step one cell in `direction`, or `None` when that would leave the
    /// non-negative quadrant. Upper bounds are checked by the level.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dr, dc) = direction.delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        Some(Position { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four cardinal moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Displacement as `(row, col)`
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }

    /// The direction that moves `from` onto `to`, if they are cardinal neighbours
    pub fn between(from: Position, to: Position) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| from.step(*d) == Some(to))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Kind of a single cell as written in the level text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Empty,
    Goal,
    Box,
    BoxOnGoal,
    PlayerStart,
    PlayerOnGoal,
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Option<Cell> {
        match symbol {
            '#' => Some(Cell::Wall),
            '.' | ' ' => Some(Cell::Empty),
            'G' => Some(Cell::Goal),
            'B' => Some(Cell::Box),
            'X' => Some(Cell::BoxOnGoal),
            'P' => Some(Cell::PlayerStart),
            'Y' => Some(Cell::PlayerOnGoal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Empty => '.',
            Cell::Goal => 'G',
            Cell::Box => 'B',
            Cell::BoxOnGoal => 'X',
            Cell::PlayerStart => 'P',
            Cell::PlayerOnGoal => 'Y',
        }
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Cell::Goal | Cell::BoxOnGoal | Cell::PlayerOnGoal)
    }

    pub fn has_box(self) -> bool {
        matches!(self, Cell::Box | Cell::BoxOnGoal)
    }

    pub fn has_player(self) -> bool {
        matches!(self, Cell::PlayerStart | Cell::PlayerOnGoal)
    }
}

/// An immutable Sokoban level.
///
/// Box identity is the index into [`Level::boxes`], assigned in row-major
/// discovery order. Encoded clauses refer to boxes by that index, so the
/// order never changes after parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<Cell>,
    goals: BTreeSet<Position>,
    boxes: Vec<Position>,
    player: Position,
}

impl Level {
    /// Parse a level from its rows of symbols
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, GridError> {
        if rows.is_empty() {
            return Err(GridError::Empty);
        }

        let cols = rows[0].as_ref().chars().count();
        if cols == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        let mut goals = BTreeSet::new();
        let mut boxes = Vec::new();
        let mut player: Option<Position> = None;

        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let len = line.chars().count();
            if len != cols {
                return Err(GridError::RaggedRow { row, len, expected: cols });
            }

            for (col, symbol) in line.chars().enumerate() {
                let pos = Position::new(row, col);
                let cell = Cell::from_symbol(symbol).ok_or(GridError::UnknownSymbol { symbol, pos })?;

                if cell.is_goal() {
                    goals.insert(pos);
                }
                if cell.has_box() {
                    boxes.push(pos);
                }
                if cell.has_player() {
                    if let Some(first) = player {
                        return Err(GridError::MultiplePlayers { first, second: pos });
                    }
                    player = Some(pos);
                }
                cells.push(cell);
            }
        }

        let player = player.ok_or(GridError::MissingPlayer)?;

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
            goals,
            boxes,
            player,
        })
    }

    /// Check that every box can end on a distinct goal
    pub fn check_goal_cover(&self) -> Result<(), GridError> {
        if self.boxes.len() > self.goals.len() {
            return Err(GridError::TooFewGoals {
                boxes: self.boxes.len(),
                goals: self.goals.len(),
            });
        }
        Ok(())
    }

    #[inline]
    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Cell kind at `pos`; anything outside the level reads as a wall
    pub fn cell(&self, pos: Position) -> Cell {
        if self.in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            Cell::Wall
        }
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.cell(pos) == Cell::Wall
    }

    /// In bounds and not a wall
    pub fn is_floor(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_wall(pos)
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        self.goals.contains(&pos)
    }

    /// Floor neighbour of `pos` in `direction`
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<Position> {
        pos.step(direction).filter(|next| self.is_floor(*next))
    }

    /// All non-wall cells in row-major order
    pub fn floor_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
            .filter(move |pos| !self.is_wall(*pos))
    }

    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == Cell::Wall).count()
    }

    pub fn floor_count(&self) -> usize {
        self.rows * self.cols - self.wall_count()
    }

    pub fn goals(&self) -> &BTreeSet<Position> {
        &self.goals
    }

    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn player(&self) -> Position {
        self.player
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                write!(f, "{}", self.cells[self.index(Position::new(row, col))].symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        let level = Level::from_rows(&["#####", "#PBG#", "#####"]).unwrap();
        assert_eq!(level.rows, 3);
        assert_eq!(level.cols, 5);
        assert_eq!(level.player(), Position::new(1, 1));
        assert_eq!(level.boxes(), &[Position::new(1, 2)]);
        assert!(level.is_goal(Position::new(1, 3)));
        assert_eq!(level.wall_count(), 12);
        assert_eq!(level.floor_count(), 3);
    }

    #[test]
    fn test_combined_markers() {
        let level = Level::from_rows(&["YX", "BG"]).unwrap();
        assert_eq!(level.player(), Position::new(0, 0));
        assert!(level.is_goal(Position::new(0, 0)));
        assert!(level.is_goal(Position::new(0, 1)));
        assert!(level.is_goal(Position::new(1, 1)));
        // Row-major discovery order fixes box identity
        assert_eq!(level.boxes(), &[Position::new(0, 1), Position::new(1, 0)]);
    }

    #[test]
    fn test_structural_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(Level::from_rows(&empty), Err(GridError::Empty));
        assert_eq!(Level::from_rows(&["..", "."]), Err(GridError::RaggedRow { row: 1, len: 1, expected: 2 }));
        assert_eq!(Level::from_rows(&["..", "BG"]), Err(GridError::MissingPlayer));
        assert_eq!(
            Level::from_rows(&["P.", ".Y"]),
            Err(GridError::MultiplePlayers {
                first: Position::new(0, 0),
                second: Position::new(1, 1),
            })
        );
        assert!(matches!(
            Level::from_rows(&["P?"]),
            Err(GridError::UnknownSymbol { symbol: '?', .. })
        ));
    }

    #[test]
    fn test_goal_cover() {
        let level = Level::from_rows(&["PBBG"]).unwrap();
        assert_eq!(level.check_goal_cover(), Err(GridError::TooFewGoals { boxes: 2, goals: 1 }));

        let level = Level::from_rows(&["PBGG"]).unwrap();
        assert!(level.check_goal_cover().is_ok());
    }

    #[test]
    fn test_neighbors_respect_walls_and_bounds() {
        let level = Level::from_rows(&["#.#", ".P.", "#G#"]).unwrap();
        let center = Position::new(1, 1);
        for direction in Direction::ALL {
            assert!(level.neighbor(center, direction).is_some());
        }

        let corner = Position::new(1, 0);
        assert_eq!(level.neighbor(corner, Direction::Left), None);
        assert_eq!(level.neighbor(corner, Direction::Up), None);
        assert_eq!(level.neighbor(corner, Direction::Right), Some(center));
    }

    #[test]
    fn test_direction_between() {
        let a = Position::new(2, 2);
        assert_eq!(Direction::between(a, Position::new(1, 2)), Some(Direction::Up));
        assert_eq!(Direction::between(a, Position::new(2, 3)), Some(Direction::Right));
        assert_eq!(Direction::between(a, a), None);
        assert_eq!(Direction::between(a, Position::new(0, 2)), None);
    }

    #[test]
    fn test_display_round_trip() {
        let rows = ["#####", "#PBG#", "#####"];
        let level = Level::from_rows(&rows).unwrap();
        assert_eq!(level.to_string(), "#####\n#PBG#\n#####\n");
    }
}
