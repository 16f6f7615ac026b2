//! Variable indexing for the SAT encodings

use crate::sokoban::{Level, Position};
use std::fmt;
use std::ops::Not;

/// An opaque SAT variable id. Always positive; 0 is never a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(i32);

impl Var {
    /// Variable for the zero-based `index`, `None` once ids leave the `i32` range
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        i32::try_from(index).ok()?.checked_add(1).map(Var)
    }

    /// Variable for a zero-based index of a fixed, small encoding
    pub(crate) fn from_small_index(index: u16) -> Self {
        Var(i32::from(index) + 1)
    }

    pub(crate) fn from_dimacs(id: i32) -> Option<Self> {
        (id > 0).then_some(Var(id))
    }

    pub fn id(self) -> i32 {
        self.0
    }

    pub fn positive(self) -> Lit {
        Lit(self.0)
    }

    pub fn negative(self) -> Lit {
        Lit(-self.0)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A signed literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(i32);

impl Lit {
    pub fn var(self) -> Var {
        Var(self.0.abs())
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// DIMACS integer form
    pub fn to_dimacs(self) -> i32 {
        self.0
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit(-self.0)
    }
}

impl From<Var> for Lit {
    fn from(var: Var) -> Lit {
        var.positive()
    }
}

/// Which entity an exactly-one group constrains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Player,
    Box(usize),
}

/// Semantic meaning of a Sokoban variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Proposition {
    /// The player stands on `pos` at time `t`
    PlayerAt { pos: Position, t: usize },
    /// Box `b` rests on `pos` at time `t`
    BoxAt { b: usize, pos: Position, t: usize },
    /// Ladder auxiliary `index` of the at-most-one group of `entity` at time `t`
    Ladder { entity: Entity, t: usize, index: usize },
}

/// Closed-form bijection between propositions and variable ids.
///
/// Floor cells get a dense index in row-major order, and ids are laid out as
/// consecutive blocks: player positions `[t][cell]`, then box positions
/// `[b][t][cell]`, then (when enabled) ladder auxiliaries `[group][index]`.
/// Wall cells and out-of-range tuples have no variable.
#[derive(Debug, Clone)]
pub struct VariableIndexer {
    rows: usize,
    cols: usize,
    /// Dense floor index for each cell, `None` for walls
    floor_index: Vec<Option<usize>>,
    /// Inverse of `floor_index`
    floor_cells: Vec<Position>,
    box_count: usize,
    horizon: usize,
    ladders: bool,
}

impl VariableIndexer {
    /// Index the propositions of `level` for time steps `0..=horizon`
    pub fn new(level: &Level, horizon: usize, ladders: bool) -> Self {
        let mut floor_index = vec![None; level.rows * level.cols];
        let mut floor_cells = Vec::with_capacity(level.floor_count());

        for pos in level.floor_cells() {
            floor_index[pos.row * level.cols + pos.col] = Some(floor_cells.len());
            floor_cells.push(pos);
        }

        Self {
            rows: level.rows,
            cols: level.cols,
            floor_index,
            floor_cells,
            box_count: level.box_count(),
            horizon,
            ladders,
        }
    }

    /// Dense index of a floor cell
    fn floor(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        self.floor_index[pos.row * self.cols + pos.col]
    }

    fn steps(&self) -> usize {
        self.horizon + 1
    }

    fn player_block(&self) -> usize {
        self.floor_cells.len() * self.steps()
    }

    fn box_block(&self) -> usize {
        self.box_count * self.floor_cells.len() * self.steps()
    }

    fn ladder_width(&self) -> usize {
        self.floor_cells.len().saturating_sub(1)
    }

    fn ladder_block(&self) -> usize {
        if self.ladders {
            (1 + self.box_count) * self.steps() * self.ladder_width()
        } else {
            0
        }
    }

    fn group(&self, entity: Entity, t: usize) -> usize {
        match entity {
            Entity::Player => t,
            Entity::Box(b) => (1 + b) * self.steps() + t,
        }
    }

    /// Variable of the player standing on `pos` at time `t`
    pub fn player_at(&self, pos: Position, t: usize) -> Option<Var> {
        if t > self.horizon {
            return None;
        }
        let cell = self.floor(pos)?;
        Var::from_index(t * self.floor_cells.len() + cell)
    }

    /// Variable of box `b` resting on `pos` at time `t`
    pub fn box_at(&self, b: usize, pos: Position, t: usize) -> Option<Var> {
        if b >= self.box_count || t > self.horizon {
            return None;
        }
        let cell = self.floor(pos)?;
        let offset = (b * self.steps() + t) * self.floor_cells.len() + cell;
        Var::from_index(self.player_block() + offset)
    }

    /// Ladder auxiliary `index` for the exactly-one group of `entity` at `t`
    pub fn ladder(&self, entity: Entity, t: usize, index: usize) -> Option<Var> {
        if !self.ladders || t > self.horizon || index >= self.ladder_width() {
            return None;
        }
        if let Entity::Box(b) = entity {
            if b >= self.box_count {
                return None;
            }
        }
        let offset = self.group(entity, t) * self.ladder_width() + index;
        Var::from_index(self.player_block() + self.box_block() + offset)
    }

    /// Variable for any proposition
    pub fn variable(&self, proposition: Proposition) -> Option<Var> {
        match proposition {
            Proposition::PlayerAt { pos, t } => self.player_at(pos, t),
            Proposition::BoxAt { b, pos, t } => self.box_at(b, pos, t),
            Proposition::Ladder { entity, t, index } => self.ladder(entity, t, index),
        }
    }

    /// Reverse lookup
    pub fn proposition(&self, var: Var) -> Option<Proposition> {
        let mut index = (var.id() - 1) as usize;
        let cells = self.floor_cells.len();

        if index < self.player_block() {
            return Some(Proposition::PlayerAt {
                pos: self.floor_cells[index % cells],
                t: index / cells,
            });
        }
        index -= self.player_block();

        if index < self.box_block() {
            let slot = index / cells;
            return Some(Proposition::BoxAt {
                b: slot / self.steps(),
                pos: self.floor_cells[index % cells],
                t: slot % self.steps(),
            });
        }
        index -= self.box_block();

        if index < self.ladder_block() {
            let width = self.ladder_width();
            let group = index / width;
            let entity = match group / self.steps() {
                0 => Entity::Player,
                b => Entity::Box(b - 1),
            };
            return Some(Proposition::Ladder {
                entity,
                t: group % self.steps(),
                index: index % width,
            });
        }

        None
    }

    /// Player variables of every floor cell at time `t`, in row-major order
    pub fn player_vars_at(&self, t: usize) -> Vec<(Position, Var)> {
        self.floor_cells
            .iter()
            .filter_map(|&pos| self.player_at(pos, t).map(|var| (pos, var)))
            .collect()
    }

    /// Box `b` variables of every floor cell at time `t`, in row-major order
    pub fn box_vars_at(&self, b: usize, t: usize) -> Vec<(Position, Var)> {
        self.floor_cells
            .iter()
            .filter_map(|&pos| self.box_at(b, pos, t).map(|var| (pos, var)))
            .collect()
    }

    pub fn floor_cells(&self) -> &[Position] {
        &self.floor_cells
    }

    /// Number of ids an indexer for `level` and `horizon` would hand out, or
    /// `None` when they do not fit the positive `i32` range
    pub fn required_variables(level: &Level, horizon: usize, ladders: bool) -> Option<usize> {
        let floor = level.floor_count();
        let steps = horizon.checked_add(1)?;
        let per_entity = floor.checked_mul(steps)?;
        let entities = level.box_count().checked_add(1)?;
        let mut total = per_entity.checked_mul(entities)?;
        if ladders {
            let ladder = floor.saturating_sub(1).checked_mul(steps)?.checked_mul(entities)?;
            total = total.checked_add(ladder)?;
        }
        (total <= i32::MAX as usize).then_some(total)
    }

    /// Total number of ids handed out; ids are exactly `1..=variable_count`
    pub fn variable_count(&self) -> usize {
        self.player_block() + self.box_block() + self.ladder_block()
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn box_count(&self) -> usize {
        self.box_count
    }

    /// Get statistics about variable usage
    pub fn statistics(&self) -> VariableStatistics {
        VariableStatistics {
            total_variables: self.variable_count(),
            player_variables: self.player_block(),
            box_variables: self.box_block(),
            ladder_variables: self.ladder_block(),
        }
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub player_variables: usize,
    pub box_variables: usize,
    pub ladder_variables: usize,
}

impl fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Player variables: {}", self.player_variables)?;
        writeln!(f, "  Box variables: {}", self.box_variables)?;
        writeln!(f, "  Ladder variables: {}", self.ladder_variables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn level() -> Level {
        // 7 floor cells, 2 boxes
        Level::from_rows(&["#####", "#PBG#", "#.BG#", "##.##"]).unwrap()
    }

    fn all_propositions(level: &Level, horizon: usize, indexer: &VariableIndexer) -> Vec<Proposition> {
        let mut props = Vec::new();
        for t in 0..=horizon {
            for pos in level.floor_cells() {
                props.push(Proposition::PlayerAt { pos, t });
                for b in 0..level.box_count() {
                    props.push(Proposition::BoxAt { b, pos, t });
                }
            }
            for index in 0..indexer.floor_cells().len() - 1 {
                props.push(Proposition::Ladder { entity: Entity::Player, t, index });
                for b in 0..level.box_count() {
                    props.push(Proposition::Ladder { entity: Entity::Box(b), t, index });
                }
            }
        }
        props
    }

    #[test]
    fn test_range_sizes() {
        let level = level();
        let indexer = VariableIndexer::new(&level, 3, false);
        let floor = level.rows * level.cols - level.wall_count();
        assert_eq!(floor, 7);

        let stats = indexer.statistics();
        assert_eq!(stats.player_variables, floor * 4);
        assert_eq!(stats.box_variables, 2 * floor * 4);
        assert_eq!(stats.ladder_variables, 0);
        assert_eq!(indexer.variable_count(), 3 * floor * 4);
    }

    #[test]
    fn test_bijection_covers_dense_range() {
        let level = level();
        let horizon = 2;
        let indexer = VariableIndexer::new(&level, horizon, true);

        let props = all_propositions(&level, horizon, &indexer);
        let mut seen = HashSet::new();
        for prop in &props {
            let var = indexer.variable(*prop).unwrap();
            assert!(var.id() >= 1 && var.id() as usize <= indexer.variable_count());
            assert!(seen.insert(var), "duplicate id for {:?}", prop);
            assert_eq!(indexer.proposition(var), Some(*prop));
        }
        assert_eq!(seen.len(), indexer.variable_count());
    }

    #[test]
    fn test_player_and_box_ranges_disjoint() {
        let level = level();
        let indexer = VariableIndexer::new(&level, 1, false);

        let max_player = (0..=1)
            .flat_map(|t| indexer.player_vars_at(t))
            .map(|(_, var)| var)
            .max()
            .unwrap();
        let mut box_vars = Vec::new();
        for b in 0..2 {
            for t in 0..=1 {
                box_vars.extend(indexer.box_vars_at(b, t).into_iter().map(|(_, var)| var));
            }
        }
        let min_box = box_vars.into_iter().min().unwrap();
        assert!(max_player < min_box);
    }

    #[test]
    fn test_idempotent_lookup() {
        let level = level();
        let indexer = VariableIndexer::new(&level, 4, false);
        let pos = Position::new(2, 1);

        let first = indexer.player_at(pos, 3);
        let again = indexer.player_at(pos, 3);
        assert!(first.is_some());
        assert_eq!(first, again);
        assert_ne!(indexer.player_at(pos, 3), indexer.player_at(pos, 2));
        assert_ne!(indexer.box_at(0, pos, 3), indexer.box_at(1, pos, 3));
    }

    #[test]
    fn test_walls_and_out_of_range_have_no_variable() {
        let level = level();
        let indexer = VariableIndexer::new(&level, 2, false);

        assert_eq!(indexer.player_at(Position::new(0, 0), 0), None);
        assert_eq!(indexer.box_at(0, Position::new(3, 0), 1), None);
        assert_eq!(indexer.player_at(Position::new(9, 9), 0), None);
        assert_eq!(indexer.player_at(Position::new(1, 1), 3), None);
        assert_eq!(indexer.box_at(2, Position::new(1, 1), 0), None);
        assert_eq!(indexer.ladder(Entity::Player, 0, 0), None);
        assert_eq!(indexer.proposition(Var::from_index(indexer.variable_count()).unwrap()), None);
    }

    #[test]
    fn test_literals() {
        let var = Var::from_index(4).unwrap();
        assert_eq!(var.id(), 5);
        assert_eq!(Var::from_small_index(4), var);
        assert_eq!(var.positive().to_dimacs(), 5);
        assert_eq!((!var.positive()).to_dimacs(), -5);
        assert_eq!(var.negative().var(), var);
        assert!(!var.negative().is_positive());
        assert_eq!(Var::from_dimacs(0), None);
        assert_eq!(Var::from_dimacs(-3), None);
    }

    #[test]
    fn test_ids_stay_in_i32_range() {
        let last = i32::MAX as usize - 1;
        assert_eq!(Var::from_index(last).map(Var::id), Some(i32::MAX));
        assert_eq!(Var::from_index(last + 1), None);
        assert_eq!(Var::from_index(usize::MAX), None);
    }

    #[test]
    fn test_required_variables() {
        let level = level();
        assert_eq!(
            VariableIndexer::required_variables(&level, 3, false),
            Some(VariableIndexer::new(&level, 3, false).variable_count())
        );
        assert_eq!(
            VariableIndexer::required_variables(&level, 2, true),
            Some(VariableIndexer::new(&level, 2, true).variable_count())
        );

        // 3 entities over 7 floor cells need 21 ids per step
        assert_eq!(VariableIndexer::required_variables(&level, 200_000_000, false), None);
        assert_eq!(VariableIndexer::required_variables(&level, usize::MAX, false), None);
    }
}
