//! Sokoban move and push rules, used to replay decoded plans

use super::{Direction, Level, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Positions of every movable entity at one instant
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub player: Position,
    /// Indexed by box identity
    pub boxes: Vec<Position>,
}

/// Why a move cannot be applied to a state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveViolation {
    /// The player would walk into a wall or off the level
    Blocked { target: Position },
    /// The pushed box would hit a wall, leave the level or hit another box
    BoxBlocked { b: usize, target: Position },
}

impl fmt::Display for MoveViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveViolation::Blocked { target } => write!(f, "player cannot enter {}", target),
            MoveViolation::BoxBlocked { b, target } => write!(f, "box {} cannot be pushed into {}", b, target),
        }
    }
}

/// Result of applying one move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: State,
    /// Box pushed by this move, if any
    pub pushed: Option<usize>,
}

/// Rules engine for a fixed level
pub struct SokobanRules;

impl SokobanRules {
    /// The configuration described by the level text
    pub fn initial_state(level: &Level) -> State {
        State {
            player: level.player(),
            boxes: level.boxes().to_vec(),
        }
    }

    /// Apply a single move, pushing at most one box
    pub fn apply(level: &Level, state: &State, direction: Direction) -> Result<Step, MoveViolation> {
        let target = level
            .neighbor(state.player, direction)
            .ok_or_else(|| MoveViolation::Blocked {
                target: state.player.step(direction).unwrap_or(state.player),
            })?;

        let mut next = state.clone();
        next.player = target;

        let pushed = state.boxes.iter().position(|&pos| pos == target);
        if let Some(b) = pushed {
            let beyond = level
                .neighbor(target, direction)
                .filter(|pos| !state.boxes.contains(pos))
                .ok_or_else(|| MoveViolation::BoxBlocked {
                    b,
                    target: target.step(direction).unwrap_or(target),
                })?;
            next.boxes[b] = beyond;
        }

        Ok(Step { state: next, pushed })
    }

    /// Whether every box rests on a goal cell
    pub fn is_solved(level: &Level, state: &State) -> bool {
        state.boxes.iter().all(|pos| level.is_goal(*pos))
    }

    /// Whether no entity sits on a wall and no two entities share a cell
    pub fn is_consistent(level: &Level, state: &State) -> bool {
        if !level.is_floor(state.player) {
            return false;
        }
        for (i, pos) in state.boxes.iter().enumerate() {
            if !level.is_floor(*pos) || *pos == state.player {
                return false;
            }
            if state.boxes[i + 1..].contains(pos) {
                return false;
            }
        }
        true
    }
}
