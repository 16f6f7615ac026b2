//! Plan representation for Sokoban problems

use crate::sokoban::{Direction, Position, State};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Positions of the player and every box for each time step `0..=T`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    pub states: Vec<State>,
}

impl Trajectory {
    pub fn horizon(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn player_path(&self) -> Vec<Position> {
        self.states.iter().map(|s| s.player).collect()
    }

    /// Time steps at which the player stayed in place
    pub fn wait_steps(&self) -> usize {
        self.states.windows(2).filter(|w| w[0].player == w[1].player).count()
    }
}

/// A move sequence together with the trajectory it was decoded from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub moves: Vec<Direction>,
    pub trajectory: Trajectory,
    /// Horizon the plan was found at
    pub horizon: usize,
    /// Time spent inside the SAT engine
    #[serde(skip)]
    pub solve_time: Duration,
}

impl Plan {
    pub fn new(moves: Vec<Direction>, trajectory: Trajectory) -> Self {
        let horizon = trajectory.horizon();
        Self {
            moves,
            trajectory,
            horizon,
            solve_time: Duration::ZERO,
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves as a `U`/`D`/`L`/`R` string
    pub fn move_string(&self) -> String {
        self.moves.iter().map(|d| d.symbol()).collect()
    }

    /// Number of moves that push a box
    pub fn push_count(&self) -> usize {
        self.trajectory
            .states
            .windows(2)
            .filter(|w| w[0].boxes != w[1].boxes)
            .count()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            moves: self.move_string(),
            length: self.len(),
            pushes: self.push_count(),
            waits: self.trajectory.wait_steps(),
            horizon: self.horizon,
            solve_time_ms: self.solve_time.as_millis() as u64,
        }
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "(empty plan)")
        } else {
            write!(f, "{}", self.move_string())
        }
    }
}

/// Outcome of planning at a fixed horizon.
///
/// `NoPlan` is a legitimate answer, not an error; the caller may retry with
/// a larger horizon. An empty `Plan` means the level is already solved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlanOutcome {
    Plan(Plan),
    NoPlan { horizon: usize },
}

impl PlanOutcome {
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            PlanOutcome::Plan(plan) => Some(plan),
            PlanOutcome::NoPlan { .. } => None,
        }
    }

    pub fn into_plan(self) -> Option<Plan> {
        match self {
            PlanOutcome::Plan(plan) => Some(plan),
            PlanOutcome::NoPlan { .. } => None,
        }
    }

    pub fn is_plan(&self) -> bool {
        self.plan().is_some()
    }
}

impl fmt::Display for PlanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanOutcome::Plan(plan) => write!(f, "{}", plan),
            PlanOutcome::NoPlan { horizon } => write!(f, "no plan within {} steps", horizon),
        }
    }
}

/// Summary of a plan for display purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub moves: String,
    pub length: usize,
    pub pushes: usize,
    pub waits: usize,
    pub horizon: usize,
    pub solve_time_ms: u64,
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plan {}: {} moves ({} pushes, {} waits) at horizon {}, {}ms",
            if self.moves.is_empty() { "-" } else { &self.moves },
            self.length,
            self.pushes,
            self.waits,
            self.horizon,
            self.solve_time_ms
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(player: (usize, usize), boxes: &[(usize, usize)]) -> State {
        State {
            player: Position::new(player.0, player.1),
            boxes: boxes.iter().map(|&(r, c)| Position::new(r, c)).collect(),
        }
    }

    #[test]
    fn test_plan_statistics() {
        let trajectory = Trajectory {
            states: vec![
                state((1, 1), &[(2, 1)]),
                state((1, 1), &[(2, 1)]),
                state((2, 1), &[(3, 1)]),
            ],
        };
        let plan = Plan::new(vec![Direction::Down], trajectory);

        assert_eq!(plan.horizon, 2);
        assert_eq!(plan.move_string(), "D");
        assert_eq!(plan.push_count(), 1);
        assert_eq!(plan.trajectory.wait_steps(), 1);
        assert_eq!(plan.summary().length, 1);
    }

    #[test]
    fn test_empty_plan_differs_from_no_plan() {
        let trajectory = Trajectory {
            states: vec![state((0, 0), &[])],
        };
        let empty = PlanOutcome::Plan(Plan::new(Vec::new(), trajectory));
        let none = PlanOutcome::NoPlan { horizon: 0 };

        assert!(empty.is_plan());
        assert!(empty.plan().unwrap().is_empty());
        assert!(!none.is_plan());
        assert_eq!(none.to_string(), "no plan within 0 steps");
    }

    #[test]
    fn test_json_round_trip() {
        let trajectory = Trajectory {
            states: vec![state((1, 1), &[(1, 2)]), state((1, 2), &[(1, 3)])],
        };
        let plan = Plan::new(vec![Direction::Right], trajectory);

        let json = plan.to_json().unwrap();
        let loaded = Plan::from_json(&json).unwrap();
        assert_eq!(loaded.moves, plan.moves);
        assert_eq!(loaded.trajectory, plan.trajectory);
    }
}
