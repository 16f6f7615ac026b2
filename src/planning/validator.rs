//! Plan validation by replaying moves through the Sokoban rules

use super::solution::Plan;
use crate::sokoban::{Level, MoveViolation, SokobanRules, State};
use std::time::Instant;

/// Replays plans against a level
pub struct PlanValidator<'a> {
    level: &'a Level,
}

/// Result of plan validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Initial state followed by the state after each move
    pub replayed_states: Vec<State>,
    pub error_message: Option<String>,
    pub validation_details: ValidationDetails,
}

/// Detailed validation information
#[derive(Debug, Clone, Default)]
pub struct ValidationDetails {
    pub moves_checked: usize,
    pub pushes: usize,
    /// First move the rules refused, with its index
    pub violation: Option<(usize, MoveViolation)>,
    /// Replayed states agree with the decoded trajectory once waits are dropped
    pub trajectory_matches: bool,
    /// First decoded state with an entity on a wall or two entities sharing a cell
    pub inconsistent_state: Option<usize>,
    pub final_state_solved: bool,
    pub validation_time_ms: u64,
}

impl<'a> PlanValidator<'a> {
    pub fn new(level: &'a Level) -> Self {
        Self { level }
    }

    /// Replay `plan` from the initial state
    pub fn validate(&self, plan: &Plan) -> ValidationResult {
        let start_time = Instant::now();
        let mut details = ValidationDetails::default();

        let mut state = SokobanRules::initial_state(self.level);
        let mut replayed_states = vec![state.clone()];

        for (i, &direction) in plan.moves.iter().enumerate() {
            match SokobanRules::apply(self.level, &state, direction) {
                Ok(step) => {
                    if step.pushed.is_some() {
                        details.pushes += 1;
                    }
                    state = step.state;
                    replayed_states.push(state.clone());
                    details.moves_checked += 1;
                }
                Err(violation) => {
                    details.violation = Some((i, violation));
                    break;
                }
            }
        }

        details.inconsistent_state = plan
            .trajectory
            .states
            .iter()
            .position(|state| !SokobanRules::is_consistent(self.level, state));
        details.trajectory_matches = self.matches_trajectory(plan, &replayed_states);
        details.final_state_solved = details.violation.is_none() && SokobanRules::is_solved(self.level, &state);
        details.validation_time_ms = start_time.elapsed().as_millis() as u64;

        let is_valid = details.violation.is_none()
            && details.inconsistent_state.is_none()
            && details.trajectory_matches
            && details.final_state_solved;
        let error_message = if is_valid {
            None
        } else {
            Some(Self::generate_error_message(&details))
        };

        ValidationResult {
            is_valid,
            replayed_states,
            error_message,
            validation_details: details,
        }
    }

    /// Compare replayed states with the decoded trajectory, skipping waits
    fn matches_trajectory(&self, plan: &Plan, replayed: &[State]) -> bool {
        let states = &plan.trajectory.states;
        if states.is_empty() {
            return false;
        }

        let mut moving = vec![&states[0]];
        for pair in states.windows(2) {
            if pair[0].player == pair[1].player {
                if pair[0].boxes != pair[1].boxes {
                    return false;
                }
            } else {
                moving.push(&pair[1]);
            }
        }

        moving.len() == replayed.len() && moving.iter().zip(replayed).all(|(a, b)| *a == b)
    }

    fn generate_error_message(details: &ValidationDetails) -> String {
        let mut errors = Vec::new();

        if let Some((i, violation)) = &details.violation {
            errors.push(format!("move {} is illegal: {}", i + 1, violation));
        }
        if let Some(t) = details.inconsistent_state {
            errors.push(format!("decoded state at time {} overlaps walls or entities", t));
        }
        if !details.trajectory_matches {
            errors.push("replayed states differ from the decoded trajectory".to_string());
        }
        if details.violation.is_none() && !details.final_state_solved {
            errors.push("not every box ends on a goal".to_string());
        }

        errors.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::Trajectory;
    use crate::sokoban::{Direction, Position};

    fn level() -> Level {
        Level::from_rows(&["#.#", ".P.", "#B#", "#G#"]).unwrap()
    }

    fn state(player: (usize, usize), b: (usize, usize)) -> State {
        State {
            player: Position::new(player.0, player.1),
            boxes: vec![Position::new(b.0, b.1)],
        }
    }

    #[test]
    fn test_valid_plan_with_wait() {
        let level = level();
        let plan = Plan::new(
            vec![Direction::Down],
            Trajectory {
                states: vec![state((1, 1), (2, 1)), state((1, 1), (2, 1)), state((2, 1), (3, 1))],
            },
        );

        let result = PlanValidator::new(&level).validate(&plan);
        assert!(result.is_valid, "{:?}", result.error_message);
        assert_eq!(result.replayed_states.len(), 2);
        assert_eq!(result.validation_details.pushes, 1);
    }

    #[test]
    fn test_illegal_move() {
        let level = level();
        let plan = Plan::new(
            vec![Direction::Down, Direction::Down],
            Trajectory {
                states: vec![state((1, 1), (2, 1)), state((2, 1), (3, 1)), state((3, 1), (4, 1))],
            },
        );

        let result = PlanValidator::new(&level).validate(&plan);
        assert!(!result.is_valid);
        assert!(matches!(
            result.validation_details.violation,
            Some((1, MoveViolation::BoxBlocked { b: 0, .. }))
        ));
        assert!(result.error_message.unwrap().contains("move 2"));
    }

    #[test]
    fn test_unsolved_final_state() {
        let level = level();
        let plan = Plan::new(
            vec![Direction::Left],
            Trajectory {
                states: vec![state((1, 1), (2, 1)), state((1, 0), (2, 1))],
            },
        );

        let result = PlanValidator::new(&level).validate(&plan);
        assert!(!result.is_valid);
        assert!(result.validation_details.trajectory_matches);
        assert!(!result.validation_details.final_state_solved);
    }

    #[test]
    fn test_trajectory_mismatch() {
        let level = level();
        // box teleports during a wait
        let plan = Plan::new(
            vec![Direction::Down],
            Trajectory {
                states: vec![state((1, 1), (2, 1)), state((1, 1), (3, 1)), state((2, 1), (3, 1))],
            },
        );

        let result = PlanValidator::new(&level).validate(&plan);
        assert!(!result.is_valid);
        assert!(!result.validation_details.trajectory_matches);
    }

    #[test]
    fn test_inconsistent_decoded_state() {
        let level = level();
        // the player stands on the box during a wait
        let plan = Plan::new(
            vec![Direction::Down],
            Trajectory {
                states: vec![state((1, 1), (2, 1)), state((2, 1), (2, 1)), state((2, 1), (3, 1))],
            },
        );

        let result = PlanValidator::new(&level).validate(&plan);
        assert!(!result.is_valid);
        assert_eq!(result.validation_details.inconsistent_state, Some(1));
        assert!(result.error_message.unwrap().contains("time 1"));
    }
}
