//! Sokoban planning problem: encode, solve, decode and verify at one horizon

use super::solution::PlanOutcome;
use super::validator::PlanValidator;
use crate::config::Settings;
use crate::error::{GridError, SolveError};
use crate::sat::{
    AssignmentDecoder, AtMostOneEncoding, ComplexityEstimate, Encoding, EncodingStatistics, SatSolver,
    TransitionEncoder, VariableIndexer,
};
use crate::sokoban::{load_level_from_file, Level};
use anyhow::{Context, Result};
use log::{info, warn};
use std::io::{self, Write};

/// A level paired with the settings it is planned under
pub struct SokobanProblem {
    level: Level,
    settings: Settings,
}

impl SokobanProblem {
    /// Create a problem, checking the goal cover first when configured.
    ///
    /// Horizons whose variables would not fit SAT ids are rejected here.
    pub fn new(level: Level, settings: Settings) -> Result<Self, SolveError> {
        if settings.planning.require_goal_cover {
            level.check_goal_cover()?;
        }
        let ladders = settings.encoding.at_most_one == AtMostOneEncoding::Sequential;
        let horizon = settings.planning.horizon;
        if VariableIndexer::required_variables(&level, horizon, ladders).is_none() {
            return Err(GridError::EncodingTooLarge { horizon }.into());
        }
        Ok(Self { level, settings })
    }

    /// Create a problem from the level file named in the settings
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let level = load_level_from_file(&settings.input.level_file).context("Failed to load level file")?;
        Ok(Self::new(level, settings)?)
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn horizon(&self) -> usize {
        self.settings.planning.horizon
    }

    fn encoder(&self) -> TransitionEncoder<'_> {
        TransitionEncoder::new(&self.level, self.horizon(), self.settings.encoder_options())
    }

    /// Build the clause set without solving it
    pub fn encode(&self) -> Encoding {
        self.encoder().encode()
    }

    /// Run the full pipeline once.
    ///
    /// Unsatisfiability at the configured horizon is `PlanOutcome::NoPlan`;
    /// errors are reserved for solver failures and inconsistent models.
    pub fn solve(&self) -> Result<PlanOutcome, SolveError> {
        let encoder = self.encoder();
        let encoding = encoder.encode();

        let mut solver = SatSolver::with_options(&self.settings.solver_options());
        solver.declare_variables(encoder.indexer().variable_count());
        solver.add_clauses(&encoding.clauses);
        let outcome = solver.solve()?;

        let decoded = AssignmentDecoder::new(encoder.indexer()).decode(&outcome)?;
        match decoded {
            PlanOutcome::Plan(mut plan) => {
                plan.solve_time = solver.last_solve_time();
                info!("found plan '{}' at horizon {}", plan.move_string(), self.horizon());

                if self.settings.planning.verify_plans {
                    let result = PlanValidator::new(&self.level).validate(&plan);
                    if !result.is_valid {
                        let message = result.error_message.unwrap_or_else(|| "unknown error".to_string());
                        warn!("decoded plan failed replay: {}", message);
                        return Err(SolveError::Verification(message));
                    }
                }

                Ok(PlanOutcome::Plan(plan))
            }
            PlanOutcome::NoPlan { horizon } => {
                info!("no plan exists within {} steps", horizon);
                Ok(PlanOutcome::NoPlan { horizon })
            }
        }
    }

    /// Get encoding statistics
    pub fn statistics(&self) -> EncodingStatistics {
        self.encode().statistics
    }

    pub fn estimate_complexity(&self) -> ComplexityEstimate {
        self.encoder().estimate_complexity()
    }

    /// Write the encoding in DIMACS CNF format
    pub fn write_dimacs<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let encoder = self.encoder();
        let encoding = encoder.encode();
        encoding.clauses.write_dimacs(writer, encoder.indexer().variable_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GridError;
    use crate::sat::AtMostOneEncoding;
    use crate::sokoban::{Direction, Position};

    fn problem(rows: &[&str], horizon: usize) -> SokobanProblem {
        let mut settings = Settings::default();
        settings.planning.horizon = horizon;
        SokobanProblem::new(Level::from_rows(rows).unwrap(), settings).unwrap()
    }

    const SINGLE_PUSH: [&str; 4] = ["#.#", ".P.", "#B#", "#G#"];

    #[test]
    fn test_single_push_at_two_steps() {
        let plan = problem(&SINGLE_PUSH, 2).solve().unwrap().into_plan().unwrap();
        // a second step may walk back up, but the push comes first
        assert_eq!(plan.moves[0], Direction::Down);
        assert_eq!(plan.push_count(), 1);
        assert_eq!(plan.trajectory.states.len(), 3);
        assert_eq!(plan.trajectory.states[2].boxes, vec![Position::new(3, 1)]);
    }

    #[test]
    fn test_single_push_fits_one_step() {
        let plan = problem(&SINGLE_PUSH, 1).solve().unwrap().into_plan().unwrap();
        assert_eq!(plan.move_string(), "D");
    }

    #[test]
    fn test_zero_horizon_has_no_plan() {
        match problem(&SINGLE_PUSH, 0).solve().unwrap() {
            PlanOutcome::NoPlan { horizon } => assert_eq!(horizon, 0),
            PlanOutcome::Plan(plan) => panic!("unexpected plan {}", plan),
        }
    }

    #[test]
    fn test_solved_level_gives_empty_plan() {
        let plan = problem(&["####", "#PX#", "####"], 0).solve().unwrap().into_plan().unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_cornered_box_has_no_plan() {
        let outcome = problem(&["#####", "#B.P#", "#..G#", "#####"], 6).solve().unwrap();
        assert!(!outcome.is_plan());
    }

    #[test]
    fn test_two_boxes_replay() {
        let rows = ["######", "#PB.G#", "#.B.G#", "######"];
        let plan = problem(&rows, 10).solve().unwrap().into_plan().unwrap();

        let result = PlanValidator::new(&Level::from_rows(&rows).unwrap()).validate(&plan);
        assert!(result.is_valid, "{:?}", result.error_message);
        assert!(plan.len() >= 7);
        assert!(result.validation_details.pushes >= 4);
    }

    #[test]
    fn test_sequential_encoding_agrees() {
        let rows = ["######", "#PB.G#", "#.B.G#", "######"];
        let mut settings = Settings::default();
        settings.planning.horizon = 7;
        settings.encoding.at_most_one = AtMostOneEncoding::Sequential;
        settings.encoding.parallel = true;

        let level = Level::from_rows(&rows).unwrap();
        let outcome = SokobanProblem::new(level, settings.clone()).unwrap().solve().unwrap();
        assert!(outcome.is_plan());

        settings.planning.horizon = 6;
        let level = Level::from_rows(&rows).unwrap();
        let outcome = SokobanProblem::new(level, settings).unwrap().solve().unwrap();
        assert!(!outcome.is_plan());
    }

    #[test]
    fn test_goal_cover_check() {
        let level = Level::from_rows(&["#####", "#PBB#", "#G..#", "#####"]).unwrap();
        let result = SokobanProblem::new(level.clone(), Settings::default());
        assert!(matches!(
            result,
            Err(SolveError::Grid(GridError::TooFewGoals { boxes: 2, goals: 1 }))
        ));

        let mut settings = Settings::default();
        settings.planning.require_goal_cover = false;
        settings.planning.horizon = 3;
        let outcome = SokobanProblem::new(level, settings).unwrap().solve().unwrap();
        assert!(!outcome.is_plan());
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let level = Level::from_rows(&["#####", "#PBG#", "#####"]).unwrap();

        // 3 floor cells for the player and one box: 6 ids per step
        let mut settings = Settings::default();
        settings.planning.horizon = 400_000_000;
        let result = SokobanProblem::new(level.clone(), settings.clone());
        assert!(matches!(
            result,
            Err(SolveError::Grid(GridError::EncodingTooLarge { horizon: 400_000_000 }))
        ));

        settings.planning.horizon = 300_000_000;
        assert!(SokobanProblem::new(level.clone(), settings.clone()).is_ok());

        // the ladder auxiliaries push the same horizon over the limit
        settings.encoding.at_most_one = AtMostOneEncoding::Sequential;
        assert!(SokobanProblem::new(level, settings).is_err());
    }

    #[test]
    fn test_dimacs_export() {
        let problem = problem(&SINGLE_PUSH, 2);
        let mut out = Vec::new();
        problem.write_dimacs(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let stats = problem.statistics();
        assert_eq!(
            text.lines().next().unwrap(),
            format!("p cnf {} {}", stats.total_variables, stats.total_clauses)
        );
        assert_eq!(text.lines().count(), stats.total_clauses + 1);
    }
}
