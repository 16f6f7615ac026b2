//! Decoding of satisfying assignments into Sokoban plans

use super::solver::{Model, SolveOutcome};
use super::variables::{Var, VariableIndexer};
use crate::error::DecodeError;
use crate::planning::{Plan, PlanOutcome, Trajectory};
use crate::sokoban::{Direction, Position, State};
use log::debug;

/// Reads trajectories and move sequences out of models produced for one
/// encoding. The indexer must be the one the clauses were built with.
pub struct AssignmentDecoder<'a> {
    indexer: &'a VariableIndexer,
}

impl<'a> AssignmentDecoder<'a> {
    pub fn new(indexer: &'a VariableIndexer) -> Self {
        Self { indexer }
    }

    /// Turn a solver answer into a plan outcome
    pub fn decode(&self, outcome: &SolveOutcome) -> Result<PlanOutcome, DecodeError> {
        match outcome {
            SolveOutcome::Unsatisfiable => Ok(PlanOutcome::NoPlan {
                horizon: self.indexer.horizon(),
            }),
            SolveOutcome::Satisfiable(model) => {
                let trajectory = self.trajectory(model)?;
                let moves = Self::moves(&trajectory)?;
                Ok(PlanOutcome::Plan(Plan::new(moves, trajectory)))
            }
        }
    }

    /// The unique true cell among `vars`
    fn unique_cell(model: &Model, vars: &[(Position, Var)]) -> Result<Position, usize> {
        let mut found = vars.iter().filter(|(_, var)| model.value(*var)).map(|(pos, _)| *pos);
        match (found.next(), found.count()) {
            (Some(pos), 0) => Ok(pos),
            (None, _) => Err(0),
            (Some(_), rest) => Err(rest + 1),
        }
    }

    /// Positions of every entity at each time step
    pub fn trajectory(&self, model: &Model) -> Result<Trajectory, DecodeError> {
        let mut states = Vec::with_capacity(self.indexer.horizon() + 1);

        for t in 0..=self.indexer.horizon() {
            let player = Self::unique_cell(model, &self.indexer.player_vars_at(t)).map_err(|count| {
                if count == 0 {
                    DecodeError::MissingPlayer { t }
                } else {
                    DecodeError::AmbiguousPlayer { t, count }
                }
            })?;

            let mut boxes = Vec::with_capacity(self.indexer.box_count());
            for b in 0..self.indexer.box_count() {
                let pos = Self::unique_cell(model, &self.indexer.box_vars_at(b, t)).map_err(|count| {
                    if count == 0 {
                        DecodeError::MissingBox { b, t }
                    } else {
                        DecodeError::AmbiguousBox { b, t, count }
                    }
                })?;
                boxes.push(pos);
            }

            states.push(State { player, boxes });
        }

        Ok(Trajectory { states })
    }

    /// Convert consecutive player positions into moves; standing still is a
    /// wait and produces no symbol
    pub fn moves(trajectory: &Trajectory) -> Result<Vec<Direction>, DecodeError> {
        let mut moves = Vec::new();

        for (t, pair) in trajectory.states.windows(2).enumerate() {
            let (from, to) = (pair[0].player, pair[1].player);
            if from == to {
                debug!("player waits at {} during step {}", from, t);
                continue;
            }
            let direction =
                Direction::between(from, to).ok_or(DecodeError::IllegalDisplacement { t, from, to })?;
            moves.push(direction);
        }

        Ok(moves)
    }
}
