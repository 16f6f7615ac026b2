//! Transition encoder: the bounded-horizon Sokoban CNF

use super::constraints::{AtMostOneEncoding, ClauseSet};
use super::variables::{Entity, Lit, Var, VariableIndexer};
use crate::sokoban::{Direction, Level, Position};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::time::{Duration, Instant};

/// Knobs that change the shape of the CNF but not its meaning
#[derive(Debug, Clone, Copy, Default)]
pub struct EncoderOptions {
    pub at_most_one: AtMostOneEncoding,
    /// Build per-time-step groups on the rayon pool
    pub parallel: bool,
}

/// The clause families of the encoding, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseGroup {
    InitialState,
    ExactlyOne,
    NoOverlap,
    Movement,
    Push,
    Frame,
    Goal,
}

impl ClauseGroup {
    pub const ALL: [ClauseGroup; 7] = [
        ClauseGroup::InitialState,
        ClauseGroup::ExactlyOne,
        ClauseGroup::NoOverlap,
        ClauseGroup::Movement,
        ClauseGroup::Push,
        ClauseGroup::Frame,
        ClauseGroup::Goal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ClauseGroup::InitialState => "initial state",
            ClauseGroup::ExactlyOne => "exactly one",
            ClauseGroup::NoOverlap => "no overlap",
            ClauseGroup::Movement => "movement",
            ClauseGroup::Push => "push",
            ClauseGroup::Frame => "frame",
            ClauseGroup::Goal => "goal",
        }
    }
}

/// A finished encoding
#[derive(Debug, Clone)]
pub struct Encoding {
    pub clauses: ClauseSet,
    pub statistics: EncodingStatistics,
}

/// Builds `F(level, T)`, satisfiable iff `T` steps of moves, pushes and
/// waits bring every box onto a goal.
pub struct TransitionEncoder<'a> {
    level: &'a Level,
    indexer: VariableIndexer,
    options: EncoderOptions,
}

impl<'a> TransitionEncoder<'a> {
    pub fn new(level: &'a Level, horizon: usize, options: EncoderOptions) -> Self {
        let ladders = options.at_most_one == AtMostOneEncoding::Sequential;
        Self {
            level,
            indexer: VariableIndexer::new(level, horizon, ladders),
            options,
        }
    }

    pub fn indexer(&self) -> &VariableIndexer {
        &self.indexer
    }

    pub fn horizon(&self) -> usize {
        self.indexer.horizon()
    }

    fn player(&self, pos: Position, t: usize) -> Option<Var> {
        self.indexer.player_at(pos, t)
    }

    fn boxed(&self, b: usize, pos: Position, t: usize) -> Option<Var> {
        self.indexer.box_at(b, pos, t)
    }

    /// Emit every clause group
    pub fn encode(&self) -> Encoding {
        let start = Instant::now();
        let horizon = self.horizon();
        let states = 0..horizon + 1;
        let transitions = 0..horizon;

        let groups = [
            (ClauseGroup::InitialState, self.initial_state()),
            (ClauseGroup::ExactlyOne, self.per_step(states.clone(), |t| self.exactly_one_at(t))),
            (ClauseGroup::NoOverlap, self.per_step(states, |t| self.no_overlap_at(t))),
            (ClauseGroup::Movement, self.per_step(transitions.clone(), |t| self.movement_at(t))),
            (ClauseGroup::Push, self.per_step(transitions.clone(), |t| self.push_at(t))),
            (ClauseGroup::Frame, self.per_step(transitions, |t| self.frame_at(t))),
            (ClauseGroup::Goal, self.goal()),
        ];

        let mut clauses = ClauseSet::new();
        let mut group_clauses = BTreeMap::new();
        for (group, set) in groups {
            debug!("{} clauses: {}", group.name(), set.len());
            group_clauses.insert(group, set.len());
            clauses.append(set);
        }

        let statistics = EncodingStatistics {
            horizon,
            rows: self.level.rows,
            cols: self.level.cols,
            floor_cells: self.indexer.floor_cells().len(),
            boxes: self.level.box_count(),
            total_variables: self.indexer.variable_count(),
            total_clauses: clauses.len(),
            group_clauses,
            at_most_one: self.options.at_most_one,
            encode_time: start.elapsed(),
        };
        info!(
            "encoded horizon {} with {} variables and {} clauses",
            horizon, statistics.total_variables, statistics.total_clauses
        );

        Encoding { clauses, statistics }
    }

    /// Build one set per time step and concatenate them in time order
    fn per_step<F>(&self, steps: Range<usize>, build: F) -> ClauseSet
    where
        F: Fn(usize) -> ClauseSet + Sync + Send,
    {
        if self.options.parallel {
            let parts: Vec<ClauseSet> = steps.into_par_iter().map(build).collect();
            parts.into_iter().collect()
        } else {
            steps.map(build).collect()
        }
    }

    /// Unit clauses fixing the configuration at `t = 0`
    pub fn initial_state(&self) -> ClauseSet {
        let mut set = ClauseSet::new();
        if let Some(var) = self.player(self.level.player(), 0) {
            set.add_unit(var.positive());
        }
        for (b, &pos) in self.level.boxes().iter().enumerate() {
            if let Some(var) = self.boxed(b, pos, 0) {
                set.add_unit(var.positive());
            }
        }
        set
    }

    fn exactly_one_group(&self, set: &mut ClauseSet, entity: Entity, t: usize, vars: Vec<(Position, Var)>) {
        let vars: Vec<Var> = vars.into_iter().map(|(_, var)| var).collect();
        let aux: Vec<Var> = (0..vars.len().saturating_sub(1))
            .filter_map(|index| self.indexer.ladder(entity, t, index))
            .collect();
        set.exactly_one(&vars, self.options.at_most_one, &aux);
    }

    /// The player and each box occupy exactly one floor cell at `t`
    pub fn exactly_one_at(&self, t: usize) -> ClauseSet {
        let mut set = ClauseSet::new();
        self.exactly_one_group(&mut set, Entity::Player, t, self.indexer.player_vars_at(t));
        for b in 0..self.level.box_count() {
            self.exactly_one_group(&mut set, Entity::Box(b), t, self.indexer.box_vars_at(b, t));
        }
        set
    }

    /// No two boxes, and no box and the player, share a cell at `t`
    pub fn no_overlap_at(&self, t: usize) -> ClauseSet {
        let mut set = ClauseSet::new();
        for &pos in self.indexer.floor_cells() {
            let boxes: Vec<Var> = (0..self.level.box_count())
                .filter_map(|b| self.boxed(b, pos, t))
                .collect();
            set.at_most_one_pairwise(&boxes);

            if let Some(player) = self.player(pos, t) {
                for var in &boxes {
                    set.add_binary(player.negative(), var.negative());
                }
            }
        }
        set
    }

    /// The player either stays or steps onto a neighbouring floor cell
    pub fn movement_at(&self, t: usize) -> ClauseSet {
        let mut set = ClauseSet::new();
        for &pos in self.indexer.floor_cells() {
            let Some(here) = self.player(pos, t) else { continue };

            let mut lits = vec![here.negative()];
            lits.extend(self.player(pos, t + 1).map(Var::positive));
            lits.extend(
                Direction::ALL
                    .iter()
                    .filter_map(|&d| self.level.neighbor(pos, d))
                    .filter_map(|n| self.player(n, t + 1))
                    .map(Var::positive),
            );
            set.add_lits(lits);
        }
        set
    }

    /// Stepping into a box cell carries the box one cell further, and is
    /// forbidden when that cell is a wall
    pub fn push_at(&self, t: usize) -> ClauseSet {
        let mut set = ClauseSet::new();
        for &pos in self.indexer.floor_cells() {
            let Some(player) = self.player(pos, t) else { continue };

            for &d in &Direction::ALL {
                let Some(target) = self.level.neighbor(pos, d) else { continue };
                let Some(enters) = self.player(target, t + 1) else { continue };
                let beyond = self.level.neighbor(target, d);

                for b in 0..self.level.box_count() {
                    let Some(blocking) = self.boxed(b, target, t) else { continue };

                    let mut lits: Vec<Lit> = vec![player.negative(), blocking.negative(), enters.negative()];
                    if let Some(landing) = beyond.and_then(|q| self.boxed(b, q, t + 1)) {
                        lits.push(landing.positive());
                    }
                    set.add_lits(lits);
                }
            }
        }
        set
    }

    /// A box stays put unless the player stood next to it and then walked
    /// into its cell
    pub fn frame_at(&self, t: usize) -> ClauseSet {
        let mut set = ClauseSet::new();
        for b in 0..self.level.box_count() {
            for &cell in self.indexer.floor_cells() {
                let (Some(now), Some(next)) = (self.boxed(b, cell, t), self.boxed(b, cell, t + 1)) else {
                    continue;
                };

                let mut origin = vec![now.negative(), next.positive()];
                origin.extend(
                    Direction::ALL
                        .iter()
                        .filter_map(|&d| self.level.neighbor(cell, d))
                        .filter_map(|n| self.player(n, t))
                        .map(Var::positive),
                );
                set.add_lits(origin);

                let mut entry = vec![now.negative(), next.positive()];
                entry.extend(self.player(cell, t + 1).map(Var::positive));
                set.add_lits(entry);
            }
        }
        set
    }

    /// Every box rests on some goal at `T`
    pub fn goal(&self) -> ClauseSet {
        let horizon = self.horizon();
        let mut set = ClauseSet::new();
        for b in 0..self.level.box_count() {
            let on_goal: Vec<Var> = self
                .level
                .goals()
                .iter()
                .filter_map(|&goal| self.boxed(b, goal, horizon))
                .collect();
            set.at_least_one(&on_goal);
        }
        set
    }

    /// Rough size classification before encoding
    pub fn estimate_complexity(&self) -> ComplexityEstimate {
        let variables = self.indexer.variable_count();
        let complexity_level = if variables < 1_000 {
            ComplexityLevel::Low
        } else if variables < 10_000 {
            ComplexityLevel::Medium
        } else if variables < 100_000 {
            ComplexityLevel::High
        } else {
            ComplexityLevel::VeryHigh
        };

        ComplexityEstimate {
            complexity_level,
            estimated_variables: variables,
            floor_cells: self.indexer.floor_cells().len(),
            boxes: self.level.box_count(),
            time_steps: self.horizon() + 1,
        }
    }
}

/// Statistics about the SAT encoding
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub horizon: usize,
    pub rows: usize,
    pub cols: usize,
    pub floor_cells: usize,
    pub boxes: usize,
    pub total_variables: usize,
    pub total_clauses: usize,
    pub group_clauses: BTreeMap<ClauseGroup, usize>,
    pub at_most_one: AtMostOneEncoding,
    pub encode_time: Duration,
}

impl EncodingStatistics {
    pub fn clauses_in(&self, group: ClauseGroup) -> usize {
        self.group_clauses.get(&group).copied().unwrap_or(0)
    }
}

impl fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Level: {}x{} ({} floor cells, {} boxes)", self.rows, self.cols, self.floor_cells, self.boxes)?;
        writeln!(f, "  Horizon: {}", self.horizon)?;
        writeln!(f, "  At-most-one encoding: {:?}", self.at_most_one)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        for group in ClauseGroup::ALL {
            writeln!(f, "    {}: {}", group.name(), self.clauses_in(group))?;
        }
        writeln!(f, "  Encoding time: {:.2}ms", self.encode_time.as_secs_f64() * 1000.0)?;
        Ok(())
    }
}

/// Complexity estimate for the problem
#[derive(Debug, Clone)]
pub struct ComplexityEstimate {
    pub complexity_level: ComplexityLevel,
    pub estimated_variables: usize,
    pub floor_cells: usize,
    pub boxes: usize,
    pub time_steps: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplexityLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl fmt::Display for ComplexityEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Problem Complexity Estimate:")?;
        writeln!(f, "  Complexity level: {:?}", self.complexity_level)?;
        writeln!(f, "  Estimated variables: {}", self.estimated_variables)?;
        writeln!(f, "  Floor cells: {}", self.floor_cells)?;
        writeln!(f, "  Boxes: {}", self.boxes)?;
        writeln!(f, "  Time steps: {}", self.time_steps)?;

        let recommendation = match self.complexity_level {
            ComplexityLevel::Low => "Should solve quickly",
            ComplexityLevel::Medium => "May take some time to solve",
            ComplexityLevel::High => "Likely to be challenging, consider a smaller horizon",
            ComplexityLevel::VeryHigh => "Very challenging, try the sequential encoding or a smaller horizon",
        };
        writeln!(f, "  Recommendation: {}", recommendation)?;

        Ok(())
    }
}
