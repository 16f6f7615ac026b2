//! SAT solver integration using CaDiCaL

use super::constraints::{Clause, ClauseSet};
use super::variables::Var;
use crate::error::SolverError;
use cadical::{Solver, Timeout};
use log::debug;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// A satisfying assignment, stored as the set of true variables.
/// Every variable not in the set is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    true_vars: HashSet<Var>,
}

impl Model {
    pub fn value(&self, var: Var) -> bool {
        self.true_vars.contains(&var)
    }

    pub fn true_count(&self) -> usize {
        self.true_vars.len()
    }

    /// Whether every clause of `clauses` holds under this model
    pub fn satisfies(&self, clauses: &ClauseSet) -> bool {
        clauses.clauses().iter().all(|c| c.is_satisfied_by(|v| self.value(v)))
    }
}

impl FromIterator<Var> for Model {
    fn from_iter<I: IntoIterator<Item = Var>>(iter: I) -> Self {
        Self {
            true_vars: iter.into_iter().collect(),
        }
    }
}

/// Answer of the SAT engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable(Model),
    Unsatisfiable,
}

impl SolveOutcome {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveOutcome::Satisfiable(_))
    }
}

/// Configuration options for the SAT solver
#[derive(Debug, Clone, Default)]
pub struct SolverOptions {
    /// Wall-clock budget for a single `solve` call
    pub timeout: Option<Duration>,
}

/// SAT solver wrapper for CaDiCaL
pub struct SatSolver {
    solver: Solver,
    variable_count: usize,
    clause_count: usize,
    has_empty_clause: bool,
    timeout: Option<Duration>,
    last_solve_time: Duration,
}

impl SatSolver {
    /// Create a new SAT solver instance
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            variable_count: 0,
            clause_count: 0,
            has_empty_clause: false,
            timeout: None,
            last_solve_time: Duration::ZERO,
        }
    }

    /// Create a solver and apply `options`
    pub fn with_options(options: &SolverOptions) -> Self {
        let mut solver = Self::new();
        solver.configure(options);
        solver
    }

    /// Set solver configuration options
    pub fn configure(&mut self, options: &SolverOptions) {
        self.timeout = options.timeout;
    }

    /// Declare that ids up to `count` belong to the formula, even if some
    /// never appear in a clause
    pub fn declare_variables(&mut self, count: usize) {
        self.variable_count = self.variable_count.max(count);
    }

    /// Add clauses to the solver
    pub fn add_clauses(&mut self, clauses: &ClauseSet) {
        self.declare_variables(clauses.max_var());
        for clause in clauses.clauses() {
            self.add_clause(clause);
        }
    }

    /// Add a single clause to the solver.
    ///
    /// An empty clause makes the formula unsatisfiable; it is remembered here
    /// instead of being handed to the backend.
    pub fn add_clause(&mut self, clause: &Clause) {
        self.clause_count += 1;

        if clause.is_empty() {
            self.has_empty_clause = true;
            return;
        }

        for literal in &clause.literals {
            self.variable_count = self.variable_count.max(literal.var().id() as usize);
        }
        self.solver.add_clause(clause.literals.iter().map(|lit| lit.to_dimacs()));
    }

    /// Run the backend once over everything added so far
    pub fn solve(&mut self) -> Result<SolveOutcome, SolverError> {
        if self.has_empty_clause {
            debug!("formula contains the empty clause, skipping backend");
            self.last_solve_time = Duration::ZERO;
            return Ok(SolveOutcome::Unsatisfiable);
        }

        if let Some(timeout) = self.timeout {
            self.solver.set_callbacks(Some(Timeout::new(timeout.as_secs_f32())));
        }

        let start_time = Instant::now();
        let result = self.solver.solve();
        self.last_solve_time = start_time.elapsed();

        debug!(
            "backend answered {:?} for {} variables / {} clauses in {:.3}s",
            result,
            self.variable_count,
            self.clause_count,
            self.last_solve_time.as_secs_f64()
        );

        match result {
            Some(true) => Ok(SolveOutcome::Satisfiable(self.extract_model())),
            Some(false) => Ok(SolveOutcome::Unsatisfiable),
            None => match self.timeout {
                Some(timeout) => Err(SolverError::Timeout(timeout)),
                None => Err(SolverError::Interrupted),
            },
        }
    }

    /// Extract the true variables from the solver
    fn extract_model(&self) -> Model {
        (1..=self.variable_count as i32)
            .filter(|&id| self.solver.value(id) == Some(true))
            .filter_map(Var::from_dimacs)
            .collect()
    }

    /// Get the number of variables
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Get the number of clauses
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Wall-clock time of the most recent `solve` call
    pub fn last_solve_time(&self) -> Duration {
        self.last_solve_time
    }
}

impl Default for SatSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot form of the solver contract: all clauses at once, one answer
pub fn solve_clauses(
    clauses: &ClauseSet,
    variable_count: usize,
    options: &SolverOptions,
) -> Result<SolveOutcome, SolverError> {
    let mut solver = SatSolver::with_options(options);
    solver.declare_variables(variable_count);
    solver.add_clauses(clauses);
    solver.solve()
}
