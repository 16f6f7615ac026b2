//! Sokoban planning problems, plans and plan validation

pub mod problem;
pub mod solution;
pub mod validator;

pub use problem::SokobanProblem;
pub use solution::{Plan, PlanOutcome, PlanSummary, Trajectory};
pub use validator::{PlanValidator, ValidationDetails, ValidationResult};
