//! SAT encoding, solving and decoding for Sokoban planning

pub mod constraints;
pub mod decoder;
pub mod encoder;
pub mod solver;
pub mod variables;

pub use constraints::{AtMostOneEncoding, Clause, ClauseSet};
pub use decoder::AssignmentDecoder;
pub use encoder::{
    ClauseGroup, ComplexityEstimate, ComplexityLevel, EncoderOptions, Encoding, EncodingStatistics,
    TransitionEncoder,
};
pub use solver::{solve_clauses, Model, SatSolver, SolveOutcome, SolverOptions};
pub use variables::{Entity, Lit, Proposition, Var, VariableIndexer, VariableStatistics};
