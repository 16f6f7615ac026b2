//! Configuration management for the Sokoban planner

pub mod settings;

pub use settings::{
    CliOverrides, EncodingConfig, InputConfig, OutputConfig, OutputFormat, PlanningConfig, Settings,
    SolverConfig, MAX_HORIZON,
};
