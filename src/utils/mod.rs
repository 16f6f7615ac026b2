//! Output helpers shared by the command-line tool

pub mod display;

pub use display::{Color, ColorOutput, PlanFormatter};
