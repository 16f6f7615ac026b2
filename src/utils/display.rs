//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::planning::{Plan, PlanOutcome};
use crate::sokoban::{Level, Position, State};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Format plans for display
pub struct PlanFormatter;

impl PlanFormatter {
    /// Render `level` with the entities placed as in `state`
    pub fn format_state(level: &Level, state: &State) -> String {
        let mut output = String::new();
        for row in 0..level.rows {
            for col in 0..level.cols {
                let pos = Position::new(row, col);
                let has_box = state.boxes.contains(&pos);
                let symbol = match (level.is_wall(pos), has_box, state.player == pos, level.is_goal(pos)) {
                    (true, ..) => '#',
                    (_, true, _, true) => 'X',
                    (_, true, _, false) => 'B',
                    (_, _, true, true) => 'Y',
                    (_, _, true, false) => 'P',
                    (_, _, _, true) => 'G',
                    _ => '.',
                };
                output.push(symbol);
            }
            output.push('\n');
        }
        output
    }

    /// Format a plan for console output
    pub fn format_plan(level: &Level, plan: &Plan, show_states: bool) -> String {
        let mut output = String::new();

        output.push_str("=== Plan ===\n");
        output.push_str(&format!("Moves: {}\n", plan));
        output.push_str(&format!("Length: {} ({} pushes)\n", plan.len(), plan.push_count()));
        output.push_str(&format!("Horizon: {} ({} waits)\n", plan.horizon, plan.trajectory.wait_steps()));
        output.push_str(&format!("Solve Time: {:.3}s\n", plan.solve_time.as_secs_f64()));
        output.push('\n');

        if show_states {
            for (t, state) in plan.trajectory.states.iter().enumerate() {
                output.push_str(&format!("t = {}:\n", t));
                output.push_str(&Self::format_state(level, state));
                output.push('\n');
            }
        } else if let Some(last) = plan.trajectory.states.last() {
            output.push_str("Final State:\n");
            output.push_str(&Self::format_state(level, last));
        }

        output
    }

    /// Format any outcome, including the no-plan answer
    pub fn format_outcome(level: &Level, outcome: &PlanOutcome, show_states: bool) -> String {
        match outcome {
            PlanOutcome::Plan(plan) => Self::format_plan(level, plan, show_states),
            PlanOutcome::NoPlan { horizon } => format!("No plan exists within {} steps\n", horizon),
        }
    }

    /// Save an outcome to `output_dir` and return the written path
    pub fn save_outcome<P: AsRef<Path>>(
        level: &Level,
        outcome: &PlanOutcome,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<PathBuf> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let (path, content) = match format {
            OutputFormat::Text => (output_dir.join("plan.txt"), Self::format_outcome(level, outcome, true)),
            OutputFormat::Json => (
                output_dir.join("plan.json"),
                serde_json::to_string_pretty(outcome).context("Failed to serialize plan")?,
            ),
        };

        std::fs::write(&path, content).with_context(|| format!("Failed to write plan: {}", path.display()))?;
        Ok(path)
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::Trajectory;
    use crate::sokoban::{Direction, SokobanRules};
    use tempfile::TempDir;

    fn level() -> Level {
        Level::from_rows(&["#.#", ".P.", "#B#", "#G#"]).unwrap()
    }

    #[test]
    fn test_state_rendering() {
        let level = level();
        let initial = SokobanRules::initial_state(&level);
        assert_eq!(PlanFormatter::format_state(&level, &initial), "#.#\n.P.\n#B#\n#G#\n");

        let pushed = SokobanRules::apply(&level, &initial, Direction::Down).unwrap().state;
        assert_eq!(PlanFormatter::format_state(&level, &pushed), "#.#\n...\n#P#\n#X#\n");
    }

    #[test]
    fn test_save_outcome() {
        let level = level();
        let initial = SokobanRules::initial_state(&level);
        let pushed = SokobanRules::apply(&level, &initial, Direction::Down).unwrap().state;
        let plan = Plan::new(vec![Direction::Down], Trajectory { states: vec![initial, pushed] });
        let outcome = PlanOutcome::Plan(plan);

        let temp_dir = TempDir::new().unwrap();
        let text = PlanFormatter::save_outcome(&level, &outcome, temp_dir.path(), OutputFormat::Text).unwrap();
        assert!(std::fs::read_to_string(text).unwrap().contains("Moves: D"));

        let json = PlanFormatter::save_outcome(&level, &outcome, temp_dir.path(), OutputFormat::Json).unwrap();
        let content = std::fs::read_to_string(json).unwrap();
        assert!(content.contains("\"outcome\": \"plan\""));
    }

    #[test]
    fn test_no_plan_formatting() {
        let text = PlanFormatter::format_outcome(&level(), &PlanOutcome::NoPlan { horizon: 4 }, false);
        assert_eq!(text, "No plan exists within 4 steps\n");
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        // Should either be colored or plain text
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
