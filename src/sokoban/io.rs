//! File I/O for Sokoban levels

use super::Level;
use anyhow::{Context, Result};
use std::path::Path;

/// Load a level from a text file, one row per line
pub fn load_level_from_file<P: AsRef<Path>>(path: P) -> Result<Level> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read level file: {}", path.as_ref().display()))?;

    parse_level_from_string(&content)
        .with_context(|| format!("Failed to parse level from file: {}", path.as_ref().display()))
}

/// Parse a level from its text form.
///
/// Spaces are floor, even at the end of a row. Blank lines are ignored and a
/// line starting with `;` is a comment.
pub fn parse_level_from_string(content: &str) -> Result<Level> {
    let lines: Vec<&str> = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with(';'))
        .collect();

    Ok(Level::from_rows(&lines)?)
}

/// Save a level to a text file
pub fn save_level_to_file<P: AsRef<Path>>(level: &Level, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, level.to_string())
        .with_context(|| format!("Failed to write level to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Write a handful of small levels for trying the solver
pub fn create_example_levels<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // One push straight onto the goal
    let single_push = "#.#\n.P.\n#B#\n#G#\n";
    std::fs::write(dir.join("single_push.txt"), single_push)
        .context("Failed to write single_push.txt")?;

    // The player has to walk around the box before pushing
    let detour = "######\n#P...#\n#.B..#\n#..G.#\n######\n";
    std::fs::write(dir.join("detour.txt"), detour)
        .context("Failed to write detour.txt")?;

    // Two boxes, either may end on either goal
    let two_boxes = "#######\n#G.B.P#\n#.....#\n#G.B..#\n#######\n";
    std::fs::write(dir.join("two_boxes.txt"), two_boxes)
        .context("Failed to write two_boxes.txt")?;

    Ok(())
}
