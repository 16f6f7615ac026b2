//! Configuration settings for the Sokoban planner

use crate::sat::{AtMostOneEncoding, EncoderOptions, SolverOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Horizons beyond this overflow the variable id range on any useful level
pub const MAX_HORIZON: usize = 100_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub planning: PlanningConfig,
    pub encoding: EncodingConfig,
    pub solver: SolverConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Number of time steps `T`
    pub horizon: usize,
    /// Reject levels with more boxes than goals before encoding
    pub require_goal_cover: bool,
    /// Replay every decoded plan through the move rules
    pub verify_plans: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    pub at_most_one: AtMostOneEncoding,
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// 0 means no limit
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub level_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            planning: PlanningConfig {
                horizon: 10,
                require_goal_cover: true,
                verify_plans: true,
            },
            encoding: EncodingConfig {
                at_most_one: AtMostOneEncoding::Pairwise,
                parallel: false,
            },
            solver: SolverConfig { timeout_seconds: 300 },
            input: InputConfig {
                level_file: PathBuf::from("levels/single_push.txt"),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/plans"),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.planning.horizon > MAX_HORIZON {
            anyhow::bail!("Horizon {} exceeds the maximum of {}", self.planning.horizon, MAX_HORIZON);
        }

        if !self.input.level_file.exists() {
            anyhow::bail!("Level file does not exist: {}", self.input.level_file.display());
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(horizon) = cli_overrides.horizon {
            self.planning.horizon = horizon;
        }
        if let Some(encoding) = cli_overrides.at_most_one {
            self.encoding.at_most_one = encoding;
        }
        if let Some(timeout) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = timeout;
        }
        if let Some(ref level_file) = cli_overrides.level_file {
            self.input.level_file = level_file.clone();
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        if cli_overrides.parallel {
            self.encoding.parallel = true;
        }
        if cli_overrides.allow_uncovered_boxes {
            self.planning.require_goal_cover = false;
        }
    }

    pub fn encoder_options(&self) -> EncoderOptions {
        EncoderOptions {
            at_most_one: self.encoding.at_most_one,
            parallel: self.encoding.parallel,
        }
    }

    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            timeout: (self.solver.timeout_seconds > 0).then(|| Duration::from_secs(self.solver.timeout_seconds)),
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub horizon: Option<usize>,
    pub at_most_one: Option<AtMostOneEncoding>,
    pub timeout_seconds: Option<u64>,
    pub level_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub parallel: bool,
    pub allow_uncovered_boxes: bool,
}
