//! Main CLI application for the Sokoban and Sudoku SAT solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sokosat::{
    config::{CliOverrides, OutputFormat, Settings},
    planning::{PlanOutcome, SokobanProblem},
    sat::{AtMostOneEncoding, SolverOptions},
    sokoban::create_example_levels,
    sudoku::{self, SudokuBoard, SudokuOutcome},
    utils::{ColorOutput, PlanFormatter},
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "sokosat")]
#[command(about = "Sokoban and Sudoku SAT Solver")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    Pairwise,
    Sequential,
}

impl From<EncodingArg> for AtMostOneEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Pairwise => AtMostOneEncoding::Pairwise,
            EncodingArg::Sequential => AtMostOneEncoding::Sequential,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search for a Sokoban plan within a fixed horizon
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Level file (overrides config)
        #[arg(short, long)]
        level: Option<PathBuf>,

        /// Number of time steps (overrides config)
        #[arg(short = 't', long)]
        horizon: Option<usize>,

        /// At-most-one encoding (overrides config)
        #[arg(short, long, value_enum)]
        encoding: Option<EncodingArg>,

        /// Solver timeout in seconds, 0 for none (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Generate clauses on all cores
        #[arg(long)]
        parallel: bool,

        /// Encode levels with more boxes than goals instead of rejecting them
        #[arg(long)]
        allow_uncovered_boxes: bool,

        /// Print the level at every time step
        #[arg(long)]
        show_states: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Complete a Sudoku board
    Sudoku {
        /// Board file: nine rows of digits, '.' or '0' for blanks
        #[arg(short, long)]
        board: PathBuf,

        /// Solver timeout in seconds, 0 for none
        #[arg(long, default_value_t = 0)]
        timeout: u64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report encoding size for a level without solving it
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Level file
        #[arg(short, long)]
        level: PathBuf,

        /// Number of time steps (overrides config)
        #[arg(short = 't', long)]
        horizon: Option<usize>,

        /// Write the CNF in DIMACS format to this file
        #[arg(long)]
        dimacs: Option<PathBuf>,
    },

    /// Create example configuration and level files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            level,
            horizon,
            encoding,
            timeout,
            output,
            format,
            parallel,
            allow_uncovered_boxes,
            show_states,
            verbose,
        } => {
            let overrides = CliOverrides {
                horizon,
                at_most_one: encoding.map(Into::into),
                timeout_seconds: timeout,
                level_file: level,
                output_dir: output,
                format: format.map(Into::into),
                parallel,
                allow_uncovered_boxes,
            };
            solve_command(config, overrides, show_states, verbose)
        }
        Commands::Sudoku { board, timeout, json } => sudoku_command(board, timeout, json),
        Commands::Analyze {
            config,
            level,
            horizon,
            dimacs,
        } => analyze_command(config, level, horizon, dimacs),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path).with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!("Config file {} not found, using defaults", config_path.display()))
        );
        Ok(Settings::default())
    }
}

fn solve_command(config_path: PathBuf, overrides: CliOverrides, show_states: bool, verbose: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Starting Sokoban SAT planner"));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&overrides);

    if verbose {
        println!("Configuration:");
        println!("  Horizon: {}", settings.planning.horizon);
        println!("  At-most-one encoding: {:?}", settings.encoding.at_most_one);
        println!("  Level file: {}", settings.input.level_file.display());
        println!("  Output dir: {}", settings.output.output_directory.display());
        println!();
    }

    settings.validate().context("Configuration validation failed")?;

    let start_time = Instant::now();
    let problem = SokobanProblem::from_settings(settings.clone()).context("Failed to create Sokoban problem")?;

    if verbose {
        println!("{}", problem.level());
        println!("{}", problem.estimate_complexity());
    }

    println!("{}", ColorOutput::info("Generating SAT constraints and solving..."));
    let outcome = problem.solve().context("Failed to solve Sokoban problem")?;
    let total_time = start_time.elapsed();

    match &outcome {
        PlanOutcome::Plan(plan) => {
            println!(
                "{}",
                ColorOutput::success(&format!("Found a plan of {} moves in {:.3}s", plan.len(), total_time.as_secs_f64()))
            );
            println!("\n{}", PlanFormatter::format_plan(problem.level(), plan, show_states));
        }
        PlanOutcome::NoPlan { horizon } => {
            println!(
                "{}",
                ColorOutput::warning(&format!("No plan exists within {} steps; try a larger horizon", horizon))
            );
        }
    }

    let path = PlanFormatter::save_outcome(
        problem.level(),
        &outcome,
        &settings.output.output_directory,
        settings.output.format,
    )
    .context("Failed to save plan")?;
    println!("{}", ColorOutput::success(&format!("Result saved to {}", path.display())));

    if verbose {
        println!("\n{}", problem.statistics());
    }

    Ok(())
}

fn sudoku_command(board_path: PathBuf, timeout: u64, json: bool) -> Result<()> {
    let clues = SudokuBoard::load(&board_path)?;
    let options = SolverOptions {
        timeout: (timeout > 0).then(|| Duration::from_secs(timeout)),
    };

    let outcome = sudoku::solve_board(&clues, &options).context("Failed to solve sudoku")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        SudokuOutcome::Solved(board) => {
            println!("{}", ColorOutput::success("Solved"));
            println!("{}", board);
        }
        SudokuOutcome::NoSolution => {
            println!("{}", ColorOutput::error("The clues admit no solution"));
        }
    }

    Ok(())
}

fn analyze_command(
    config_path: PathBuf,
    level_path: PathBuf,
    horizon: Option<usize>,
    dimacs: Option<PathBuf>,
) -> Result<()> {
    println!("{}", ColorOutput::info("Analyzing level..."));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&CliOverrides {
        horizon,
        level_file: Some(level_path),
        ..CliOverrides::default()
    });

    let problem = SokobanProblem::from_settings(settings).context("Failed to create problem for analysis")?;
    let level = problem.level();

    println!("Level ({}x{}):", level.rows, level.cols);
    println!("{}", level);
    println!("Level Statistics:");
    println!("  Floor cells: {}", level.floor_count());
    println!("  Boxes: {}", level.box_count());
    println!("  Goals: {}", level.goals().len());

    println!("\n{}", problem.estimate_complexity());
    println!("{}", problem.statistics());

    if let Some(path) = dimacs {
        let file = std::fs::File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        problem
            .write_dimacs(&mut writer)
            .with_context(|| format!("Failed to write DIMACS to {}", path.display()))?;
        println!("{}", ColorOutput::success(&format!("CNF written to {}", path.display())));
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let level_dir = directory.join("levels");
    let output_dir = directory.join("output/plans");

    for dir in [&config_dir, &level_dir, &output_dir] {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        let default_settings = Settings::default();
        default_settings
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_levels(&level_dir).context("Failed to create example levels")?;
    println!("Created example levels in: {}", level_dir.display());

    let variants_dir = config_dir.join("variants");
    std::fs::create_dir_all(&variants_dir)?;

    let mut quick = Settings::default();
    quick.planning.horizon = 2;
    quick.input.level_file = PathBuf::from("levels/single_push.txt");
    quick.to_file(&variants_dir.join("quick.yaml"))?;

    let mut larger = Settings::default();
    larger.planning.horizon = 20;
    larger.encoding.at_most_one = AtMostOneEncoding::Sequential;
    larger.encoding.parallel = true;
    larger.input.level_file = PathBuf::from("levels/two_boxes.txt");
    larger.to_file(&variants_dir.join("two_boxes.yaml"))?;

    println!("Created configuration variants in: {}", variants_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your levels to {}", level_dir.display());
    println!("3. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}
