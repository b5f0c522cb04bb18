//! PalmCursor CLI — Offline tools for the gesture pipeline.
//!
//! Usage:
//!   palmcursor replay <FRAMES>     Run a frame stream through the pipeline
//!   palmcursor synth <SCENARIO>    Write a canned frame stream
//!   palmcursor config              Print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use palmcursor_gesture_core::Scenario;

mod commands;

#[derive(Parser)]
#[command(
    name = "palmcursor",
    about = "Turn hand-tracking frames into pointer actions",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a frame JSONL file through the pipeline and write pointer actions
    Replay {
        /// Frame stream (JSONL, optional `# {header}` first line)
        frames: PathBuf,

        /// Pipeline configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file for the action stream (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the smoother: one_euro|double_exponential|spring|passthrough
        #[arg(long)]
        smoother: Option<String>,

        /// Succeed even if some frames were rejected
        #[arg(long)]
        skip_rejected: bool,
    },

    /// Write a canned scenario as a frame JSONL file
    Synth {
        /// Scenario to generate
        #[arg(value_enum)]
        scenario: ScenarioArg,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame interval in milliseconds
        #[arg(long, default_value = "33")]
        interval_ms: u64,
    },

    /// Print the effective pipeline configuration after validating it
    Config {
        /// Pipeline configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the effective configuration to this file
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ScenarioArg {
    Click,
    Drag,
    Jitter,
    SpuriousTouch,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Click => Scenario::Click,
            ScenarioArg::Drag => Scenario::Drag,
            ScenarioArg::Jitter => Scenario::Jitter,
            ScenarioArg::SpuriousTouch => Scenario::SpuriousTouch,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    palmcursor_common::logging::init_logging(&palmcursor_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: cli.log_json,
    });

    match cli.command {
        Commands::Replay {
            frames,
            config,
            output,
            smoother,
            skip_rejected,
        } => commands::replay::run(frames, config, output, smoother, skip_rejected),
        Commands::Synth {
            scenario,
            output,
            interval_ms,
        } => commands::synth::run(scenario.into(), output, interval_ms),
        Commands::Config { config, write } => commands::config::run(config, write),
    }
}
