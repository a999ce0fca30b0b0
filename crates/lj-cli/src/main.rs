//! CLI frontend for the Lumberjack simulation.

mod autopilot;
mod commands;
mod logging;
mod scene;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lumberjack",
    about = "Lumberjack: chop trees, carry logs, sell timber",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo clearing with a scripted lumberjack
    Run {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "1800")]
        frames: u64,

        /// Frame duration in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// RNG seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print every simulation event
        #[arg(short, long)]
        events: bool,
    },

    /// Replay a recorded input script against the demo clearing
    Replay {
        /// Input script (JSON)
        script: PathBuf,

        /// RNG seed (overrides the config file)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print every simulation event
        #[arg(short, long)]
        events: bool,
    },

    /// Print the default configuration as JSON
    Config,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            frames,
            dt,
            seed,
            config,
            events,
        } => commands::run::run(frames, dt, seed, config.as_deref(), events),
        Commands::Replay {
            script,
            seed,
            config,
            events,
        } => commands::replay::run(&script, seed, config.as_deref(), events),
        Commands::Config => commands::config::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
