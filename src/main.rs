//! Moroxel CLI - run, replay and watch the bundled cartridge.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

/// Moroxel - a deterministic 128x128 fantasy console
#[derive(Parser, Debug)]
#[command(name = "moroxel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter, e.g. `info` or `moroxel=debug` (overridden by `RUST_LOG`)
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the tag cartridge headless
    Run {
        /// Number of frames to produce
        #[arg(short = 'n', long, default_value = "600")]
        frames: u64,

        /// Agent-bound slots, comma separated (e.g. `1,2`); no value for none
        #[arg(short, long, value_delimiter = ',', num_args = 0.., default_value = "2")]
        agents: Vec<u8>,

        /// Draw sprites and text at frame end instead of immediately
        #[arg(long)]
        engine: bool,

        /// Output format: text, json, or ascii
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save recording to file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Re-run a recording and verify its final frame
    Replay {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: text, json, or ascii
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Play in the terminal: arrow keys drive P1, P2 is an agent
    Watch {
        /// Frames per second
        #[arg(long, default_value = "30")]
        fps: u32,

        /// Bind P2 to the runner agent (otherwise P2 idles)
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        agent: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Commands::Run {
            frames,
            agents,
            engine,
            format,
            save,
        } => cli::run::execute(frames, &agents, engine, format, save.as_deref()),

        Commands::Replay { recording, format } => cli::replay::execute(&recording, format),

        Commands::Watch { fps, agent } => cli::watch::execute(fps, agent),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
