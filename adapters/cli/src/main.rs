#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for generating Path Defence boards and running
//! headless wave simulations.

mod map_view;
mod simulate;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use path_defence_world::{GameConfig, Session};
use rand::{distributions::Alphanumeric, Rng};
use tracing::info;
use tracing_subscriber::EnvFilter;

const RANDOM_SEED_LENGTH: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "path-defence")]
#[command(about = "Seeded tower-defence board generator and wave simulator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board generated for a seed
    Generate {
        /// Board seed; a random one is drawn when omitted
        #[arg(long)]
        seed: Option<String>,

        /// TOML game configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run waves headless with no defences and report the outcome
    Simulate {
        /// Board seed; a random one is drawn when omitted
        #[arg(long)]
        seed: Option<String>,

        /// TOML game configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of waves to run
        #[arg(long, default_value = "5")]
        waves: usize,

        /// Fixed simulation step in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: u64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Args::parse().command {
        Command::Generate { seed, config } => {
            let config = load_config(config.as_ref())?;
            let session = Session::new(seed.unwrap_or_else(random_seed), &config);
            print!("{}", map_view::describe(session.seed(), session.grid()));
        }
        Command::Simulate {
            seed,
            config,
            waves,
            frame_ms,
        } => {
            ensure!(frame_ms > 0, "--frame-ms must be positive");
            let config = load_config(config.as_ref())?;
            let mut session = Session::new(seed.unwrap_or_else(random_seed), &config);
            info!(seed = session.seed(), waves, frame_ms, "simulating");
            let reports = simulate::run(&mut session, waves, Duration::from_millis(frame_ms));
            for report in &reports {
                println!("{report}");
            }
            println!(
                "seed {}: {} wave(s), {} lives, {} gold{}",
                session.seed(),
                reports.len(),
                session.lives(),
                session.gold(),
                if session.is_defeated() { ", defeated" } else { "" }
            );
        }
    }
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SEED_LENGTH)
        .map(char::from)
        .collect()
}
