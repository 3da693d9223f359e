mod bench;
mod config;
mod import;
mod play;
mod render;
mod report;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use wae_common::limits::{DEFAULT_DISTANCE, DEFAULT_ROUNDS_PER_LEVEL};
use wae_core::{GameSession, PatchCache};
use wae_core::progress::GameProgress;
use wae_io::stats;
use wae_io::store::RecordStore;

use crate::config::{HostConfig, parse_distance};

#[derive(Parser)]
#[command(name = "whack-an-error")]
#[command(about = "Find and correct bit-flip errors on a surface-code patch")]
struct Cli {
    /// Directory holding the record file
    #[arg(long, global = true, env = "DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game in the terminal
    Play {
        #[arg(short, long, default_value_t = DEFAULT_DISTANCE, value_parser = parse_distance)]
        distance: usize,
        #[arg(long, default_value_t = DEFAULT_ROUNDS_PER_LEVEL)]
        rounds_per_level: u32,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
        /// Do not store the finished game
        #[arg(long)]
        no_save: bool,
        /// Play free rounds with this many expected errors, without levels
        #[arg(long, value_name = "ERRORS")]
        playground: Option<usize>,
    },
    /// Logical error rates from stored games
    Stats {
        /// Group by player age instead of distance
        #[arg(long)]
        by_age: bool,
        #[arg(long)]
        age_min: Option<u32>,
        #[arg(long)]
        age_max: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Best level reached per distance
    Highscores {
        #[arg(long)]
        json: bool,
    },
    /// Append the records of a legacy data.csv to the record file
    Import { csv: PathBuf },
    /// Monte-Carlo throughput of the round engine
    Bench {
        #[arg(short, long, default_value_t = DEFAULT_DISTANCE, value_parser = parse_distance)]
        distance: usize,
        #[arg(short, long, default_value_t = 0.05)]
        p: f64,
        #[arg(short, long, default_value_t = 100_000)]
        shots: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(config::log_level(cli.verbose))
        .with_writer(io::stderr)
        .init();

    let config = HostConfig::new(cli.data_dir);
    info!(data_dir = %config.data_dir.display(), "starting");

    match cli.command {
        Commands::Play {
            distance,
            rounds_per_level,
            name,
            age,
            seed,
            no_save,
            playground,
        } => {
            let session = GameSession::new(PatchCache::global(), distance, seed)?;
            let mut input = io::stdin().lock();
            let mut out = io::stdout().lock();

            if let Some(num_errors) = playground {
                play::run_playground(&session, num_errors, &mut input, &mut out)?;
                return Ok(());
            }

            let mut progress = GameProgress::with_rounds_per_level(distance, rounds_per_level);
            let finished = play::run_game(&session, &mut progress, &mut input, &mut out)?;
            if finished && !no_save {
                let record = config
                    .record_store()
                    .append(progress.submission(name, age))?;
                writeln!(out, "Saved game {}.", record.uid)?;
            }
        }
        Commands::Stats {
            by_age,
            age_min,
            age_max,
            json,
        } => {
            let records = config.record_store().load_all()?;
            let mut out = io::stdout().lock();
            if by_age {
                let groups = stats::statistics_by_age(&records);
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&groups)?)?;
                } else {
                    report::write_age_groups(&mut out, &groups)?;
                }
            } else {
                let curves = stats::statistics_by_distance(&records, age_min, age_max);
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&curves)?)?;
                } else {
                    report::write_distances(&mut out, &curves)?;
                }
            }
        }
        Commands::Highscores { json } => {
            let scores = stats::highscores(&config.record_store().load_all()?);
            let mut out = io::stdout().lock();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&scores)?)?;
            } else {
                report::write_highscores(&mut out, &scores)?;
            }
        }
        Commands::Import { csv } => {
            let mut store = config.record_store();
            let summary = import::import_legacy(&mut store, &csv)?;
            println!(
                "Imported {} records into {} ({} already present, {} unreadable).",
                summary.imported,
                store.path().display(),
                summary.duplicates,
                summary.skipped
            );
        }
        Commands::Bench {
            distance,
            p,
            shots,
            seed,
        } => {
            let report = bench::run_bench(distance, p, shots, seed)?;
            report.print_report();
        }
    }
    Ok(())
}
