//! Host configuration resolved from the command line and environment.

use std::path::PathBuf;
use tracing::Level;
use wae_common::limits::{MAX_DISTANCE, MIN_DISTANCE};
use wae_io::store::JsonlStore;

pub struct HostConfig {
    pub data_dir: PathBuf,
}

impl HostConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn record_store(&self) -> JsonlStore {
        JsonlStore::in_dir(&self.data_dir)
    }
}

/// Max log level for a `-v` count.
pub fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Clap value parser for a playable code distance.
pub fn parse_distance(s: &str) -> Result<usize, String> {
    let d: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a distance"))?;
    if (MIN_DISTANCE..=MAX_DISTANCE).contains(&d) {
        Ok(d)
    } else {
        Err(format!(
            "distance must be between {MIN_DISTANCE} and {MAX_DISTANCE}"
        ))
    }
}
