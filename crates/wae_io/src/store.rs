//! Record stores for finished games.
//!
//! The file store keeps one JSON object per line and only ever appends, so a
//! crash mid-write can at worst leave a truncated last line, which `load_all`
//! reports with its line number.

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;
use wae_common::record::{GameRecord, GameSubmission};

/// Name of the record file inside the data directory.
pub const RECORD_FILE: &str = "data.jsonl";

/// Storage for finished games.
pub trait RecordStore {
    /// Stores a submission, assigning its identifier and timestamp.
    fn append(&mut self, submission: GameSubmission) -> Result<GameRecord>;

    /// Stores an already identified record as is.
    fn append_record(&mut self, record: GameRecord) -> Result<()>;

    /// Every stored record, in insertion order.
    fn load_all(&self) -> Result<Vec<GameRecord>>;
}

/// Eight hex characters, the identifier format of the legacy data file.
pub fn short_uid() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn identify(submission: GameSubmission) -> GameRecord {
    GameRecord::from_submission(short_uid(), Utc::now(), submission)
}

/// Append-only JSON-lines file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `RECORD_FILE` inside `data_dir`.
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(RECORD_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, record: &GameRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

impl RecordStore for JsonlStore {
    fn append(&mut self, submission: GameSubmission) -> Result<GameRecord> {
        let record = identify(submission);
        self.write_line(&record)?;
        info!(
            uid = %record.uid,
            grid_size = record.grid_size,
            level_reached = record.level_reached,
            path = %self.path.display(),
            "stored game record"
        );
        Ok(record)
    }

    fn append_record(&mut self, record: GameRecord) -> Result<()> {
        self.write_line(&record)
    }

    /// A missing file reads as an empty store.
    fn load_all(&self) -> Result<Vec<GameRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open {}", self.path.display()));
            }
        };

        let mut records = Vec::new();
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).with_context(|| {
                format!("Malformed record on line {} of {}", line_no + 1, self.path.display())
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

/// Store kept in memory, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<GameRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn append(&mut self, submission: GameSubmission) -> Result<GameRecord> {
        let record = identify(submission);
        self.records.push(record.clone());
        Ok(record)
    }

    fn append_record(&mut self, record: GameRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<GameRecord>> {
        Ok(self.records.clone())
    }
}
