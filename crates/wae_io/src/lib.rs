//! Persistence and analysis of finished games.
//!
//! Provides the record store the host appends finished games to, the importer
//! for data files written by the legacy game server, and the statistics
//! built on stored records: logical-error-rate curves and highscores.

/// Parser for the legacy server's CSV data file.
///
/// Reads the comma-separated record file, including quoted list columns such
/// as `"[1, 0]"` and zone-less ISO timestamps, and converts each row into a
/// [`wae_common::record::GameRecord`]. Rows that cannot be parsed are skipped.
pub mod legacy;

/// Statistics over stored records.
///
/// Aggregates per-level successes into logical-error-rate curves grouped by
/// code distance or by player age, and extracts per-distance highscores.
pub mod stats;

/// Record stores.
///
/// Defines the [`store::RecordStore`] seam and its JSON-lines file and
/// in-memory implementations. Stores assign the identifier and timestamp of
/// every record they accept.
pub mod store;
