//! Logical-error-rate curves and highscores.
//!
//! Level `i + 1` of a distance-`d` game injects errors with probability
//! `(i + 1) / n`, `n` being the number of data qubits. A curve pairs these
//! physical rates with the fraction of rounds that were not won, over the
//! first `n / 2` levels. Every level below `level_reached` counts as fully
//! played, so a level abandoned through a logical error still contributes
//! its unplayed rounds as failures.

use serde::Serialize;
use std::collections::BTreeMap;
use wae_common::limits::{MAX_DISTANCE, MIN_DISTANCE, num_data_qubits};
use wae_common::record::GameRecord;

/// Age buckets used by [`statistics_by_age`], inclusive on both ends.
pub const AGE_BUCKETS: [(u32, u32); 6] = [(0, 7), (8, 15), (16, 25), (26, 35), (36, 45), (46, 99)];

/// Label of the bucket holding records without an age.
pub const UNKNOWN_AGE: &str = "unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ErrorRateCurve {
    pub physical_error_rates: Vec<f64>,
    pub logical_error_rates: Vec<f64>,
}

impl ErrorRateCurve {
    /// Aggregates `records` over the x-axis of an `n`-qubit patch.
    pub fn aggregate<'a>(records: impl IntoIterator<Item = &'a GameRecord>, n: usize) -> Self {
        let max_idx = n / 2;
        let mut successes = vec![0u64; max_idx];
        let mut totals = vec![0u64; max_idx];

        for record in records {
            let levels = record.successful_rounds_per_level.len().min(max_idx);
            for (i, &won) in record.successful_rounds_per_level[..levels].iter().enumerate() {
                successes[i] += u64::from(won);
                if i < record.level_reached as usize {
                    totals[i] += u64::from(record.rounds_per_level);
                }
            }
        }

        Self {
            physical_error_rates: (1..=max_idx).map(|i| i as f64 / n as f64).collect(),
            logical_error_rates: successes
                .iter()
                .zip(&totals)
                .map(|(&won, &total)| {
                    if total == 0 {
                        1.0
                    } else {
                        1.0 - won as f64 / total as f64
                    }
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.physical_error_rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.physical_error_rates.is_empty()
    }
}

/// Curve of one age bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeGroupCurve {
    pub label: String,
    #[serde(flatten)]
    pub curve: ErrorRateCurve,
}

/// Best game per distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highscore {
    pub level: u32,
    pub name: String,
}

/// Records of a distance the game can be played at. Others are ignored by
/// every statistic.
fn playable(records: &[GameRecord]) -> impl Iterator<Item = &GameRecord> {
    records
        .iter()
        .filter(|r| (MIN_DISTANCE..=MAX_DISTANCE).contains(&r.grid_size))
}

fn age_within(age: Option<u32>, min: Option<u32>, max: Option<u32>) -> bool {
    match age {
        Some(age) => min.is_none_or(|min| age >= min) && max.is_none_or(|max| age <= max),
        None => min.is_none() && max.is_none(),
    }
}

/// One curve per distance, ascending.
///
/// With an age bound, records without an age are left out.
pub fn statistics_by_distance(
    records: &[GameRecord],
    age_min: Option<u32>,
    age_max: Option<u32>,
) -> BTreeMap<usize, ErrorRateCurve> {
    let mut groups: BTreeMap<usize, Vec<&GameRecord>> = BTreeMap::new();
    for record in playable(records).filter(|r| age_within(r.age, age_min, age_max)) {
        groups.entry(record.grid_size).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(d, group)| (d, ErrorRateCurve::aggregate(group, num_data_qubits(d))))
        .collect()
}

/// One curve per age bucket that holds records, in bucket order, followed by
/// the unknown-age bucket.
///
/// A bucket can mix distances; its x-axis is that of the smallest distance
/// present, so longer success lists are cut to the shared support.
pub fn statistics_by_age(records: &[GameRecord]) -> Vec<AgeGroupCurve> {
    let buckets = AGE_BUCKETS
        .iter()
        .map(|&(min, max)| {
            let group: Vec<_> = playable(records)
                .filter(|r| r.age.is_some_and(|age| (min..=max).contains(&age)))
                .collect();
            (format!("{min}-{max}"), group)
        })
        .chain(std::iter::once((
            UNKNOWN_AGE.to_string(),
            playable(records).filter(|r| r.age.is_none()).collect(),
        )));

    buckets
        .filter_map(|(label, group)| {
            let n = group.iter().map(|r| num_data_qubits(r.grid_size)).min()?;
            Some(AgeGroupCurve {
                label,
                curve: ErrorRateCurve::aggregate(group, n),
            })
        })
        .collect()
}

/// Highest level reached per distance, with the player who reached it.
///
/// The earliest record wins a tie.
pub fn highscores(records: &[GameRecord]) -> BTreeMap<usize, Highscore> {
    let mut best: BTreeMap<usize, Highscore> = BTreeMap::new();
    for record in playable(records) {
        let better = best
            .get(&record.grid_size)
            .is_none_or(|current| record.level_reached > current.level);
        if better {
            best.insert(
                record.grid_size,
                Highscore {
                    level: record.level_reached,
                    name: record.name.clone(),
                },
            );
        }
    }
    best
}
