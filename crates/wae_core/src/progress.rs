//! Level and round progression of a game.
//!
//! A game at distance `d` has one level per data qubit. Level `L` injects `L`
//! errors on average and consists of a fixed number of rounds. A round that
//! starts without any error is skipped without counting, a cleared round
//! without logical error counts as a success, and the first logical error
//! ends the game. Finishing the last round of the last level also ends it.

use wae_common::limits::{DEFAULT_ROUNDS_PER_LEVEL, num_data_qubits};
use wae_common::record::GameSubmission;

/// How a round ended, as seen by the progression rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// No error was sampled; the round is replayed at the next slot without counting.
    Trivial,

    /// The syndrome was cleared without a logical error.
    Success,

    /// The syndrome was cleared but the residual error flipped the logical operator.
    LogicalError,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOver {
    LogicalError,
    AllLevelsComplete,
}

/// What the host should do after a round was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Play the next round of the same level.
    NextRound { level: u32, round: u32 },

    /// The level was completed; the next round opens `next`.
    LevelComplete { completed: u32, next: u32 },

    /// The game is over.
    Finished(GameOver),
}

/// Progress of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameProgress {
    distance: usize,
    level: u32,
    round: u32,
    max_level: u32,
    rounds_per_level: u32,
    successful_rounds_per_level: Vec<u32>,
    logical_errors: u32,
    finished: Option<GameOver>,
}

impl GameProgress {
    pub fn new(distance: usize) -> Self {
        Self::with_rounds_per_level(distance, DEFAULT_ROUNDS_PER_LEVEL)
    }

    pub fn with_rounds_per_level(distance: usize, rounds_per_level: u32) -> Self {
        let max_level = num_data_qubits(distance) as u32;
        Self {
            distance,
            level: 1,
            round: 1,
            max_level,
            rounds_per_level: rounds_per_level.max(1),
            successful_rounds_per_level: vec![0; max_level as usize],
            logical_errors: 0,
            finished: None,
        }
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn rounds_per_level(&self) -> u32 {
        self.rounds_per_level
    }

    pub fn logical_errors(&self) -> u32 {
        self.logical_errors
    }

    pub fn successful_rounds_per_level(&self) -> &[u32] {
        &self.successful_rounds_per_level
    }

    pub fn finished(&self) -> Option<GameOver> {
        self.finished
    }

    /// Expected number of errors injected in the current level.
    pub fn errors_for_level(&self) -> usize {
        self.level as usize
    }

    /// Error probability of every level, `l / max_level` for `l` in `1..=max_level`.
    pub fn error_probabilities(&self) -> Vec<f64> {
        (1..=self.max_level)
            .map(|level| level as f64 / self.max_level as f64)
            .collect()
    }

    /// Records the outcome of the current round and advances.
    ///
    /// Once the game is finished further outcomes are ignored and the
    /// finishing reason is returned again.
    pub fn record_round(&mut self, outcome: RoundOutcome) -> ProgressEvent {
        if let Some(reason) = self.finished {
            return ProgressEvent::Finished(reason);
        }
        match outcome {
            RoundOutcome::Trivial => self.advance(),
            RoundOutcome::Success => {
                if let Some(count) = self
                    .successful_rounds_per_level
                    .get_mut(self.level as usize - 1)
                {
                    *count += 1;
                }
                self.advance()
            }
            RoundOutcome::LogicalError => {
                self.logical_errors += 1;
                self.finish(GameOver::LogicalError)
            }
        }
    }

    /// Payload to store once the game is over.
    pub fn submission(&self, name: impl Into<String>, age: Option<u32>) -> GameSubmission {
        GameSubmission {
            name: name.into(),
            age,
            grid_size: self.distance,
            error_probabilities: self.error_probabilities(),
            successful_rounds_per_level: self.successful_rounds_per_level.clone(),
            rounds_per_level: self.rounds_per_level,
            level_reached: self.level,
            logical_errors: self.logical_errors,
        }
    }

    fn advance(&mut self) -> ProgressEvent {
        self.round += 1;
        if self.round <= self.rounds_per_level {
            return ProgressEvent::NextRound {
                level: self.level,
                round: self.round,
            };
        }

        self.level += 1;
        self.round = 1;
        if self.level > self.max_level {
            return self.finish(GameOver::AllLevelsComplete);
        }
        ProgressEvent::LevelComplete {
            completed: self.level - 1,
            next: self.level,
        }
    }

    fn finish(&mut self, reason: GameOver) -> ProgressEvent {
        self.finished = Some(reason);
        ProgressEvent::Finished(reason)
    }
}
