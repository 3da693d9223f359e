//! Common definitions shared across the whack-an-error workspace.
//!
//! This crate provides the code-distance limits and game defaults used by the
//! engine and the hosting layer, together with the persisted game record
//! schema that the store, the statistics aggregator and the CLI exchange.

// Code-distance limits and game defaults.
//
// The engine can build a lattice for any distance of at least two, but the
// patch cache and the game only hand out the small, bounded set of distances
// the player can choose from. Keeping the bounds here lets the store and the
// host validate user input against the same numbers the engine enforces.
pub mod limits {
    /// Smallest code distance that yields a non-degenerate lattice.
    ///
    /// A distance-1 lattice has a single data qubit and no stabilizers, so
    /// there is nothing to detect and nothing to correct.
    pub const MIN_DISTANCE: usize = 2;

    /// Largest code distance served by the patch cache.
    ///
    /// Bounds the cache to six entries. A distance-7 patch already has 85
    /// data qubits, which is the upper end of what an interactive player
    /// can reasonably correct by hand.
    pub const MAX_DISTANCE: usize = 7;

    /// Distance a new game session starts with.
    pub const DEFAULT_DISTANCE: usize = 3;

    /// Rounds a player must finish before advancing to the next level.
    pub const DEFAULT_ROUNDS_PER_LEVEL: u32 = 5;

    /// Number of data qubits in a distance-`d` patch: `d² + (d-1)²`.
    ///
    /// Shared by the engine (vector lengths), the progression rules (the
    /// number of levels) and the statistics aggregator (the x-axis support).
    pub const fn num_data_qubits(d: usize) -> usize {
        if d == 0 {
            return 0;
        }
        d * d + (d - 1) * (d - 1)
    }

    /// Number of X-stabilizer checks in a distance-`d` patch: `d·(d-1)`.
    pub const fn num_checks(d: usize) -> usize {
        if d == 0 {
            return 0;
        }
        d * (d - 1)
    }
}

/// Persisted game records.
///
/// A finished game is reduced to one record: who played, at which distance,
/// which error probabilities the levels used, how many rounds were won per
/// level and how far the player got. The engine never sees these records; the
/// hosting layer builds a [`record::GameSubmission`] from the game progression
/// and the store turns it into a [`record::GameRecord`] by assigning an
/// identifier and a timestamp.
pub mod record {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    /// Record payload produced at the end of a game, before it is stored.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GameSubmission {
        /// Player name, empty when the player stayed anonymous.
        pub name: String,

        /// Player age, when given.
        pub age: Option<u32>,

        /// Code distance the game was played at.
        pub grid_size: usize,

        /// Physical error probability assigned to each level, in level order.
        pub error_probabilities: Vec<f64>,

        /// Rounds won per level, indexed by `level - 1`.
        pub successful_rounds_per_level: Vec<u32>,

        /// Rounds played on each completed level.
        pub rounds_per_level: u32,

        /// Level the game ended on.
        pub level_reached: u32,

        /// Logical errors encountered over the whole game.
        pub logical_errors: u32,
    }

    /// A stored game record.
    ///
    /// Field names match the column names of the legacy data file so that
    /// imported and freshly stored records serialize identically.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct GameRecord {
        /// Short session identifier, eight hex characters.
        pub uid: String,

        /// Moment the record was stored.
        pub timestamp: DateTime<Utc>,

        pub name: String,
        pub age: Option<u32>,
        pub grid_size: usize,
        pub error_probabilities: Vec<f64>,
        pub successful_rounds_per_level: Vec<u32>,
        pub rounds_per_level: u32,
        pub level_reached: u32,
        pub logical_errors: u32,
    }

    impl GameRecord {
        /// Builds a record from a submission and the identity the store assigned.
        pub fn from_submission(
            uid: String,
            timestamp: DateTime<Utc>,
            submission: GameSubmission,
        ) -> Self {
            Self {
                uid,
                timestamp,
                name: submission.name,
                age: submission.age,
                grid_size: submission.grid_size,
                error_probabilities: submission.error_probabilities,
                successful_rounds_per_level: submission.successful_rounds_per_level,
                rounds_per_level: submission.rounds_per_level,
                level_reached: submission.level_reached,
                logical_errors: submission.logical_errors,
            }
        }
    }
}
