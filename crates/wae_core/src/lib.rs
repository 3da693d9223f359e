//! Surface-code patch engine for the whack-an-error game.
//!
//! This crate builds distance-`d` surface-code patches (data qubits, X
//! stabilizers and the logical X operator), derives their parity-check and
//! logical matrices over GF(2), and drives interactive correction rounds:
//! stochastic bit-flip injection, syndrome extraction, player corrections and
//! logical-error detection. Patches are immutable and shared through a cache;
//! round state is owned by a lock-guarded game session.

/// Process-wide cache of built patches keyed by code distance.
///
/// Patches are pure functions of the distance, so each one is built once and
/// handed out as a shared, read-only `Arc`. The cache guards concurrent first
/// builds so that two sessions asking for the same distance share one patch.
pub mod cache;

/// Error frame tracking the physical error, corrections and syndrome.
///
/// Holds the four bit vectors of a round (current error, injected error
/// snapshot, correction flips and syndrome) and the primitive XOR updates on
/// them. The frame never recomputes the syndrome itself; that is the round
/// engine's job.
pub mod frame;

/// Lattice construction on the doubled coordinate grid.
///
/// Places data qubits in the brick pattern and X ancillas on even rows at odd
/// columns, assigns dense indices and builds the coordinate lookup used for
/// neighbour queries.
pub mod lattice;

/// Binary matrices over GF(2).
///
/// Row-major bit matrices used for the parity-check matrix `H` and the
/// logical matrix `L`, with the matrix-vector product mod 2 that turns an
/// error pattern into a syndrome or a logical parity.
pub mod parity;

/// Immutable surface-code patch: lattice, supports and matrices.
pub mod patch;

/// Level and round bookkeeping for a full game.
///
/// Implements the progression rules of the game client: how many errors each
/// level injects, when a level is complete, when the game ends, and the
/// record payload produced at the end.
pub mod progress;

/// Round engine driving reset, injection, corrections and termination.
pub mod round;

/// Lock-guarded game session wrapping a round engine.
pub mod session;

/// Stabilizer and logical-operator support derivation.
pub mod stabilizer;

/// Read-only projection of the round state for a hosting layer.
pub mod view;

pub use cache::{PatchCache, new_patch};
pub use lattice::{Lattice, Qubit, QubitKind};
pub use patch::SurfaceCodePatch;
pub use round::{RoundEngine, RoundPhase, error_probability};
pub use session::GameSession;
pub use view::GameStateView;

/// Error types returned by the engine.
///
/// Every variant is a precondition violation reported synchronously to the
/// caller. Validation always happens before any vector is touched, so an
/// error never leaves a round partially mutated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The requested code distance is outside the game's range.
    ///
    /// Raised by the patch cache and by sessions.
    #[error("code distance {distance} is outside the supported range {min}..={max}")]
    InvalidDistance {
        distance: usize,
        min: usize,
        max: usize,
    },

    /// A patch was requested for a distance too small to lay out.
    #[error("code distance {distance} is below the minimum of {min}")]
    DistanceTooSmall { distance: usize, min: usize },

    /// A correction references a qubit that is not a data qubit of the patch.
    ///
    /// The whole batch is rejected; no qubit of the batch is flipped.
    #[error("qubit index {index} is out of bounds for a patch with {num_data_qubits} data qubits")]
    QubitOutOfBounds {
        index: usize,
        num_data_qubits: usize,
    },

    /// The error probability is NaN or outside `[0, 1]`.
    #[error("error probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    /// A logical-error query was made while stabilizers are still excited.
    ///
    /// The logical parity of an error pattern is only meaningful once the
    /// syndrome has been cleared. Hitting this indicates a caller bug.
    #[error("logical error queried while {excited} stabilizer(s) are still excited")]
    NonZeroSyndrome { excited: usize },
}
