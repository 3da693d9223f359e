//! Game session: one player's round state behind a mutex.
//!
//! The session is the narrow interface a hosting layer drives. Every request
//! takes the session lock for its whole duration, so concurrent submissions
//! are applied one at a time in lock order and a snapshot is never taken
//! halfway through a mutation. Patches come from a shared [`PatchCache`], so
//! sessions at the same distance share one read-only patch.

use crate::EngineError;
use crate::cache::PatchCache;
use crate::round::{RoundEngine, error_probability};
use crate::view::GameStateView;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

struct SessionState {
    engine: RoundEngine,
    rng: StdRng,
}

/// Lock-guarded round engine plus the RNG used for its injections.
pub struct GameSession<'c> {
    cache: &'c PatchCache,
    state: Mutex<SessionState>,
}

impl GameSession<'static> {
    /// Session backed by the global patch cache, seeded from entropy.
    pub fn with_global_cache(distance: usize) -> Result<Self, EngineError> {
        GameSession::new(PatchCache::global(), distance, None)
    }
}

impl<'c> GameSession<'c> {
    /// Creates a session at `distance`.
    ///
    /// A `seed` makes every injection of the session reproducible.
    pub fn new(
        cache: &'c PatchCache,
        distance: usize,
        seed: Option<u64>,
    ) -> Result<Self, EngineError> {
        let patch = cache.get_or_build(distance)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            cache,
            state: Mutex::new(SessionState {
                engine: RoundEngine::new(patch),
                rng,
            }),
        })
    }

    pub fn distance(&self) -> usize {
        self.state.lock().engine.patch().distance()
    }

    pub fn num_data_qubits(&self) -> usize {
        self.state.lock().engine.patch().num_data_qubits()
    }

    /// Starts a new round.
    ///
    /// Switches to `grid_size` when it differs from the current distance,
    /// zeroes the round and injects errors with probability
    /// `num_errors / num_data_qubits`. Returns the hidden snapshot, which
    /// already carries the logical outcome when the injection left the
    /// syndrome at zero.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDistance`] for an unsupported `grid_size` and
    /// [`EngineError::InvalidProbability`] when `num_errors` exceeds the
    /// number of data qubits. The session is unchanged on error.
    pub fn new_round(
        &self,
        grid_size: Option<usize>,
        num_errors: usize,
    ) -> Result<GameStateView, EngineError> {
        let mut state = self.state.lock();

        let patch = match grid_size {
            Some(d) if d != state.engine.patch().distance() => self.cache.get_or_build(d)?,
            _ => state.engine.patch().clone(),
        };
        let p = error_probability(num_errors, patch.num_data_qubits());
        if !(0.0..=1.0).contains(&p) {
            return Err(EngineError::InvalidProbability(p));
        }

        if patch.distance() != state.engine.patch().distance() {
            info!(
                from = state.engine.patch().distance(),
                to = patch.distance(),
                "switching code distance"
            );
            state.engine = RoundEngine::new(patch);
        }

        let SessionState { engine, rng } = &mut *state;
        engine.reset();
        engine.inject_error(p, rng)?;
        debug!(num_errors, p, "new round");

        let mut view = engine.snapshot(false);
        if view.zero_syndrome {
            // Nothing to correct: the round is decided as injected.
            view.logical_error = Some(engine.has_logical_error()?);
        }
        Ok(view)
    }

    /// Applies a correction to one data qubit.
    ///
    /// When the correction clears the syndrome the returned view is revealed
    /// and carries the round's logical outcome.
    pub fn flip_qubit(&self, index: usize) -> Result<GameStateView, EngineError> {
        let mut state = self.state.lock();
        state.engine.apply_correction(&[index])?;

        let zero_syndrome = state.engine.is_syndrome_zero();
        let mut view = state.engine.snapshot(zero_syndrome);
        if zero_syndrome {
            let logical_error = state.engine.has_logical_error()?;
            debug!(index, logical_error, "syndrome cleared");
            view.logical_error = Some(logical_error);
        }
        Ok(view)
    }

    /// Current snapshot without mutating the round.
    pub fn state(&self, reveal: bool) -> GameStateView {
        self.state.lock().engine.snapshot(reveal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn round_without_errors_is_clear() {
        let cache = PatchCache::new();
        let session = GameSession::new(&cache, 3, Some(1)).unwrap();
        let view = session.new_round(None, 0).unwrap();
        assert!(view.zero_syndrome);
        assert!(!view.has_actual_error());
        assert_eq!(view.logical_error, Some(false));
        assert_eq!(view.qubits.len(), 13);
        assert_eq!(view.stabilizers.len(), 6);
    }

    #[test]
    fn switches_distance_on_request() {
        let cache = PatchCache::new();
        let session = GameSession::new(&cache, 3, Some(2)).unwrap();
        let view = session.new_round(Some(5), 3).unwrap();
        assert_eq!(view.distance, 5);
        assert_eq!(view.qubits.len(), 41);
        assert_eq!(session.distance(), 5);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn invalid_requests_leave_session_unchanged() {
        let cache = PatchCache::new();
        let session = GameSession::new(&cache, 3, Some(3)).unwrap();
        session.new_round(None, 13).unwrap();
        let before = session.state(true);

        assert!(matches!(
            session.new_round(Some(9), 1),
            Err(EngineError::InvalidDistance { distance: 9, .. })
        ));
        assert!(matches!(
            session.new_round(None, 14),
            Err(EngineError::InvalidProbability(_))
        ));
        assert!(matches!(
            session.flip_qubit(13),
            Err(EngineError::QubitOutOfBounds { index: 13, .. })
        ));
        assert_eq!(session.state(true), before);
    }

    #[test]
    fn clearing_flip_reveals_and_reports_outcome() {
        let cache = PatchCache::new();
        let session = GameSession::new(&cache, 3, Some(4)).unwrap();
        // Every qubit in error: correcting all of them clears the round.
        session.new_round(None, 13).unwrap();

        let mut view = session.state(false);
        assert!(view.logical_error.is_none());
        for q in 0..13 {
            view = session.flip_qubit(q).unwrap();
            assert_eq!(view.logical_error.is_some(), view.zero_syndrome);
        }
        assert!(view.zero_syndrome);
        assert_eq!(view.logical_error, Some(false));
        assert!(view.qubits.iter().all(|q| q.flipped && q.initial_error && !q.error));
    }

    #[test]
    fn concurrent_flips_are_serialized() {
        let cache: &'static PatchCache = Box::leak(Box::new(PatchCache::new()));
        let session = Arc::new(GameSession::new(cache, 4, Some(5)).unwrap());
        session.new_round(None, 0).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    for _ in 0..50 {
                        session.flip_qubit(t).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Fifty flips per qubit cancel out.
        let view = session.state(true);
        assert!(view.zero_syndrome);
        assert!(view.qubits.iter().all(|q| !q.flipped && !q.actual_error));
    }
}
