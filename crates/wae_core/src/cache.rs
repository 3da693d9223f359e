//! Shared cache of surface-code patches.
//!
//! Building a patch is deterministic, so each distance is built at most once
//! and then shared as an `Arc`. Readers take the read lock on the fast path;
//! a miss upgrades to the write lock and rechecks before building, so racing
//! first requests for the same distance end up with the same patch.

use crate::EngineError;
use crate::patch::SurfaceCodePatch;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;
use wae_common::limits::{MAX_DISTANCE, MIN_DISTANCE};

/// Map from code distance to its built patch.
#[derive(Debug, Default)]
pub struct PatchCache {
    patches: RwLock<HashMap<usize, Arc<SurfaceCodePatch>>>,
}

impl PatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide cache shared by every session.
    pub fn global() -> &'static PatchCache {
        static GLOBAL: OnceLock<PatchCache> = OnceLock::new();
        GLOBAL.get_or_init(PatchCache::new)
    }

    /// Returns the patch for distance `d`, building it on first use.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDistance`] when `d` is outside
    /// `MIN_DISTANCE..=MAX_DISTANCE`.
    pub fn get_or_build(&self, d: usize) -> Result<Arc<SurfaceCodePatch>, EngineError> {
        if !(MIN_DISTANCE..=MAX_DISTANCE).contains(&d) {
            return Err(EngineError::InvalidDistance {
                distance: d,
                min: MIN_DISTANCE,
                max: MAX_DISTANCE,
            });
        }

        if let Some(patch) = self.patches.read().get(&d) {
            return Ok(Arc::clone(patch));
        }

        let mut patches = self.patches.write();
        if let Some(patch) = patches.get(&d) {
            return Ok(Arc::clone(patch));
        }
        debug!(distance = d, "patch cache miss");
        let patch = Arc::new(SurfaceCodePatch::new(d)?);
        patches.insert(d, Arc::clone(&patch));
        Ok(patch)
    }

    /// Number of distances built so far.
    pub fn len(&self) -> usize {
        self.patches.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.read().is_empty()
    }
}

/// Builds or retrieves the patch for distance `d` from the global cache.
pub fn new_patch(d: usize) -> Result<Arc<SurfaceCodePatch>, EngineError> {
    PatchCache::global().get_or_build(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn builds_each_distance_once() {
        let cache = PatchCache::new();
        let a = cache.get_or_build(3).unwrap();
        let b = cache.get_or_build(3).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        cache.get_or_build(5).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn rejects_distances_outside_limits() {
        let cache = PatchCache::new();
        for d in [0, 1, MAX_DISTANCE + 1] {
            assert!(matches!(
                cache.get_or_build(d),
                Err(EngineError::InvalidDistance { distance, .. }) if distance == d
            ));
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_first_requests_share_one_patch() {
        let cache = Arc::new(PatchCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_build(6).unwrap())
            })
            .collect();
        let patches: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(patches.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn global_cache_serves_new_patch() {
        let patch = new_patch(2).unwrap();
        assert_eq!(patch.num_data_qubits(), 5);
        assert!(Arc::ptr_eq(&patch, &new_patch(2).unwrap()));
    }
}
