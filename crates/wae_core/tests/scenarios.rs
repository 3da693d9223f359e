//! End-to-end rounds on a distance-3 patch.

use rand::SeedableRng;
use rand::rngs::StdRng;
use wae_core::{EngineError, GameSession, PatchCache, RoundEngine, RoundPhase, new_patch};

#[test]
fn error_free_round_has_no_logical_error() {
    let patch = new_patch(3).unwrap();
    assert_eq!(patch.num_data_qubits(), 13);
    assert_eq!(patch.num_checks(), 6);

    let mut engine = RoundEngine::new(patch);
    let mut rng = StdRng::seed_from_u64(11);
    engine.reset();
    engine.inject_error(0.0, &mut rng).unwrap();

    assert!(engine.is_syndrome_zero());
    assert_eq!(engine.has_logical_error(), Ok(false));
}

#[test]
fn single_error_next_to_first_ancilla() {
    let patch = new_patch(3).unwrap();
    // (0,0) touches only the ancilla at (0,1).
    let corner = patch.lattice().qubit_at(0, 0).unwrap().index;
    let mut engine = RoundEngine::new(patch);

    engine.inject_error_at(&[corner]).unwrap();
    let syndrome: Vec<bool> = engine.syndrome().iter().by_vals().collect();
    assert_eq!(syndrome, vec![true, false, false, false, false, false]);
    assert!(matches!(
        engine.has_logical_error(),
        Err(EngineError::NonZeroSyndrome { .. })
    ));

    engine.apply_correction(&[corner]).unwrap();
    assert_eq!(engine.phase(), RoundPhase::Cleared);
    assert!(engine.is_syndrome_zero());
    assert_eq!(engine.has_logical_error(), Ok(false));
}

#[test]
fn interior_error_is_shared_by_two_checks() {
    let patch = new_patch(3).unwrap();
    // (1,1) sits between the ancillas at (0,1) and (2,1).
    let q = patch.lattice().qubit_at(1, 1).unwrap().index;
    let mut engine = RoundEngine::new(patch);

    engine.inject_error_at(&[q]).unwrap();
    assert_eq!(engine.syndrome().iter_ones().collect::<Vec<_>>(), vec![0, 2]);
    engine.apply_correction(&[q]).unwrap();
    assert_eq!(engine.has_logical_error(), Ok(false));
}

#[test]
fn session_plays_a_full_round() {
    let cache = PatchCache::new();
    let session = GameSession::new(&cache, 3, Some(99)).unwrap();
    let view = session.new_round(Some(3), 13).unwrap();
    assert!(view.qubits.iter().all(|q| q.actual_error && !q.error));

    let mut last = view;
    for q in 0..13 {
        last = session.flip_qubit(q).unwrap();
    }
    assert!(last.zero_syndrome);
    assert_eq!(last.logical_error, Some(false));
}
