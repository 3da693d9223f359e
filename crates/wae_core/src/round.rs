//! Round engine for interactive correction rounds.
//!
//! A round moves through `Reset -> Injected -> (Correcting)* -> Cleared`.
//! The engine owns the error frame of one patch and keeps the syndrome in
//! step with the error: every operation that mutates the error refreshes the
//! syndrome before returning, so it can never be read stale. Index and
//! probability checks run before the first bit is touched.

use crate::EngineError;
use crate::frame::ErrorFrame;
use crate::patch::SurfaceCodePatch;
use crate::view::{AncillaView, DataQubitView, GameStateView};
use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, trace};

/// Position of a round in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Freshly zeroed state.
    Reset,

    /// Errors were injected; the syndrome may or may not be zero.
    Injected,

    /// At least one correction was applied and stabilizers are still excited.
    Correcting,

    /// The syndrome returned to zero after corrections.
    Cleared,
}

/// Injection probability for a requested error count.
///
/// The hosting layer specifies levels by the expected number of errors
/// rather than a probability; the probability is that count spread over the
/// data qubits, or zero when no errors are requested.
pub fn error_probability(num_errors: usize, num_data_qubits: usize) -> f64 {
    if num_errors > 0 && num_data_qubits > 0 {
        num_errors as f64 / num_data_qubits as f64
    } else {
        0.0
    }
}

/// Drives the rounds of one patch.
#[derive(Debug, Clone)]
pub struct RoundEngine {
    patch: Arc<SurfaceCodePatch>,
    frame: ErrorFrame,
    phase: RoundPhase,
}

impl RoundEngine {
    pub fn new(patch: Arc<SurfaceCodePatch>) -> Self {
        let frame = ErrorFrame::new(patch.num_data_qubits(), patch.num_checks());
        Self {
            patch,
            frame,
            phase: RoundPhase::Reset,
        }
    }

    pub fn patch(&self) -> &Arc<SurfaceCodePatch> {
        &self.patch
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn frame(&self) -> &ErrorFrame {
        &self.frame
    }

    pub fn error(&self) -> &BitSlice<u64, Lsb0> {
        self.frame.error()
    }

    pub fn initial_error(&self) -> &BitSlice<u64, Lsb0> {
        self.frame.initial_error()
    }

    pub fn flips(&self) -> &BitSlice<u64, Lsb0> {
        self.frame.flips()
    }

    pub fn syndrome(&self) -> &BitSlice<u64, Lsb0> {
        self.frame.syndrome()
    }

    /// Zeroes the round state, abandoning any round in progress.
    pub fn reset(&mut self) {
        self.frame.reset();
        self.phase = RoundPhase::Reset;
    }

    /// Samples an independent bit flip with probability `p` on every data qubit.
    ///
    /// Qubits whose sample fires are set to 1; the others keep their value.
    /// The result is snapshotted as the round's initial error, flips are
    /// cleared and the syndrome refreshed. `p == 0` leaves the error as is.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidProbability`] when `p` is NaN or outside `[0, 1]`.
    pub fn inject_error<R: Rng + ?Sized>(&mut self, p: f64, rng: &mut R) -> Result<(), EngineError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(EngineError::InvalidProbability(p));
        }
        for q in 0..self.frame.num_data_qubits() {
            if rng.gen_bool(p) {
                self.frame.mark_error(q);
            }
        }
        self.finish_injection();
        debug!(
            p,
            errors = self.frame.error_weight(),
            excited = self.frame.syndrome_weight(),
            "injected errors"
        );
        Ok(())
    }

    /// Toggles `weight` uniformly chosen data qubits.
    ///
    /// Draws are independent and with replacement, so a qubit drawn twice
    /// ends up unchanged. Snapshot and syndrome are handled as in
    /// [`inject_error`](Self::inject_error).
    pub fn inject_error_with_weight<R: Rng + ?Sized>(&mut self, weight: usize, rng: &mut R) {
        let n = self.frame.num_data_qubits();
        if n > 0 {
            for _ in 0..weight {
                self.frame.toggle_error(rng.gen_range(0..n));
            }
        }
        self.finish_injection();
        debug!(weight, errors = self.frame.error_weight(), "injected weighted errors");
    }

    /// Toggles the listed data qubits as an injected error.
    ///
    /// # Errors
    ///
    /// [`EngineError::QubitOutOfBounds`] if any index is not a data qubit;
    /// nothing is injected in that case.
    pub fn inject_error_at(&mut self, qubits: &[usize]) -> Result<(), EngineError> {
        self.check_indices(qubits)?;
        for &q in qubits {
            self.frame.toggle_error(q);
        }
        self.finish_injection();
        Ok(())
    }

    /// Applies a batch of single-qubit corrections.
    ///
    /// Each listed qubit has its error and flip bits toggled, so correcting a
    /// qubit twice cancels out. The syndrome is refreshed once after the
    /// batch.
    ///
    /// # Errors
    ///
    /// [`EngineError::QubitOutOfBounds`] if any index is not a data qubit;
    /// no qubit of the batch is touched in that case.
    pub fn apply_correction(&mut self, qubits: &[usize]) -> Result<(), EngineError> {
        self.check_indices(qubits)?;
        for &q in qubits {
            self.frame.apply_flip(q);
        }
        self.refresh_syndrome();
        self.phase = if self.is_syndrome_zero() {
            RoundPhase::Cleared
        } else {
            RoundPhase::Correcting
        };
        trace!(
            ?qubits,
            excited = self.frame.syndrome_weight(),
            phase = ?self.phase,
            "applied correction"
        );
        Ok(())
    }

    pub fn is_syndrome_zero(&self) -> bool {
        self.frame.syndrome().not_any()
    }

    /// Whether the residual error flips the logical operator.
    ///
    /// # Errors
    ///
    /// [`EngineError::NonZeroSyndrome`] while stabilizers are still excited:
    /// the logical parity of an uncorrected pattern says nothing about the
    /// outcome of the round.
    pub fn has_logical_error(&self) -> Result<bool, EngineError> {
        if !self.is_syndrome_zero() {
            return Err(EngineError::NonZeroSyndrome {
                excited: self.frame.syndrome_weight(),
            });
        }
        Ok(self.patch.logical_parity(self.frame.error()))
    }

    /// Read-only projection of the round for a client.
    ///
    /// Error bits are hidden unless `reveal` is set or the syndrome is
    /// already zero; `actual_error`, `initial_error` and `flipped` are always
    /// filled in.
    pub fn snapshot(&self, reveal: bool) -> GameStateView {
        let zero_syndrome = self.is_syndrome_zero();
        let show_errors = reveal || zero_syndrome;

        let qubits = self
            .patch
            .data_qubits()
            .iter()
            .map(|q| DataQubitView {
                index: q.index,
                row: q.row,
                col: q.col,
                error: show_errors && self.frame.has_error(q.index),
                actual_error: self.frame.has_error(q.index),
                initial_error: self.frame.initial_error()[q.index],
                flipped: self.frame.is_flipped(q.index),
            })
            .collect();

        let stabilizers = self
            .patch
            .ancilla_qubits()
            .iter()
            .enumerate()
            .map(|(check, q)| AncillaView {
                index: q.index,
                row: q.row,
                col: q.col,
                excited: self.frame.syndrome()[check],
            })
            .collect();

        GameStateView {
            distance: self.patch.distance(),
            qubits,
            stabilizers,
            zero_syndrome,
            logical_error: None,
        }
    }

    fn check_indices(&self, qubits: &[usize]) -> Result<(), EngineError> {
        let num_data_qubits = self.frame.num_data_qubits();
        match qubits.iter().find(|&&q| q >= num_data_qubits) {
            Some(&index) => Err(EngineError::QubitOutOfBounds {
                index,
                num_data_qubits,
            }),
            None => Ok(()),
        }
    }

    fn finish_injection(&mut self) {
        self.frame.snapshot_injection();
        self.refresh_syndrome();
        self.phase = RoundPhase::Injected;
    }

    fn refresh_syndrome(&mut self) {
        self.frame.refresh_syndrome(self.patch.h());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn engine(d: usize) -> RoundEngine {
        RoundEngine::new(Arc::new(SurfaceCodePatch::new(d).unwrap()))
    }

    #[test]
    fn zero_probability_round_is_trivially_clear() {
        let mut engine = engine(3);
        let mut rng = StdRng::seed_from_u64(7);
        engine.reset();
        engine.inject_error(0.0, &mut rng).unwrap();

        assert_eq!(engine.phase(), RoundPhase::Injected);
        assert!(engine.is_syndrome_zero());
        assert_eq!(engine.has_logical_error(), Ok(false));
        assert!(engine.error().not_any());
    }

    #[test]
    fn full_probability_marks_every_qubit() {
        let mut engine = engine(2);
        let mut rng = StdRng::seed_from_u64(1);
        engine.inject_error(1.0, &mut rng).unwrap();
        assert!(engine.error().all());
        assert_eq!(engine.initial_error(), engine.error());
        assert_eq!(engine.syndrome().to_bitvec(), engine.patch().syndrome_of(engine.error()));
    }

    #[test]
    fn out_of_range_probability_is_rejected_untouched() {
        let mut engine = engine(3);
        let mut rng = StdRng::seed_from_u64(0);
        for p in [-0.1, 1.5, f64::NAN] {
            assert!(matches!(
                engine.inject_error(p, &mut rng),
                Err(EngineError::InvalidProbability(_))
            ));
        }
        assert_eq!(engine.phase(), RoundPhase::Reset);
    }

    #[test]
    fn corner_error_excites_first_check_and_is_corrected() {
        let mut engine = engine(3);
        engine.inject_error_at(&[0]).unwrap();

        assert_eq!(engine.syndrome().iter_ones().collect::<Vec<_>>(), vec![0]);
        assert!(matches!(
            engine.has_logical_error(),
            Err(EngineError::NonZeroSyndrome { excited: 1 })
        ));

        engine.apply_correction(&[0]).unwrap();
        assert_eq!(engine.phase(), RoundPhase::Cleared);
        assert!(engine.is_syndrome_zero());
        assert_eq!(engine.has_logical_error(), Ok(false));
        assert!(engine.flips()[0]);
        assert!(engine.initial_error()[0]);
    }

    #[test]
    fn wrong_correction_on_row_leaves_logical_error() {
        // Error on (0,0); the player corrects (0,2) and (0,4) instead, which
        // completes a chain across the top row.
        let mut engine = engine(3);
        engine.inject_error_at(&[0]).unwrap();

        engine.apply_correction(&[1]).unwrap();
        assert_eq!(engine.phase(), RoundPhase::Correcting);
        engine.apply_correction(&[2]).unwrap();

        assert!(engine.is_syndrome_zero());
        assert_eq!(engine.has_logical_error(), Ok(true));
    }

    #[test]
    fn invalid_index_rejects_whole_batch() {
        let mut engine = engine(3);
        engine.inject_error_at(&[4]).unwrap();
        let before = engine.frame().clone();

        let err = engine.apply_correction(&[0, 13]).unwrap_err();
        assert_eq!(
            err,
            EngineError::QubitOutOfBounds {
                index: 13,
                num_data_qubits: 13
            }
        );
        assert_eq!(engine.frame(), &before);
        assert!(engine.inject_error_at(&[99]).is_err());
        assert_eq!(engine.frame(), &before);
    }

    #[test]
    fn double_correction_cancels() {
        let mut engine = engine(4);
        let mut rng = StdRng::seed_from_u64(42);
        engine.inject_error(0.3, &mut rng).unwrap();
        let before = engine.frame().clone();

        engine.apply_correction(&[5]).unwrap();
        engine.apply_correction(&[5]).unwrap();
        assert_eq!(engine.error(), before.error());
        assert_eq!(engine.flips(), before.flips());
        assert_eq!(engine.syndrome(), before.syndrome());
    }

    #[test]
    fn weighted_injection_cancels_repeated_draws() {
        let mut engine = engine(3);
        let mut rng = StdRng::seed_from_u64(3);
        engine.inject_error_with_weight(4, &mut rng);
        assert!(engine.frame().error_weight() <= 4);
        assert_eq!(engine.frame().error_weight() % 2, 0);
        assert_eq!(engine.initial_error(), engine.error());
        assert_eq!(engine.syndrome().to_bitvec(), engine.patch().syndrome_of(engine.error()));
    }

    #[test]
    fn reset_abandons_round() {
        let mut engine = engine(3);
        engine.inject_error_at(&[0, 7]).unwrap();
        engine.apply_correction(&[3]).unwrap();
        engine.reset();
        assert_eq!(engine.phase(), RoundPhase::Reset);
        assert!(engine.error().not_any());
        assert!(engine.flips().not_any());
        assert!(engine.initial_error().not_any());
        assert!(engine.is_syndrome_zero());
    }

    #[test]
    fn snapshot_hides_errors_until_cleared() {
        let mut engine = engine(3);
        engine.inject_error_at(&[0]).unwrap();

        let hidden = engine.snapshot(false);
        assert!(!hidden.zero_syndrome);
        assert!(hidden.qubits.iter().all(|q| !q.error));
        assert!(hidden.qubits[0].actual_error);
        assert!(hidden.stabilizers[0].excited);
        assert_eq!(hidden.stabilizers[0].index, 13);

        let revealed = engine.snapshot(true);
        assert!(revealed.qubits[0].error);

        engine.apply_correction(&[0]).unwrap();
        let cleared = engine.snapshot(false);
        assert!(cleared.zero_syndrome);
        assert!(cleared.qubits[0].flipped);
        assert!(cleared.qubits[0].initial_error);
        assert!(!cleared.qubits[0].actual_error);
    }

    #[test]
    fn error_probability_follows_hosting_convention() {
        assert_eq!(error_probability(0, 13), 0.0);
        assert_eq!(error_probability(13, 13), 1.0);
        assert!((error_probability(2, 13) - 2.0 / 13.0).abs() < 1e-12);
    }
}
