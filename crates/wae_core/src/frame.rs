//! Error frame tracking bit-flip errors and player corrections.
//!
//! The frame is the mutable half of a round. It tracks the current physical
//! error on every data qubit, the error as it was right after injection, the
//! parity of corrections applied to each qubit and the syndrome. Updates are
//! XOR toggles on packed bit vectors; the frame never decides when the
//! syndrome is refreshed, so the round engine can validate a whole batch
//! before touching anything and refresh once afterwards.

use crate::parity::{BinaryMatrix, Bits};
use bitvec::prelude::*;

/// Round state of a patch: four bit vectors indexed by data qubit or check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFrame {
    /// Current physical error pattern.
    ///
    /// Written by injection and toggled by every correction, so after a
    /// correction it holds the residual error rather than the injected one.
    error: Bits,

    /// Snapshot of `error` taken right after injection.
    ///
    /// Never touched by corrections. Lets a client reveal where the errors
    /// were originally placed once the round is over.
    initial_error: Bits,

    /// Parity of corrections applied to each qubit.
    ///
    /// Toggled once per correction command targeting the qubit, independent
    /// of whether the qubit actually carried an error.
    flips: Bits,

    /// One bit per stabilizer, `(H @ error) mod 2` after every refresh.
    syndrome: Bits,
}

impl ErrorFrame {
    /// Allocates an all-zero frame.
    pub fn new(num_data_qubits: usize, num_checks: usize) -> Self {
        Self {
            error: bitvec![u64, Lsb0; 0; num_data_qubits],
            initial_error: bitvec![u64, Lsb0; 0; num_data_qubits],
            flips: bitvec![u64, Lsb0; 0; num_data_qubits],
            syndrome: bitvec![u64, Lsb0; 0; num_checks],
        }
    }

    /// Clears every vector without reallocating.
    pub fn reset(&mut self) {
        self.error.fill(false);
        self.initial_error.fill(false);
        self.flips.fill(false);
        self.syndrome.fill(false);
    }

    pub fn num_data_qubits(&self) -> usize {
        self.error.len()
    }

    pub fn error(&self) -> &BitSlice<u64, Lsb0> {
        &self.error
    }

    pub fn initial_error(&self) -> &BitSlice<u64, Lsb0> {
        &self.initial_error
    }

    pub fn flips(&self) -> &BitSlice<u64, Lsb0> {
        &self.flips
    }

    pub fn syndrome(&self) -> &BitSlice<u64, Lsb0> {
        &self.syndrome
    }

    /// Recomputes the syndrome as `(h @ error) mod 2`.
    pub fn refresh_syndrome(&mut self, h: &BinaryMatrix) {
        h.mul_vec_into(&self.error, &mut self.syndrome);
    }

    /// Sets the error bit of qubit `q`.
    pub fn mark_error(&mut self, q: usize) {
        self.error.set(q, true);
    }

    /// Toggles the error bit of qubit `q`.
    pub fn toggle_error(&mut self, q: usize) {
        let bit = self.error[q];
        self.error.set(q, !bit);
    }

    /// Applies a correction on qubit `q`: toggles both its error and flip bits.
    pub fn apply_flip(&mut self, q: usize) {
        self.toggle_error(q);
        let bit = self.flips[q];
        self.flips.set(q, !bit);
    }

    /// Copies `error` into `initial_error` and clears the flips.
    ///
    /// Marks the end of an injection: whatever the player does next is
    /// measured against this snapshot.
    pub fn snapshot_injection(&mut self) {
        self.initial_error.copy_from_bitslice(&self.error);
        self.flips.fill(false);
    }

    pub fn has_error(&self, q: usize) -> bool {
        self.error[q]
    }

    pub fn is_flipped(&self, q: usize) -> bool {
        self.flips[q]
    }

    /// Number of excited stabilizers.
    pub fn syndrome_weight(&self) -> usize {
        self.syndrome.count_ones()
    }

    /// Number of data qubits currently carrying an error.
    pub fn error_weight(&self) -> usize {
        self.error.count_ones()
    }
}
