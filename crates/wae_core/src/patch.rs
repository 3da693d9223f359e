//! Surface-code patch: the per-distance constant part of the engine.
//!
//! A patch bundles the lattice, the stabilizer and logical supports and the
//! two matrices derived from them. None of it changes after construction, so
//! a patch is shared read-only between every round and session played at its
//! distance.

use crate::EngineError;
use crate::lattice::{Lattice, Qubit};
use crate::parity::{BinaryMatrix, Bits};
use crate::stabilizer::Supports;
use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use tracing::debug;
use wae_common::limits::MIN_DISTANCE;

/// Lattice, supports, parity-check matrix `H` and logical matrix `L` for one distance.
#[derive(Debug, Clone)]
pub struct SurfaceCodePatch {
    lattice: Lattice,
    supports: Supports,
    h: BinaryMatrix,
    l: BinaryMatrix,
}

impl SurfaceCodePatch {
    /// Builds the patch for distance `d`.
    ///
    /// # Errors
    ///
    /// [`EngineError::DistanceTooSmall`] when `d` is below two. There is no
    /// upper bound here; the patch cache applies the game's bound.
    pub fn new(d: usize) -> Result<Self, EngineError> {
        if d < MIN_DISTANCE {
            return Err(EngineError::DistanceTooSmall {
                distance: d,
                min: MIN_DISTANCE,
            });
        }

        let lattice = Lattice::build(d);
        let supports = Supports::derive(&lattice);
        let n = lattice.num_data_qubits();
        let h = BinaryMatrix::from_supports(n, &supports.stabilizers);
        let l = BinaryMatrix::from_supports(n, std::slice::from_ref(&supports.logical));

        debug!(
            distance = d,
            data_qubits = n,
            checks = h.n_rows(),
            "built surface code patch"
        );

        Ok(Self {
            lattice,
            supports,
            h,
            l,
        })
    }

    pub fn distance(&self) -> usize {
        self.lattice.distance()
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn num_data_qubits(&self) -> usize {
        self.lattice.num_data_qubits()
    }

    pub fn num_checks(&self) -> usize {
        self.h.n_rows()
    }

    pub fn data_qubits(&self) -> &[Qubit] {
        self.lattice.data_qubits()
    }

    pub fn ancilla_qubits(&self) -> &[Qubit] {
        self.lattice.ancilla_qubits()
    }

    /// Data-qubit support of the stabilizer measured by ancilla slot `check`.
    pub fn stabilizer_support(&self, check: usize) -> &[usize] {
        &self.supports.stabilizers[check]
    }

    pub fn logical_support(&self) -> &[usize] {
        &self.supports.logical
    }

    /// Parity-check matrix, checks x data qubits.
    pub fn h(&self) -> &BinaryMatrix {
        &self.h
    }

    /// Logical matrix, one row x data qubits.
    pub fn l(&self) -> &BinaryMatrix {
        &self.l
    }

    /// `(H @ error) mod 2`.
    pub fn syndrome_of(&self, error: &BitSlice<u64, Lsb0>) -> Bits {
        self.h.mul_vec(error)
    }

    /// `(L @ error) mod 2 != 0`.
    pub fn logical_parity(&self, error: &BitSlice<u64, Lsb0>) -> bool {
        self.l.row_parity(0, error)
    }
}
