//! Stabilizer and logical-operator supports.
//!
//! A support is the sorted list of data-qubit indices an operator acts on.
//! Stabilizer supports come from coordinate lookups around each ancilla, so
//! ancillas on the top and bottom rows naturally pick up fewer data qubits
//! than interior ones.

use crate::lattice::{Lattice, QubitKind};

/// Supports of every X stabilizer and of the logical X operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supports {
    /// One entry per ancilla, in ancilla index order.
    pub stabilizers: Vec<Vec<usize>>,

    /// Data qubits of the logical X operator: the left column, one per even row.
    pub logical: Vec<usize>,
}

impl Supports {
    pub fn derive(lattice: &Lattice) -> Self {
        Self {
            stabilizers: stabilizer_supports(lattice),
            logical: logical_support(lattice),
        }
    }

    pub fn num_checks(&self) -> usize {
        self.stabilizers.len()
    }
}

/// Data qubits adjacent to each X ancilla, sorted by index.
pub fn stabilizer_supports(lattice: &Lattice) -> Vec<Vec<usize>> {
    lattice
        .ancilla_qubits()
        .iter()
        .map(|ancilla| {
            let mut support: Vec<usize> = lattice
                .neighbors(ancilla)
                .filter(|q| q.kind == QubitKind::Data)
                .map(|q| q.index)
                .collect();
            support.sort_unstable();
            support
        })
        .collect()
}

/// Data qubits at column 0 on every even doubled row.
///
/// Every even row starts with a data qubit at column 0, so the support has
/// exactly `d` entries.
pub fn logical_support(lattice: &Lattice) -> Vec<usize> {
    (0..lattice.extent())
        .step_by(2)
        .filter_map(|row| lattice.qubit_at(row, 0))
        .filter(|q| q.kind == QubitKind::Data)
        .map(|q| q.index)
        .collect()
}
