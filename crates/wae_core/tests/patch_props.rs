//! Property-based tests for lattice construction and matrix derivation.
//!
//! These tests check the counting and support invariants of every patch the
//! cache can serve.

use proptest::prelude::*;
use std::collections::HashSet;
use wae_core::SurfaceCodePatch;
use wae_core::lattice::QubitKind;

proptest! {
    /// A distance-d patch has d² + (d-1)² data qubits and d·(d-1) ancillas,
    /// with pairwise distinct coordinates.
    #[test]
    fn prop_qubit_counts(d in 2usize..=12) {
        let patch = SurfaceCodePatch::new(d).unwrap();
        let lattice = patch.lattice();

        prop_assert_eq!(lattice.num_data_qubits(), d * d + (d - 1) * (d - 1));
        prop_assert_eq!(lattice.num_ancillas(), d * (d - 1));
        prop_assert_eq!(patch.num_checks(), d * (d - 1));

        let coords: HashSet<_> = lattice.qubits().map(|q| q.coordinate()).collect();
        prop_assert_eq!(coords.len(), lattice.num_data_qubits() + lattice.num_ancillas());
    }

    /// Every H row has exactly the ones of its ancilla's support, and every
    /// support entry is a data qubit adjacent to the ancilla.
    #[test]
    fn prop_h_rows_match_adjacency(d in 2usize..=12) {
        let patch = SurfaceCodePatch::new(d).unwrap();
        let lattice = patch.lattice();

        for (check, ancilla) in patch.ancilla_qubits().iter().enumerate() {
            let support = patch.stabilizer_support(check);
            prop_assert!(support.len() == 3 || support.len() == 4);
            prop_assert_eq!(patch.h().row_weight(check), support.len());
            prop_assert_eq!(patch.h().row_support(check), support.to_vec());

            for &q in support {
                let qubit = lattice.qubit(q).unwrap();
                prop_assert_eq!(qubit.kind, QubitKind::Data);
                let distance = qubit.row.abs_diff(ancilla.row) + qubit.col.abs_diff(ancilla.col);
                prop_assert_eq!(distance, 1);
            }
        }
    }

    /// The logical support has d entries, one per even row, all at column 0.
    #[test]
    fn prop_logical_support_is_left_column(d in 2usize..=12) {
        let patch = SurfaceCodePatch::new(d).unwrap();
        let support = patch.logical_support();
        prop_assert_eq!(support.len(), d);
        prop_assert_eq!(patch.l().row_support(0), support.to_vec());

        let rows: Vec<usize> = support
            .iter()
            .map(|&q| patch.lattice().qubit(q).unwrap())
            .inspect(|q| assert_eq!(q.col, 0))
            .map(|q| q.row)
            .collect();
        prop_assert_eq!(rows, (0..d).map(|k| 2 * k).collect::<Vec<_>>());
    }
}
