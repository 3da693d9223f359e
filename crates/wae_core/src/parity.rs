//! Dense binary matrices over GF(2).
//!
//! Rows are stored as packed bit vectors. The only product the engine needs
//! is matrix times vector mod 2, which for each row is the parity of the
//! vector restricted to that row's ones.

use bitvec::prelude::*;

/// Packed bit vector used for every per-qubit and per-check vector.
pub type Bits = BitVec<u64, Lsb0>;

/// Row-major binary matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMatrix {
    n_cols: usize,
    rows: Vec<Bits>,
}

impl BinaryMatrix {
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_cols,
            rows: vec![bitvec![u64, Lsb0; 0; n_cols]; n_rows],
        }
    }

    /// Builds a matrix with a one at every column listed in each row's support.
    ///
    /// Panics if a support references a column outside `0..n_cols`; supports
    /// come from the lattice, so that would be a construction bug.
    pub fn from_supports(n_cols: usize, supports: &[Vec<usize>]) -> Self {
        let mut matrix = Self::zeros(supports.len(), n_cols);
        for (row, support) in matrix.rows.iter_mut().zip(supports) {
            for &col in support {
                row.set(col, true);
            }
        }
        matrix
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn row(&self, row_ix: usize) -> &BitSlice<u64, Lsb0> {
        &self.rows[row_ix]
    }

    pub fn get(&self, row_ix: usize, col_ix: usize) -> bool {
        self.rows[row_ix][col_ix]
    }

    /// Number of ones in a row.
    pub fn row_weight(&self, row_ix: usize) -> usize {
        self.rows[row_ix].count_ones()
    }

    /// Column indices of the ones in a row, ascending.
    pub fn row_support(&self, row_ix: usize) -> Vec<usize> {
        self.rows[row_ix].iter_ones().collect()
    }

    /// Parity of `v` restricted to the ones of a row.
    pub fn row_parity(&self, row_ix: usize, v: &BitSlice<u64, Lsb0>) -> bool {
        self.rows[row_ix].iter_ones().filter(|&col| v[col]).count() % 2 == 1
    }

    /// `(self @ v) mod 2`.
    pub fn mul_vec(&self, v: &BitSlice<u64, Lsb0>) -> Bits {
        debug_assert_eq!(v.len(), self.n_cols);
        (0..self.n_rows())
            .map(|row_ix| self.row_parity(row_ix, v))
            .collect()
    }

    /// Writes `(self @ v) mod 2` into `out`, which must have `n_rows` bits.
    pub fn mul_vec_into(&self, v: &BitSlice<u64, Lsb0>, out: &mut BitSlice<u64, Lsb0>) {
        debug_assert_eq!(out.len(), self.n_rows());
        for row_ix in 0..self.n_rows() {
            out.set(row_ix, self.row_parity(row_ix, v));
        }
    }
}
