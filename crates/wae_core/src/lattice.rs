//! Lattice construction for distance-`d` surface-code patches.
//!
//! Qubits live on a doubled integer grid of `(2d-1) x (2d-1)` sites so that
//! every stabilizer touches its data qubits at unit distance along an axis.
//! Data qubits fill the brick pattern (even rows at even columns, odd rows at
//! odd columns) and X ancillas sit on even rows at odd columns. Qubits are
//! stored as flat arrays indexed by a dense id, with a coordinate table built
//! once so that neighbour queries are constant-time lookups.

use serde::Serialize;
use std::collections::HashMap;

/// Role of a qubit in the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QubitKind {
    /// Physical qubit carrying the encoded state; errors land here.
    Data,

    /// Measurement qubit of an X-type stabilizer.
    XAncilla,
}

/// A qubit placed on the doubled grid.
///
/// `index` is dense and unique within a patch: data qubits come first in
/// row-major order, then the ancillas in row-major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Qubit {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub kind: QubitKind,
}

impl Qubit {
    pub fn coordinate(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

/// Axis-aligned unit step on the doubled grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Coordinate one step away from `(row, col)`, or `None` past the grid's
    /// top or left edge.
    pub fn step(self, row: usize, col: usize) -> Option<(usize, usize)> {
        match self {
            Direction::North => Some((row.checked_sub(1)?, col)),
            Direction::East => Some((row, col + 1)),
            Direction::South => Some((row + 1, col)),
            Direction::West => Some((row, col.checked_sub(1)?)),
        }
    }
}

/// Geometric layout of a distance-`d` patch.
#[derive(Debug, Clone)]
pub struct Lattice {
    distance: usize,
    data: Vec<Qubit>,
    ancillas: Vec<Qubit>,
    by_coordinate: HashMap<(usize, usize), usize>,
}

impl Lattice {
    /// Builds the lattice for distance `d`.
    ///
    /// Has no error conditions; distances below two produce a degenerate
    /// lattice and must be rejected by the caller (see
    /// [`SurfaceCodePatch::new`](crate::patch::SurfaceCodePatch::new)).
    pub fn build(d: usize) -> Self {
        let extent = (2 * d).saturating_sub(1);

        let mut data = Vec::with_capacity(wae_common::limits::num_data_qubits(d));
        let mut next_index = 0;
        for row in 0..extent {
            for col in (row % 2..extent).step_by(2) {
                data.push(Qubit {
                    index: next_index,
                    row,
                    col,
                    kind: QubitKind::Data,
                });
                next_index += 1;
            }
        }

        let mut ancillas = Vec::with_capacity(wae_common::limits::num_checks(d));
        for row in (0..extent).step_by(2) {
            for col in (1..extent.saturating_sub(1)).step_by(2) {
                ancillas.push(Qubit {
                    index: next_index,
                    row,
                    col,
                    kind: QubitKind::XAncilla,
                });
                next_index += 1;
            }
        }

        let by_coordinate = data
            .iter()
            .chain(ancillas.iter())
            .map(|q| (q.coordinate(), q.index))
            .collect();

        Self {
            distance: d,
            data,
            ancillas,
            by_coordinate,
        }
    }

    pub fn distance(&self) -> usize {
        self.distance
    }

    /// Side length of the doubled grid, `2d - 1`.
    pub fn extent(&self) -> usize {
        (2 * self.distance).saturating_sub(1)
    }

    pub fn data_qubits(&self) -> &[Qubit] {
        &self.data
    }

    pub fn ancilla_qubits(&self) -> &[Qubit] {
        &self.ancillas
    }

    pub fn num_data_qubits(&self) -> usize {
        self.data.len()
    }

    pub fn num_ancillas(&self) -> usize {
        self.ancillas.len()
    }

    /// All qubits in index order.
    pub fn qubits(&self) -> impl Iterator<Item = &Qubit> {
        self.data.iter().chain(self.ancillas.iter())
    }

    /// Looks a qubit up by its dense index.
    pub fn qubit(&self, index: usize) -> Option<&Qubit> {
        if index < self.data.len() {
            self.data.get(index)
        } else {
            self.ancillas.get(index - self.data.len())
        }
    }

    /// Looks a qubit up by its doubled-grid coordinate.
    pub fn qubit_at(&self, row: usize, col: usize) -> Option<&Qubit> {
        self.by_coordinate
            .get(&(row, col))
            .and_then(|&index| self.qubit(index))
    }

    /// Qubit one step from `qubit` in `direction`, if that site is occupied.
    pub fn neighbor(&self, qubit: &Qubit, direction: Direction) -> Option<&Qubit> {
        let (row, col) = direction.step(qubit.row, qubit.col)?;
        self.qubit_at(row, col)
    }

    /// Occupied sites adjacent to `qubit`, in N, E, S, W order.
    pub fn neighbors<'a>(&'a self, qubit: &'a Qubit) -> impl Iterator<Item = &'a Qubit> + 'a {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.neighbor(qubit, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn distance_three_layout() {
        let lattice = Lattice::build(3);
        assert_eq!(lattice.num_data_qubits(), 13);
        assert_eq!(lattice.num_ancillas(), 6);
        assert_eq!(lattice.extent(), 5);

        // First row: data at even columns, then the second row starts at column 1.
        let coords: Vec<_> = lattice.data_qubits()[..5]
            .iter()
            .map(Qubit::coordinate)
            .collect();
        assert_eq!(coords, vec![(0, 0), (0, 2), (0, 4), (1, 1), (1, 3)]);

        let first_ancilla = lattice.ancilla_qubits()[0];
        assert_eq!(first_ancilla.index, 13);
        assert_eq!(first_ancilla.coordinate(), (0, 1));
        assert_eq!(first_ancilla.kind, QubitKind::XAncilla);
    }

    #[test]
    fn indices_are_dense_and_coordinates_unique() {
        for d in 2..=7 {
            let lattice = Lattice::build(d);
            let indices: Vec<usize> = lattice.qubits().map(|q| q.index).collect();
            assert_eq!(indices, (0..indices.len()).collect::<Vec<_>>());

            let coords: HashSet<_> = lattice.qubits().map(Qubit::coordinate).collect();
            assert_eq!(coords.len(), indices.len());
        }
    }

    #[test]
    fn lookup_by_index_and_coordinate_agree() {
        let lattice = Lattice::build(4);
        for q in lattice.qubits() {
            assert_eq!(lattice.qubit(q.index), Some(q));
            assert_eq!(lattice.qubit_at(q.row, q.col), Some(q));
        }
        assert!(lattice.qubit(lattice.num_data_qubits() + lattice.num_ancillas()).is_none());
        assert!(lattice.qubit_at(1, 0).is_none());
    }

    #[test]
    fn top_row_ancilla_has_no_north_neighbor() {
        let lattice = Lattice::build(3);
        let corner = lattice.qubit_at(0, 1).copied().unwrap();
        let neighbors: Vec<usize> = lattice.neighbors(&corner).map(|q| q.index).collect();
        // East (0,2), South (1,1), West (0,0).
        assert_eq!(neighbors, vec![1, 3, 0]);
        assert!(lattice.neighbor(&corner, Direction::North).is_none());
    }

    #[test]
    fn degenerate_distances_do_not_panic() {
        let one = Lattice::build(1);
        assert_eq!(one.num_data_qubits(), 1);
        assert_eq!(one.num_ancillas(), 0);

        let zero = Lattice::build(0);
        assert_eq!(zero.num_data_qubits(), 0);
        assert_eq!(zero.num_ancillas(), 0);
    }
}
