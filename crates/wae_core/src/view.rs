//! Client-facing projection of a round.
//!
//! A view is a plain, serializable copy of what a player may see. Raw error
//! placement is hidden until the round is revealed or the syndrome clears.

use serde::Serialize;

/// One data qubit as presented to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataQubitView {
    pub index: usize,
    pub row: usize,
    pub col: usize,

    /// Current error, only set when the view is revealed.
    pub error: bool,

    /// Current error, always set.
    pub actual_error: bool,

    /// Error placed by the last injection.
    pub initial_error: bool,

    /// Whether an odd number of corrections targeted this qubit.
    pub flipped: bool,
}

/// One X ancilla as presented to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AncillaView {
    pub index: usize,
    pub row: usize,
    pub col: usize,

    /// Syndrome bit of this ancilla's stabilizer.
    pub excited: bool,
}

/// Snapshot of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateView {
    pub distance: usize,
    pub qubits: Vec<DataQubitView>,
    pub stabilizers: Vec<AncillaView>,
    pub zero_syndrome: bool,

    /// Outcome of the round, present once a correction cleared the syndrome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_error: Option<bool>,
}

impl GameStateView {
    /// Number of excited stabilizers.
    pub fn excited_count(&self) -> usize {
        self.stabilizers.iter().filter(|s| s.excited).count()
    }

    /// Whether any data qubit carries an error, revealed or not.
    pub fn has_actual_error(&self) -> bool {
        self.qubits.iter().any(|q| q.actual_error)
    }

    pub fn qubit(&self, index: usize) -> Option<&DataQubitView> {
        self.qubits.get(index)
    }
}
