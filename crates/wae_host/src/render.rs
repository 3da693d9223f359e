//! ASCII board.
//!
//! Data qubits are drawn by index, `[i]` once flipped by the player and
//! `<i>` when a revealed error sits on them. Ancillas are `*` when their
//! stabilizer is excited and `.` otherwise.

use wae_core::GameStateView;
use wae_core::view::DataQubitView;

pub fn render_board(view: &GameStateView) -> String {
    let extent = (2 * view.distance).saturating_sub(1);
    let width = view.qubits.len().saturating_sub(1).to_string().len() + 2;

    let mut grid = vec![vec![String::new(); extent]; extent];
    for q in &view.qubits {
        if let Some(cell) = grid.get_mut(q.row).and_then(|row| row.get_mut(q.col)) {
            *cell = data_cell(q);
        }
    }
    for s in &view.stabilizers {
        if let Some(cell) = grid.get_mut(s.row).and_then(|row| row.get_mut(s.col)) {
            *cell = if s.excited { "*" } else { "." }.to_string();
        }
    }

    grid.iter()
        .map(|row| {
            let line: String = row.iter().map(|cell| format!("{cell:^width$}")).collect();
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn data_cell(q: &DataQubitView) -> String {
    if q.error {
        format!("<{}>", q.index)
    } else if q.flipped {
        format!("[{}]", q.index)
    } else {
        q.index.to_string()
    }
}

pub fn status_line(view: &GameStateView) -> String {
    format!(
        "{} of {} stabilizers excited",
        view.excited_count(),
        view.stabilizers.len()
    )
}
