//! Plain-text reports for the statistics commands.

use std::collections::BTreeMap;
use std::io::{self, Write};
use wae_common::limits::num_data_qubits;
use wae_io::stats::{AgeGroupCurve, ErrorRateCurve, Highscore};

fn write_curve<W: Write>(out: &mut W, title: &str, curve: &ErrorRateCurve) -> io::Result<()> {
    writeln!(out, "\n{title}")?;
    if curve.is_empty() {
        writeln!(out, "  (no levels)")?;
        return Ok(());
    }
    writeln!(out, "{:>10}  {:>10}", "physical", "logical")?;
    for (p, l) in curve
        .physical_error_rates
        .iter()
        .zip(&curve.logical_error_rates)
    {
        writeln!(out, "{p:>10.4}  {l:>10.4}")?;
    }
    Ok(())
}

pub fn write_distances<W: Write>(
    out: &mut W,
    curves: &BTreeMap<usize, ErrorRateCurve>,
) -> io::Result<()> {
    if curves.is_empty() {
        return writeln!(out, "No games recorded.");
    }
    writeln!(out, "Logical error rate by distance")?;
    for (d, curve) in curves {
        let title = format!("d = {d} ({} data qubits)", num_data_qubits(*d));
        write_curve(out, &title, curve)?;
    }
    Ok(())
}

pub fn write_age_groups<W: Write>(out: &mut W, groups: &[AgeGroupCurve]) -> io::Result<()> {
    if groups.is_empty() {
        return writeln!(out, "No games recorded.");
    }
    writeln!(out, "Logical error rate by age")?;
    for group in groups {
        write_curve(out, &format!("age {}", group.label), &group.curve)?;
    }
    Ok(())
}

pub fn write_highscores<W: Write>(
    out: &mut W,
    scores: &BTreeMap<usize, Highscore>,
) -> io::Result<()> {
    if scores.is_empty() {
        return writeln!(out, "No games recorded.");
    }
    writeln!(out, "{:>4}  {:>5}  name", "d", "level")?;
    for (d, score) in scores {
        let name = if score.name.is_empty() { "-" } else { score.name.as_str() };
        writeln!(out, "{d:>4}  {:>5}  {name}", score.level)?;
    }
    Ok(())
}
