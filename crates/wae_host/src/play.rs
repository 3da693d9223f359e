//! Terminal game loop.
//!
//! Reads one command per line: a data-qubit index flips that qubit, `q`
//! quits. Anything else is rejected and the prompt repeats. The loop is
//! generic over its reader and writer so tests can script a whole game.

use anyhow::Result;
use std::io::{BufRead, Write};
use tracing::debug;
use wae_core::progress::{GameOver, GameProgress, ProgressEvent, RoundOutcome};
use wae_core::{EngineError, GameSession, GameStateView};

use crate::render::{render_board, status_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Flip(usize),
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "q" | "quit" => Some(Command::Quit),
        s => s.parse().ok().map(Command::Flip),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    Decided(RoundOutcome),
    Quit,
}

/// Outcome of a round whose syndrome is zero.
fn decide(view: &GameStateView) -> RoundOutcome {
    match view.logical_error {
        Some(true) => RoundOutcome::LogicalError,
        _ if !view.has_actual_error() && !view.qubits.iter().any(|q| q.flipped) => {
            RoundOutcome::Trivial
        }
        _ => RoundOutcome::Success,
    }
}

fn play_round<R: BufRead, W: Write>(
    session: &GameSession<'_>,
    mut view: GameStateView,
    input: &mut R,
    out: &mut W,
) -> Result<RoundEnd> {
    if view.zero_syndrome {
        let outcome = decide(&view);
        if outcome == RoundOutcome::Trivial {
            writeln!(out, "No errors this time.")?;
        } else {
            writeln!(out, "{}", render_board(&session.state(true)))?;
        }
        return Ok(RoundEnd::Decided(outcome));
    }

    loop {
        writeln!(out, "\n{}", render_board(&view))?;
        writeln!(out, "{}", status_line(&view))?;
        write!(out, "flip> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(RoundEnd::Quit);
        }
        let index = match parse_command(&line) {
            Some(Command::Quit) => return Ok(RoundEnd::Quit),
            Some(Command::Flip(index)) => index,
            None => {
                writeln!(out, "Enter a qubit index or q.")?;
                continue;
            }
        };

        view = match session.flip_qubit(index) {
            Ok(view) => view,
            Err(e @ EngineError::QubitOutOfBounds { .. }) => {
                writeln!(out, "{e}")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        debug!(index, excited = view.excited_count(), "player flip");

        if view.zero_syndrome {
            writeln!(out, "\n{}", render_board(&view))?;
            return Ok(RoundEnd::Decided(decide(&view)));
        }
    }
}

/// Plays levels until the game ends or the player quits.
///
/// Returns whether the game reached its end, in which case `progress` holds
/// the result to store.
pub fn run_game<R: BufRead, W: Write>(
    session: &GameSession<'_>,
    progress: &mut GameProgress,
    input: &mut R,
    out: &mut W,
) -> Result<bool> {
    writeln!(
        out,
        "Distance {}: {} levels of {} rounds. Clear every excited stabilizer (*).",
        progress.distance(),
        progress.max_level(),
        progress.rounds_per_level()
    )?;

    loop {
        writeln!(
            out,
            "\nLevel {}/{}, round {}/{}",
            progress.level(),
            progress.max_level(),
            progress.round(),
            progress.rounds_per_level()
        )?;
        let view = session.new_round(Some(progress.distance()), progress.errors_for_level())?;
        let outcome = match play_round(session, view, input, out)? {
            RoundEnd::Quit => {
                writeln!(out, "Game abandoned.")?;
                return Ok(false);
            }
            RoundEnd::Decided(outcome) => outcome,
        };
        if outcome == RoundOutcome::Success {
            writeln!(out, "Cleared without a logical error.")?;
        }

        match progress.record_round(outcome) {
            ProgressEvent::NextRound { .. } => {}
            ProgressEvent::LevelComplete { completed, next } => {
                writeln!(
                    out,
                    "Level {completed} complete. Level {next} injects {next} errors on average."
                )?;
            }
            ProgressEvent::Finished(GameOver::LogicalError) => {
                writeln!(
                    out,
                    "Logical error! The remaining errors span the patch. Game over on level {}.",
                    progress.level()
                )?;
                return Ok(true);
            }
            ProgressEvent::Finished(GameOver::AllLevelsComplete) => {
                writeln!(out, "Every level complete!")?;
                return Ok(true);
            }
        }
    }
}

/// Plays free rounds at a fixed error count until the player quits.
pub fn run_playground<R: BufRead, W: Write>(
    session: &GameSession<'_>,
    num_errors: usize,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let mut rounds = 0u32;
    let mut logical_errors = 0u32;
    loop {
        let view = session.new_round(None, num_errors)?;
        match play_round(session, view, input, out)? {
            RoundEnd::Quit => break,
            RoundEnd::Decided(RoundOutcome::LogicalError) => {
                logical_errors += 1;
                writeln!(out, "Logical error.")?;
            }
            RoundEnd::Decided(_) => writeln!(out, "Cleared.")?,
        }
        rounds += 1;
    }
    writeln!(out, "{rounds} rounds, {logical_errors} logical errors.")?;
    Ok(())
}
