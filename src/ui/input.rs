/// Keyboard commands for the watch screen.
///
/// The simulation takes no player input; keys only control playback.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEventKind, KeyModifiers};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Quit,
    TogglePause,
    /// Advance one tick while paused.
    Step,
}

/// Drain all pending terminal events without blocking.
pub fn drain_commands() -> Vec<Command> {
    let mut out = vec![];

    while poll(Duration::ZERO).unwrap_or(false) {
        let Ok(Event::Key(key)) = event::read() else { continue };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        let cmd = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
            KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('p') | KeyCode::Char(' ') => Command::TogglePause,
            KeyCode::Char('n') | KeyCode::Right => Command::Step,
            _ => continue,
        };
        out.push(cmd);
    }

    out
}
