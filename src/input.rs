//! Key bindings: WASD-style walking, vim keys, arrows for breaking.

use crate::breaker::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    WalkLeft,
    WalkRight,
    Jump,
    Break(Direction),
    Pause,
    Restart,
    Quit,
    None,
}

impl Action {
    /// Actions that stay active while their key is held.
    pub fn is_held(self) -> bool {
        matches!(self, Self::WalkLeft | Self::WalkRight | Self::Jump | Self::Break(_))
    }
}

/// Map key event to game action. Letters match either case.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    let code = match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    };
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Char('a') | KeyCode::Char('h') => Action::WalkLeft,
        KeyCode::Char('d') | KeyCode::Char('l') => Action::WalkRight,
        KeyCode::Char(' ') | KeyCode::Char('w') | KeyCode::Char('k') => Action::Jump,
        KeyCode::Left => Action::Break(Direction::Left),
        KeyCode::Right => Action::Break(Direction::Right),
        KeyCode::Up => Action::Break(Direction::Up),
        KeyCode::Down => Action::Break(Direction::Down),
        _ => Action::None,
    }
}
