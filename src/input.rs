//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`].
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_key_event`] that calls it.
//! 3. Update the help text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Returns text the user submitted from the input line, which the caller
/// scans for repository links.  Only key-press events count, so each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<String> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if let Some(text) = app.input.as_mut() {
        match key.code {
            KeyCode::Enter => return app.take_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                text.pop();
            }
            KeyCode::Char(c) => text.push(c),
            _ => {}
        }
        return None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('a') => app.begin_input(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(handle_key_event(app, press(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn q_quits() {
        let mut app = App::new();
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.quit);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = App::new();
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.quit);
    }

    #[test]
    fn typed_link_is_submitted_on_enter() {
        let mut app = App::new();
        handle_key_event(&mut app, press(KeyCode::Char('a')));
        type_text(&mut app, "http://github.com/tene/gilx");
        handle_key_event(&mut app, press(KeyCode::Backspace));

        // Letters that are keybindings outside input mode are just text here.
        assert!(!app.quit);
        let submitted = handle_key_event(&mut app, press(KeyCode::Enter));
        assert_eq!(submitted.as_deref(), Some("http://github.com/tene/gil"));
        assert!(app.input.is_none());
    }

    #[test]
    fn esc_cancels_input_without_quitting() {
        let mut app = App::new();
        handle_key_event(&mut app, press(KeyCode::Char('a')));
        type_text(&mut app, "abc");
        assert!(handle_key_event(&mut app, press(KeyCode::Esc)).is_none());
        assert!(app.input.is_none());
        assert!(!app.quit);
    }
}
