//! Keybinding dispatcher for texrev.
//!
//! Translates crossterm key and mouse events into `AppState` mutations and
//! returns a `KeyAction` for the event loop. Accept leaves state alone and asks
//! the loop to write the file first; reject changes state at once and the loop
//! records it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{AppState, Mode};

/// What the event loop should do after a key or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    /// Write the pending suggestion to disk, then apply it.
    Accept,
    /// The pending suggestion was discarded; record that.
    Rejected,
    Quit,
}

/// Dispatches a key event to the handler for the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Normal => handle_normal(key, state),
    }
}

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Tab | KeyCode::Char('v') => {
            state.toggle_view();
            KeyAction::Continue
        }
        KeyCode::Char('A') => {
            state.toggle_alignment();
            KeyAction::Continue
        }
        KeyCode::Char('a') if state.session.is_pending() => KeyAction::Accept,
        KeyCode::Char('a') => {
            state.status_message = Some("Nothing to accept".to_owned());
            KeyAction::Continue
        }
        KeyCode::Char('r') => match state.reject() {
            Some(_) => KeyAction::Rejected,
            None => {
                state.status_message = Some("Nothing to reject".to_owned());
                KeyAction::Continue
            }
        },
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            if state.session.is_pending() {
                state.mode = Mode::ConfirmQuit;
                KeyAction::Continue
            } else {
                KeyAction::Quit
            }
        }
        _ => KeyAction::Continue,
    }
}

/// j / k / g / G and the Ctrl page keys. `None` lets the key fall through.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::Char('f') if ctrl => state.full_page_down(),
        KeyCode::PageDown => state.full_page_down(),
        KeyCode::Char('b') if ctrl => state.full_page_up(),
        KeyCode::PageUp => state.full_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` quits and leaves the suggestion pending; `n` or `Esc` goes back.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

/// Scroll wheel moves three rows, or scrolls the help overlay when it is open.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let help = state.mode == Mode::HelpOverlay;
    match mouse.kind {
        MouseEventKind::ScrollUp if help => state.help_scroll = state.help_scroll.saturating_sub(3),
        MouseEventKind::ScrollDown if help => state.help_scroll = state.help_scroll.saturating_add(3),
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use texrev_core::document::Document;
    use texrev_core::types::Alignment;

    use crate::app::View;

    fn press(state: &mut AppState, code: KeyCode) -> KeyAction {
        handle_key(KeyEvent::new(code, KeyModifiers::NONE), state)
    }

    fn reviewing() -> AppState {
        let mut state = AppState::new(Document::new("main.tex", "a\nb"), View::Split, Alignment::Positional);
        state.session.propose("a\nc", "fix");
        state
    }

    #[test]
    fn accept_defers_to_the_write() {
        let mut state = reviewing();
        assert_eq!(press(&mut state, KeyCode::Char('a')), KeyAction::Accept);
        assert_eq!(state.document.text(), "a\nb");
        assert!(state.session.is_pending());

        state.session.reject();
        assert_eq!(press(&mut state, KeyCode::Char('a')), KeyAction::Continue);
        assert_eq!(state.status_message.as_deref(), Some("Nothing to accept"));
    }

    #[test]
    fn reject_keeps_document() {
        let mut state = reviewing();
        assert_eq!(press(&mut state, KeyCode::Char('r')), KeyAction::Rejected);
        assert_eq!(state.document.text(), "a\nb");
    }

    #[test]
    fn quit_confirms_while_pending() {
        let mut state = reviewing();
        assert_eq!(press(&mut state, KeyCode::Char('q')), KeyAction::Continue);
        assert_eq!(state.mode, Mode::ConfirmQuit);
        assert_eq!(press(&mut state, KeyCode::Char('n')), KeyAction::Continue);
        assert_eq!(state.mode, Mode::Normal);
        press(&mut state, KeyCode::Char('q'));
        assert_eq!(press(&mut state, KeyCode::Char('y')), KeyAction::Quit);

        let mut state = reviewing();
        press(&mut state, KeyCode::Char('r'));
        assert_eq!(press(&mut state, KeyCode::Esc), KeyAction::Quit);
    }

    #[test]
    fn view_and_alignment_toggle() {
        let mut state = reviewing();
        press(&mut state, KeyCode::Tab);
        assert_eq!(state.view, View::Unified);
        press(&mut state, KeyCode::Char('v'));
        assert_eq!(state.view, View::Split);
        press(&mut state, KeyCode::Char('A'));
        assert_eq!(state.alignment, Alignment::Lcs);
    }

    #[test]
    fn help_swallows_review_keys() {
        let mut state = reviewing();
        press(&mut state, KeyCode::Char('?'));
        assert_eq!(state.mode, Mode::HelpOverlay);
        assert_eq!(press(&mut state, KeyCode::Char('a')), KeyAction::Continue);
        assert!(state.session.is_pending());
        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Normal);
    }
}
