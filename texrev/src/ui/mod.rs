//! UI rendering for texrev.
//!
//! [`render`] is the single entry point called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`, the diff
//! panels in `diff_view.rs`, and syntax highlighting in `highlight.rs`.

mod layout;
pub mod diff_view;
pub mod help;
pub mod highlight;
pub mod keybindings;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_header, render_status_bar};

/// Renders one complete frame: header, diff panels, status bar, and the help
/// overlay when it is open.
///
/// The diff is computed once here and shared by the header and the panels.
/// The diff panel's inner height is cached in `state` for the next keypress's
/// page-scroll distance.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [header, main, status_bar] = compute_layout(frame);
    let diff = state.diff();

    state.viewport_height = inner_rect(main).height;
    state.scroll = state.scroll.min(state.rows_in(diff.as_deref()).saturating_sub(1));

    render_header(frame, header, state, diff.as_deref(), theme);
    diff_view::render_diff(frame, main, state, diff.as_deref(), theme);
    render_status_bar(frame, status_bar, state, theme);

    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
