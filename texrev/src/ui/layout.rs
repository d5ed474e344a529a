//! Screen layout for texrev.
//!
//! Pure layout arithmetic, recomputed inside every `terminal.draw()` so the
//! frame always reflects the current terminal size.
//!
//! ```text
//! ┌ header: prompt, statistics ──────────────┐
//! │ diff panels (one or two columns)         │
//! └ status bar ──────────────────────────────┘
//! ```
//!
//! The two split-view columns use `Spacing::Overlap(1)` together with
//! `MergeStrategy::Fuzzy` so their shared border collapses into one column.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use texrev_core::diff::compute_statistics;
use texrev_core::types::DiffLine;

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Returns `[header, main, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 3] {
    frame.area().layout(&Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ]))
}

/// Splits the main area into the left and right split-view columns.
pub fn split_columns(main: Rect) -> [Rect; 2] {
    main.layout(
        &Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(Spacing::Overlap(1)),
    )
}

/// Area inside a panel's 1-cell border.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

pub fn panel_block<'a>(title: &'a str, theme: &'a Theme) -> Block<'a> {
    Block::bordered()
        .title(Span::styled(title, Style::default().fg(theme.title)))
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border))
        .merge_borders(MergeStrategy::Fuzzy)
}

/// One-row header: the suggestion's prompt and its statistics.
pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    diff: Option<&[DiffLine]>,
    theme: &Theme,
) {
    let line = match (state.session.pending(), diff.map(compute_statistics)) {
        (Some(suggestion), Some(stats)) => Line::from(vec![
            Span::styled(
                format!(" {} ", suggestion.prompt),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(format!("+{} additions", stats.added), Style::default().fg(theme.diff_added)),
            Span::raw("  "),
            Span::styled(format!("-{} deletions", stats.removed), Style::default().fg(theme.diff_removed)),
            Span::raw("  "),
            Span::styled(
                format!("~{} modifications", stats.modified),
                Style::default().fg(theme.diff_modified),
            ),
            Span::raw(if stats.is_identical() { "  (no changes)" } else { "" }),
        ]),
        _ => Line::from(Span::styled(
            format!(" {}  (no pending suggestion)", state.document.path()),
            Style::default().fg(theme.title),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// One-row status bar: mode, view, alignment, provider, and the last message.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Normal => (" NORMAL ", theme.status_mode_normal),
        Mode::HelpOverlay => (" HELP ", theme.status_mode_normal),
        Mode::ConfirmQuit => (" CONFIRM ", theme.status_mode_confirm),
    };

    let message = if state.mode == Mode::ConfirmQuit {
        "Suggestion still pending. Quit anyway? (y/n)".to_owned()
    } else {
        state.status_message.clone().unwrap_or_default()
    };

    let status_line = Line::from(vec![
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            " {} │ {} │ {} │ {}",
            state.view.label(),
            state.alignment.label(),
            state.provider_label,
            message
        )),
    ]);

    frame.render_widget(
        Paragraph::new(status_line)
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
