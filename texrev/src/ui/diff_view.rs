//! Diff panel renderer for texrev.
//!
//! The diff arrives computed once per frame from [`super::render`]; only the rows inside
//! `scroll..scroll + viewport` are turned into `ListItem`s and highlighted, so
//! drawing cost follows the panel height rather than the document length.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};
use texrev_core::diff::{render_split_rows, render_unified_view, word_changes};
use texrev_core::types::{DiffLine, DiffLineKind, SplitRow, ViewRow};

use crate::app::{AppState, View};
use crate::theme::Theme;
use crate::ui::highlight::Highlighter;
use crate::ui::layout::{inner_rect, panel_block, split_columns};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Original,
    Suggested,
}

/// Renders the diff in the current view, or the plain document when nothing
/// is pending.
pub fn render_diff(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    diff: Option<&[DiffLine]>,
    theme: &Theme,
) {
    match diff {
        None => render_document(frame, area, state, theme),
        Some(diff) => match state.view {
            View::Split => render_split(frame, area, state, theme, diff),
            View::Unified => render_unified(frame, area, state, theme, diff),
        },
    }
}

fn render_split(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme, diff: &[DiffLine]) {
    let [left_area, right_area] = split_columns(area);
    let width = gutter_width(diff.len());
    let rows = render_split_rows(diff);
    let window = visible(&rows, state.scroll, inner_rect(left_area).height as usize);

    for (column_area, title, side) in [
        (left_area, "Current Code", Side::Original),
        (right_area, "Suggested Code", Side::Suggested),
    ] {
        let inner = inner_rect(column_area);
        frame.render_widget(panel_block(title, theme), column_area);

        let mut hl = Highlighter::latex(theme.syntax_theme);
        let items: Vec<ListItem> = window
            .iter()
            .map(|row| match split_cell(row, side) {
                // The other side has this row; keep the columns level.
                None => ListItem::new(Line::default()),
                Some(cell) => {
                    let body = match cell.kind {
                        DiffLineKind::Modified => emphasis_spans(line_at(diff, cell.line_number), side, theme),
                        _ => hl.line(&cell.text),
                    };
                    ListItem::new(styled_row(cell.kind, kind_marker(cell.kind), cell.line_number, width, body, theme))
                }
            })
            .collect();
        frame.render_widget(List::new(items), inner);
    }
}

fn split_cell(row: &SplitRow, side: Side) -> Option<&ViewRow> {
    match side {
        Side::Original => row.original.as_ref(),
        Side::Suggested => row.suggested.as_ref(),
    }
}

fn render_unified(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme, diff: &[DiffLine]) {
    let inner = inner_rect(area);
    frame.render_widget(panel_block("Changes", theme), area);

    let rows = render_unified_view(diff);
    let width = gutter_width(diff.len());
    let mut hl = Highlighter::latex(theme.syntax_theme);

    let items: Vec<ListItem> = visible(&rows, state.scroll, inner.height as usize)
        .iter()
        .map(|row| {
            let marker = row.origin.marker();
            let body = match row.kind {
                DiffLineKind::Modified => {
                    let side = if marker == '-' { Side::Original } else { Side::Suggested };
                    emphasis_spans(line_at(diff, row.line_number), side, theme)
                }
                _ => hl.line(&row.text),
            };
            // A modified row's halves read as a removal and an addition.
            let kind = match (row.kind, marker) {
                (DiffLineKind::Modified, '-') => DiffLineKind::Removed,
                (DiffLineKind::Modified, _) => DiffLineKind::Added,
                (kind, _) => kind,
            };
            ListItem::new(styled_row(kind, marker, row.line_number, width, body, theme))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

fn render_document(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let inner = inner_rect(area);
    frame.render_widget(panel_block(state.document.path(), theme), area);

    let lines = state.document.lines();
    let width = gutter_width(lines.len());
    let mut hl = Highlighter::latex(theme.syntax_theme);
    let start = state.scroll.min(lines.len());

    let items: Vec<ListItem> = visible(&lines, state.scroll, inner.height as usize)
        .iter()
        .enumerate()
        .map(|(i, text)| {
            ListItem::new(styled_row(
                DiffLineKind::Unchanged,
                ' ',
                start + i + 1,
                width,
                hl.line(text),
                theme,
            ))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

/// The window of `rows` starting at `scroll`, at most `height` long.
fn visible<T>(rows: &[T], scroll: usize, height: usize) -> &[T] {
    let start = scroll.min(rows.len());
    let end = start.saturating_add(height).min(rows.len());
    &rows[start..end]
}

fn gutter_width(rows: usize) -> usize {
    rows.max(1).to_string().len()
}

fn line_at(diff: &[DiffLine], line_number: usize) -> Option<&DiffLine> {
    line_number.checked_sub(1).and_then(|i| diff.get(i))
}

fn kind_marker(kind: DiffLineKind) -> char {
    match kind {
        DiffLineKind::Unchanged => ' ',
        DiffLineKind::Added => '+',
        DiffLineKind::Removed => '-',
        DiffLineKind::Modified => '~',
    }
}

fn kind_colors(kind: DiffLineKind, theme: &Theme) -> (Color, Color) {
    match kind {
        DiffLineKind::Unchanged => (theme.line_number, Color::Reset),
        DiffLineKind::Added => (theme.diff_added, theme.diff_added_bg),
        DiffLineKind::Removed => (theme.diff_removed, theme.diff_removed_bg),
        DiffLineKind::Modified => (theme.diff_modified, theme.diff_modified_bg),
    }
}

/// `marker number │ body`, tinted by row kind.
fn styled_row(
    kind: DiffLineKind,
    marker: char,
    line_number: usize,
    width: usize,
    body: Vec<Span<'static>>,
    theme: &Theme,
) -> Line<'static> {
    let (fg, bg) = kind_colors(kind, theme);
    let mut spans = Vec::with_capacity(body.len() + 2);
    spans.push(Span::styled(format!("{marker} "), Style::default().fg(fg).add_modifier(Modifier::BOLD)));
    spans.push(Span::styled(format!("{line_number:>width$} │ "), Style::default().fg(theme.line_number)));
    spans.extend(body);
    Line::from(spans).style(Style::default().bg(bg))
}

/// Word-level spans for one half of a modified row; changed words are bold.
fn emphasis_spans(line: Option<&DiffLine>, side: Side, theme: &Theme) -> Vec<Span<'static>> {
    let Some(line) = line else {
        return Vec::new();
    };
    let (old, new) = word_changes(
        line.original_text.as_deref().unwrap_or_default(),
        line.suggested_text.as_deref().unwrap_or_default(),
    );
    let (segments, color) = match side {
        Side::Original => (old, theme.diff_removed),
        Side::Suggested => (new, theme.diff_added),
    };
    segments
        .into_iter()
        .map(|segment| {
            let style = if segment.emphasized {
                Style::default().fg(color).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.diff_unchanged)
            };
            Span::styled(segment.text, style)
        })
        .collect()
}
