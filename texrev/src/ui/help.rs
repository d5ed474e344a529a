//! Help overlay renderer for texrev.
//!
//! Draws a centred modal over the diff. `Clear` erases the area first, so the
//! overlay needs no second draw call.

use ratatui::{
    Frame,
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the keybinding reference, scrolled by `help_scroll` rows.
///
/// Skipped below 60 columns, where the centred area would collapse.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));

    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help: j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.title));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  Ctrl-f / b    Scroll full page down / up"),
        Line::from("  mouse wheel   Scroll three lines"),
        Line::from(""),
        Line::from("View"),
        Line::from("  Tab / v       Switch between split and unified view"),
        Line::from("  A             Switch between positional and LCS alignment"),
        Line::from(""),
        Line::from("Review"),
        Line::from("  a             Accept: write the suggestion to the file"),
        Line::from("  r             Reject: discard the suggestion"),
        Line::from(""),
        Line::from("Rows"),
        Line::from("  +             Only in the suggestion"),
        Line::from("  -             Only in the current document"),
        Line::from("  ~             Present in both, text differs"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q / Esc       Quit (confirms while a suggestion is pending)"),
    ])
}
