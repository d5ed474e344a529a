//! LaTeX syntax highlighting via syntect.
//!
//! Only rows inside the viewport are highlighted, each column with a fresh
//! highlighter starting at the first visible row.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{FontStyle, ThemeSet};
use syntect::parsing::SyntaxSet;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_nonewlines);
static THEMES: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

/// Stateful highlighter for consecutive lines of one column.
pub struct Highlighter {
    inner: Option<HighlightLines<'static>>,
}

impl Highlighter {
    /// Falls back to plain spans if neither `theme_name` nor any bundled theme
    /// is available.
    pub fn latex(theme_name: &str) -> Self {
        let syntax = SYNTAXES
            .find_syntax_by_extension("tex")
            .unwrap_or_else(|| SYNTAXES.find_syntax_plain_text());
        let theme = THEMES
            .themes
            .get(theme_name)
            .or_else(|| THEMES.themes.values().next());
        Self { inner: theme.map(|t| HighlightLines::new(syntax, t)) }
    }

    /// Highlighted spans for `code`; a single raw span on any failure.
    pub fn line(&mut self, code: &str) -> Vec<Span<'static>> {
        let Some(h) = self.inner.as_mut() else {
            return vec![Span::raw(code.to_owned())];
        };
        let spans: Vec<Span<'static>> = h
            .highlight_line(code, &SYNTAXES)
            .unwrap_or_default()
            .into_iter()
            .map(|(style, text)| syntect_to_span(style, text))
            .collect();
        if spans.is_empty() {
            vec![Span::raw(code.to_owned())]
        } else {
            spans
        }
    }
}

/// Rebuilds a syntect style as an owned ratatui span. The background is left
/// unset so row tints show through.
fn syntect_to_span(style: syntect::highlighting::Style, content: &str) -> Span<'static> {
    let fg = style.foreground;
    let mut ratatui_style = Style::default();
    if fg.a > 0 {
        ratatui_style = ratatui_style.fg(Color::Rgb(fg.r, fg.g, fg.b));
    }
    if style.font_style.contains(FontStyle::BOLD) {
        ratatui_style = ratatui_style.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        ratatui_style = ratatui_style.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        ratatui_style = ratatui_style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(content.to_owned(), ratatui_style)
}
