//! Central application state for texrev.
//!
//! Owns the document under review, the suggestion session, the view settings,
//! and scroll geometry. No ratatui rendering lives here; the render module reads
//! this state and the keybinding dispatcher mutates it. The diff itself is never
//! stored: [`AppState::diff`] recomputes it from the document and the pending
//! suggestion whenever it is asked for.

use std::time::SystemTime;

use clap::ValueEnum;
use serde::Deserialize;
use texrev_core::diff::{compute_statistics, render_unified_view};
use texrev_core::document::Document;
use texrev_core::session::{Suggestion, SuggestionSession};
use texrev_core::types::{Alignment, DiffLine, DiffStatistics};

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Full-screen help overlay is shown above the diff.
    HelpOverlay,
    /// Quitting would leave a suggestion unresolved; waiting for y/n.
    ConfirmQuit,
}

/// Diff layout.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Current and suggested text side by side.
    #[default]
    Split,
    /// One column of context, removal, and addition rows.
    Unified,
}

impl View {
    pub fn toggle(self) -> Self {
        match self {
            View::Split => View::Unified,
            View::Unified => View::Split,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Split => "split",
            View::Unified => "unified",
        }
    }
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub view: View,
    pub alignment: Alignment,

    /// Authoritative text of the file under review.
    pub document: Document,
    pub session: SuggestionSession,

    /// Database id of the reviewed document, when the store is available.
    pub document_id: Option<String>,
    /// Database id of the pending suggestion.
    pub suggestion_id: Option<String>,
    /// Modification time of the file when it was last read or written.
    pub last_modified: Option<SystemTime>,

    /// First visible row of the diff.
    pub scroll: usize,
    /// Inner height of the diff panel, cached after each render.
    pub viewport_height: u16,
    pub help_scroll: u16,

    /// Provider shown in the status bar, e.g. `Ollama (llama2)`.
    pub provider_label: String,
    /// One-shot message for the status bar; replaced by the next message.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(document: Document, view: View, alignment: Alignment) -> Self {
        Self {
            mode: Mode::default(),
            view,
            alignment,
            document,
            session: SuggestionSession::default(),
            document_id: None,
            suggestion_id: None,
            last_modified: None,
            scroll: 0,
            viewport_height: 0,
            help_scroll: 0,
            provider_label: "no provider".to_owned(),
            status_message: None,
        }
    }

    /// Diff of the current document against the pending suggestion.
    pub fn diff(&self) -> Option<Vec<DiffLine>> {
        self.session.diff(&self.document, self.alignment)
    }

    /// Rows the current view scrolls over.
    pub fn row_count(&self) -> usize {
        self.rows_in(self.diff().as_deref())
    }

    /// Rows the current view needs for an already computed `diff`.
    pub fn rows_in(&self, diff: Option<&[DiffLine]>) -> usize {
        match diff {
            None => self.document.lines().len(),
            Some(diff) => match self.view {
                View::Split => diff.len(),
                View::Unified => render_unified_view(diff).len(),
            },
        }
    }

    fn max_scroll(&self) -> usize {
        self.row_count().saturating_sub(1)
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines as usize).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines as usize);
    }

    pub fn scroll_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    /// Scrolls by half the cached viewport height; by 1 before the first frame.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.viewport_height / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.viewport_height / 2).max(1));
    }

    pub fn full_page_down(&mut self) {
        self.scroll_down(self.viewport_height.max(1));
    }

    pub fn full_page_up(&mut self) {
        self.scroll_up(self.viewport_height.max(1));
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn toggle_alignment(&mut self) {
        self.alignment = self.alignment.toggle();
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Applies the pending suggestion to the in-memory document.
    ///
    /// Call only once the suggested text is safely on disk; `None` means there
    /// was nothing to accept.
    pub fn accept(&mut self) -> Option<Suggestion> {
        let accepted = self.session.accept(&mut self.document)?;
        self.scroll = 0;
        self.status_message = Some(format!("Accepted: {}", accepted.prompt));
        Some(accepted)
    }

    pub fn reject(&mut self) -> Option<Suggestion> {
        let rejected = self.session.reject()?;
        self.scroll = 0;
        self.status_message = Some(format!("Rejected: {}", rejected.prompt));
        Some(rejected)
    }

    /// Replaces the document with text re-read from disk.
    ///
    /// Returns `false` (and leaves the revision alone) when the text is the same.
    pub fn reload(&mut self, text: String) -> bool {
        if text == self.document.text() {
            return false;
        }
        self.document.replace(text);
        self.scroll = self.scroll.min(self.max_scroll());
        self.status_message = Some(format!("{} changed on disk, reloaded", self.document.path()));
        true
    }
}

/// `+A additions  -R deletions  ~M modifications`
pub fn stats_line(stats: &DiffStatistics) -> String {
    format!(
        "+{} additions  -{} deletions  ~{} modifications",
        stats.added, stats.removed, stats.modified
    )
}

/// Plain-text unified diff for `--print`.
///
/// One row per line: a `-`, `+`, or space marker, the right-aligned line
/// number, then the text. The statistics line comes last.
pub fn plain_report(prompt: &str, diff: &[DiffLine]) -> String {
    let rows = render_unified_view(diff);
    let width = diff.len().to_string().len();
    let mut out = format!("# {prompt}\n");
    for row in &rows {
        out.push_str(&format!(
            "{} {:>width$} {}\n",
            row.origin.marker(),
            row.line_number,
            row.text
        ));
    }
    out.push_str(&stats_line(&compute_statistics(diff)));
    out.push('\n');
    out
}
