//! Pending AI suggestion and its accept/reject transitions.
//!
//! At most one suggestion is pending at a time. A new proposal replaces the
//! previous one outright. The session never stores a diff: [`SuggestionSession::diff`]
//! recomputes from the document's current text on every call.

use tracing::{debug, info};

use crate::diff::compute_diff_with;
use crate::document::Document;
use crate::types::{Alignment, DiffLine};

/// A candidate replacement for the whole document plus the reason it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub suggested_text: String,
    pub prompt: String,
}

/// `Empty` until something is proposed; accept and reject both return to `Empty`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum SuggestionSession {
    #[default]
    Empty,
    Pending(Suggestion),
}

impl SuggestionSession {
    pub fn is_pending(&self) -> bool {
        matches!(self, SuggestionSession::Pending(_))
    }

    pub fn pending(&self) -> Option<&Suggestion> {
        match self {
            SuggestionSession::Pending(s) => Some(s),
            SuggestionSession::Empty => None,
        }
    }

    /// Makes `suggested_text` the pending suggestion.
    ///
    /// Returns the suggestion it displaced, if any.
    pub fn propose(
        &mut self,
        suggested_text: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Option<Suggestion> {
        let next = Suggestion { suggested_text: suggested_text.into(), prompt: prompt.into() };
        info!(prompt = %next.prompt, bytes = next.suggested_text.len(), "suggestion proposed");
        match std::mem::replace(self, SuggestionSession::Pending(next)) {
            SuggestionSession::Pending(previous) => {
                debug!(prompt = %previous.prompt, "pending suggestion replaced");
                Some(previous)
            }
            SuggestionSession::Empty => None,
        }
    }

    /// Writes the pending suggestion into `document` and clears the session.
    ///
    /// Returns the accepted suggestion, or `None` (document untouched) when
    /// nothing was pending.
    pub fn accept(&mut self, document: &mut Document) -> Option<Suggestion> {
        match std::mem::take(self) {
            SuggestionSession::Pending(suggestion) => {
                document.replace(suggestion.suggested_text.clone());
                info!(path = document.path(), revision = document.revision(), "suggestion accepted");
                Some(suggestion)
            }
            SuggestionSession::Empty => None,
        }
    }

    /// Discards the pending suggestion, if any.
    pub fn reject(&mut self) -> Option<Suggestion> {
        match std::mem::take(self) {
            SuggestionSession::Pending(suggestion) => {
                info!(prompt = %suggestion.prompt, "suggestion rejected");
                Some(suggestion)
            }
            SuggestionSession::Empty => None,
        }
    }

    /// Diff of the document's current text against the pending suggestion.
    pub fn diff(&self, document: &Document, alignment: Alignment) -> Option<Vec<DiffLine>> {
        self.pending()
            .map(|s| compute_diff_with(document.text(), &s.suggested_text, alignment))
    }
}
