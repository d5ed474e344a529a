use serde::{Deserialize, Serialize};

/// One aligned row of a line diff between the current document and a suggestion.
///
/// `original_text` is `None` only for `Added` rows and `suggested_text` is `None`
/// only for `Removed` rows. `line_number` is the 1-based row index of the
/// alignment, shared by both documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffLineKind,
    pub original_text: Option<String>,
    pub suggested_text: Option<String>,
    pub line_number: usize,
}

impl DiffLine {
    /// Text shown for this row on the suggested side.
    ///
    /// Unchanged rows carry the same text on both sides, so the original is used
    /// as a fallback; `Removed` rows have nothing to show and yield `None`.
    pub fn suggested_side(&self) -> Option<&str> {
        match self.kind {
            DiffLineKind::Removed => None,
            _ => self
                .suggested_text
                .as_deref()
                .or(self.original_text.as_deref()),
        }
    }

    /// Text shown for this row on the original side (`None` for `Added`).
    pub fn original_side(&self) -> Option<&str> {
        match self.kind {
            DiffLineKind::Added => None,
            _ => self.original_text.as_deref(),
        }
    }
}

/// Classification of a diff row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineKind {
    Unchanged,
    Added,
    Removed,
    Modified,
}

/// Aggregate counts over a diff.
///
/// The four kind counts always sum to `total`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStatistics {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub total: usize,
}

impl DiffStatistics {
    /// True when the diff contains no added, removed, or modified rows.
    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.modified == 0
    }
}

/// How rows of the two documents are paired up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// Row `i` of one document is compared with row `i` of the other.
    #[default]
    Positional,
    /// Rows are matched by longest common subsequence before classification.
    Lcs,
}

impl Alignment {
    pub fn label(self) -> &'static str {
        match self {
            Alignment::Positional => "positional",
            Alignment::Lcs => "lcs",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Alignment::Positional => Alignment::Lcs,
            Alignment::Lcs => Alignment::Positional,
        }
    }
}

/// A row of one column in the split (two-column) view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub kind: DiffLineKind,
    pub line_number: usize,
    pub text: String,
}

/// One screen row of the split view: the two columns side by side.
///
/// `None` is a blank cell, left for an `Added` row on the original side and a
/// `Removed` row on the suggested side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRow {
    pub original: Option<ViewRow>,
    pub suggested: Option<ViewRow>,
}

/// Marker for a row of the unified view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnifiedOrigin {
    /// `' '` — line present unchanged in both documents.
    Context,
    /// `'-'` — line only in the current document (or its old half of a modification).
    Removal,
    /// `'+'` — line only in the suggestion (or its new half of a modification).
    Addition,
}

impl UnifiedOrigin {
    pub fn marker(self) -> char {
        match self {
            UnifiedOrigin::Context => ' ',
            UnifiedOrigin::Removal => '-',
            UnifiedOrigin::Addition => '+',
        }
    }
}

/// A row of the unified (single-column) view.
///
/// `kind` is the classification of the source `DiffLine`, so both halves of a
/// modification keep `DiffLineKind::Modified` while `origin` tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedRow {
    pub origin: UnifiedOrigin,
    pub kind: DiffLineKind,
    pub line_number: usize,
    pub text: String,
}

/// A persisted document row from the `documents` table.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: String,           // UUID v4 text
    pub path: String,
    pub content: String,
    pub created_at: i64,      // Unix timestamp seconds
    pub updated_at: i64,      // Unix timestamp seconds
}

/// Lifecycle status of a stored suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl SuggestionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionStatus::Pending => "pending",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SuggestionStatus::Pending),
            "accepted" => Some(SuggestionStatus::Accepted),
            "rejected" => Some(SuggestionStatus::Rejected),
            _ => None,
        }
    }
}

/// A persisted suggestion row from the `suggestions` table.
#[derive(Debug, Clone)]
pub struct SuggestionRecord {
    pub id: String,           // UUID v4 text
    pub document_id: String,
    pub prompt: String,
    pub suggested_text: String,
    pub status: SuggestionStatus,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}
