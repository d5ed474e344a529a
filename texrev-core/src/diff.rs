//! Line diff engine for reviewing a suggested document against the current one.
//!
//! Everything here is pure: two strings in, rows out. Nothing is cached between
//! calls, so callers recompute whenever either document changes.
//!
//! The default [`Alignment::Positional`] pairs row `i` with row `i`. It runs in
//! time and memory linear in the longer document and splits each input once.
//! An inserted line near the top therefore shows every following row as
//! `Modified`; [`Alignment::Lcs`] realigns with Myers' algorithm via `similar`
//! for callers that want a conventional diff instead.
//!
//! The LCS search is bounded by [`LCS_DEADLINE`]. Past it `similar` settles for
//! a coarser alignment, which still replays both documents exactly.

use std::time::{Duration, Instant};

use similar::{capture_diff_slices_deadline, Algorithm, ChangeTag, DiffOp, TextDiff};

use crate::types::{
    Alignment, DiffLine, DiffLineKind, DiffStatistics, SplitRow, UnifiedOrigin, UnifiedRow,
    ViewRow,
};

/// Splits `text` on `'\n'` boundaries, keeping empty segments.
///
/// `""` yields `[""]` and `"a\n"` yields `["a", ""]`. Carriage returns are not
/// boundaries and remain part of the line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Lines of `text` that take part in classification.
///
/// An empty document still occupies one alignment row (see [`split_lines`]) but
/// contributes no present lines, so the other side reads as pure additions or
/// removals.
fn present_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        split_lines(text)
    }
}

/// Computes the positional line diff between `original` and `suggested`.
///
/// Returns exactly `max(split_lines(original).len(), split_lines(suggested).len())`
/// rows with `line_number` running from 1.
pub fn compute_diff(original: &str, suggested: &str) -> Vec<DiffLine> {
    compute_diff_with(original, suggested, Alignment::Positional)
}

/// Computes the line diff using the requested alignment strategy.
pub fn compute_diff_with(original: &str, suggested: &str, alignment: Alignment) -> Vec<DiffLine> {
    let original_lines = present_lines(original);
    let suggested_lines = present_lines(suggested);

    match alignment {
        Alignment::Positional => positional_diff(&original_lines, &suggested_lines),
        Alignment::Lcs => lcs_diff(&original_lines, &suggested_lines),
    }
}

fn positional_diff(original: &[&str], suggested: &[&str]) -> Vec<DiffLine> {
    let rows = original.len().max(suggested.len()).max(1);
    let mut diff = Vec::with_capacity(rows);
    for i in 0..rows {
        diff.push(classify(
            i + 1,
            original.get(i).copied(),
            suggested.get(i).copied(),
        ));
    }
    diff
}

/// Time budget for one LCS alignment.
pub const LCS_DEADLINE: Duration = Duration::from_millis(100);

fn lcs_diff(original: &[&str], suggested: &[&str]) -> Vec<DiffLine> {
    if original.is_empty() && suggested.is_empty() {
        return vec![classify(1, None, None)];
    }

    let mut diff: Vec<DiffLine> = Vec::with_capacity(original.len().max(suggested.len()));
    let mut push = |o: Option<&str>, s: Option<&str>| {
        let line_number = diff.len() + 1;
        diff.push(classify(line_number, o, s));
    };

    let deadline = Instant::now() + LCS_DEADLINE;
    for op in capture_diff_slices_deadline(Algorithm::Myers, original, suggested, Some(deadline)) {
        match op {
            DiffOp::Equal { old_index, new_index, len } => {
                for k in 0..len {
                    push(Some(original[old_index + k]), Some(suggested[new_index + k]));
                }
            }
            DiffOp::Delete { old_index, old_len, .. } => {
                for &line in &original[old_index..old_index + old_len] {
                    push(Some(line), None);
                }
            }
            DiffOp::Insert { new_index, new_len, .. } => {
                for &line in &suggested[new_index..new_index + new_len] {
                    push(None, Some(line));
                }
            }
            DiffOp::Replace { old_index, old_len, new_index, new_len } => {
                // Pair the replaced runs row by row; the longer run's tail is a
                // plain removal or addition.
                for k in 0..old_len.max(new_len) {
                    let o = (k < old_len).then(|| original[old_index + k]);
                    let s = (k < new_len).then(|| suggested[new_index + k]);
                    push(o, s);
                }
            }
        }
    }
    diff
}

/// Classifies one aligned row from the presence and equality of its two sides.
fn classify(line_number: usize, original: Option<&str>, suggested: Option<&str>) -> DiffLine {
    let kind = match (original, suggested) {
        (Some(o), Some(s)) if o == s => DiffLineKind::Unchanged,
        (Some(_), Some(_)) => DiffLineKind::Modified,
        (Some(_), None) => DiffLineKind::Removed,
        (None, Some(_)) => DiffLineKind::Added,
        // Only reachable when both documents are empty.
        (None, None) => {
            return DiffLine {
                kind: DiffLineKind::Unchanged,
                original_text: Some(String::new()),
                suggested_text: Some(String::new()),
                line_number,
            }
        }
    };
    DiffLine {
        kind,
        original_text: original.map(str::to_owned),
        suggested_text: suggested.map(str::to_owned),
        line_number,
    }
}

/// Counts rows by kind.
pub fn compute_statistics(diff: &[DiffLine]) -> DiffStatistics {
    let mut stats = DiffStatistics { total: diff.len(), ..DiffStatistics::default() };
    for line in diff {
        match line.kind {
            DiffLineKind::Added => stats.added += 1,
            DiffLineKind::Removed => stats.removed += 1,
            DiffLineKind::Modified => stats.modified += 1,
            DiffLineKind::Unchanged => stats.unchanged += 1,
        }
    }
    stats
}

/// Projects a diff into the two columns of a side-by-side view.
///
/// The left column drops `Added` rows and the right column drops `Removed` rows;
/// everything else appears in both, which keeps unchanged and modified rows
/// level with each other across the columns.
pub fn render_split_view(diff: &[DiffLine]) -> (Vec<ViewRow>, Vec<ViewRow>) {
    let left = diff
        .iter()
        .filter(|line| line.kind != DiffLineKind::Added)
        .map(|line| ViewRow {
            kind: line.kind,
            line_number: line.line_number,
            text: line.original_side().unwrap_or_default().to_owned(),
        })
        .collect();
    let right = diff
        .iter()
        .filter(|line| line.kind != DiffLineKind::Removed)
        .map(|line| ViewRow {
            kind: line.kind,
            line_number: line.line_number,
            text: line.suggested_side().unwrap_or_default().to_owned(),
        })
        .collect();
    (left, right)
}

/// Pairs the split-view columns row by row, one [`SplitRow`] per diff row.
///
/// Dropping rows per column as [`render_split_view`] does only keeps the
/// columns level when additions and removals sit at the tail. Under
/// [`Alignment::Lcs`] they can appear anywhere, so a side-by-side display
/// pads the missing cell instead.
pub fn render_split_rows(diff: &[DiffLine]) -> Vec<SplitRow> {
    diff.iter()
        .map(|line| {
            let cell = |text: Option<&str>| {
                text.map(|text| ViewRow {
                    kind: line.kind,
                    line_number: line.line_number,
                    text: text.to_owned(),
                })
            };
            SplitRow { original: cell(line.original_side()), suggested: cell(line.suggested_side()) }
        })
        .collect()
}

/// Projects a diff into a single unified column.
///
/// A `Modified` row becomes a removal of the original text followed by an
/// addition of the suggested text, both carrying the same line number.
pub fn render_unified_view(diff: &[DiffLine]) -> Vec<UnifiedRow> {
    let mut rows = Vec::with_capacity(diff.len());
    for line in diff {
        let row = |origin, text: Option<&str>| UnifiedRow {
            origin,
            kind: line.kind,
            line_number: line.line_number,
            text: text.unwrap_or_default().to_owned(),
        };
        match line.kind {
            DiffLineKind::Unchanged => rows.push(row(UnifiedOrigin::Context, line.original_side())),
            DiffLineKind::Removed => rows.push(row(UnifiedOrigin::Removal, line.original_side())),
            DiffLineKind::Added => rows.push(row(UnifiedOrigin::Addition, line.suggested_side())),
            DiffLineKind::Modified => {
                rows.push(row(UnifiedOrigin::Removal, line.original_text.as_deref()));
                rows.push(row(UnifiedOrigin::Addition, line.suggested_text.as_deref()));
            }
        }
    }
    rows
}

/// A run of text within a modified line; `emphasized` marks words that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub emphasized: bool,
    pub text: String,
}

/// Computes word-level segments for the two halves of a modified line.
///
/// Returns `(original_segments, suggested_segments)`. Concatenating each list's
/// text reproduces the corresponding input.
pub fn word_changes(original: &str, suggested: &str) -> (Vec<Segment>, Vec<Segment>) {
    let diff = TextDiff::from_words(original, suggested);
    let mut old_segments = Vec::new();
    let mut new_segments = Vec::new();

    for op in diff.ops() {
        for change in diff.iter_inline_changes(op) {
            for (emphasized, value) in change.iter_strings_lossy() {
                let segment = Segment { emphasized, text: value.into_owned() };
                match change.tag() {
                    ChangeTag::Delete => old_segments.push(segment),
                    ChangeTag::Insert => new_segments.push(segment),
                    ChangeTag::Equal => {
                        old_segments.push(segment.clone());
                        new_segments.push(segment);
                    }
                }
            }
        }
    }
    (old_segments, new_segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(diff: &[DiffLine]) -> Vec<DiffLineKind> {
        diff.iter().map(|d| d.kind).collect()
    }

    #[test]
    fn split_keeps_positional_segments() {
        assert_eq!(split_lines(""), vec![""]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines("\n\n"), vec!["", "", ""]);
        assert_eq!(split_lines("a\r\nb"), vec!["a\r", "b"]);
    }

    #[test]
    fn modified_middle_line() {
        let diff = compute_diff("A\nB\nC", "A\nX\nC");
        assert_eq!(diff.len(), 3);
        assert_eq!(
            diff[1],
            DiffLine {
                kind: DiffLineKind::Modified,
                original_text: Some("B".into()),
                suggested_text: Some("X".into()),
                line_number: 2,
            }
        );
        assert_eq!(diff[0].original_text.as_deref(), Some("A"));
        assert_eq!(diff[2].line_number, 3);
        let stats = compute_statistics(&diff);
        assert_eq!((stats.added, stats.removed, stats.modified), (0, 0, 1));
        assert_eq!(stats.unchanged, 2);
    }

    #[test]
    fn appended_line_is_added() {
        let diff = compute_diff("A\nB", "A\nB\nC");
        assert_eq!(
            kinds(&diff),
            vec![DiffLineKind::Unchanged, DiffLineKind::Unchanged, DiffLineKind::Added]
        );
        assert_eq!(diff[2].original_text, None);
        assert_eq!(diff[2].suggested_text.as_deref(), Some("C"));
        let stats = compute_statistics(&diff);
        assert_eq!((stats.added, stats.removed, stats.modified), (1, 0, 0));
    }

    #[test]
    fn two_empty_documents() {
        let diff = compute_diff("", "");
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].kind, DiffLineKind::Unchanged);
        assert_eq!(diff[0].original_text.as_deref(), Some(""));
        assert_eq!(diff[0].suggested_text.as_deref(), Some(""));
    }

    #[test]
    fn empty_original_is_all_additions() {
        let diff = compute_diff("", "x\ny");
        assert_eq!(kinds(&diff), vec![DiffLineKind::Added, DiffLineKind::Added]);

        let diff = compute_diff("x\ny", "");
        assert_eq!(kinds(&diff), vec![DiffLineKind::Removed, DiffLineKind::Removed]);
    }

    #[test]
    fn blank_lines_inside_a_document_are_present() {
        let diff = compute_diff("a\n\nb", "a\nz");
        assert_eq!(
            kinds(&diff),
            vec![DiffLineKind::Unchanged, DiffLineKind::Modified, DiffLineKind::Removed]
        );
        assert_eq!(diff[1].original_text.as_deref(), Some(""));
    }

    #[test]
    fn insertion_shifts_positional_rows() {
        let diff = compute_diff("a\nb\nc", "new\na\nb\nc");
        assert_eq!(
            kinds(&diff),
            vec![
                DiffLineKind::Modified,
                DiffLineKind::Modified,
                DiffLineKind::Modified,
                DiffLineKind::Added,
            ]
        );
    }

    #[test]
    fn lcs_realigns_after_insertion() {
        let diff = compute_diff_with("a\nb\nc", "new\na\nb\nc", Alignment::Lcs);
        assert_eq!(
            kinds(&diff),
            vec![
                DiffLineKind::Added,
                DiffLineKind::Unchanged,
                DiffLineKind::Unchanged,
                DiffLineKind::Unchanged,
            ]
        );
        let numbers: Vec<usize> = diff.iter().map(|d| d.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[test]
    fn lcs_pairs_replacements_as_modified() {
        let diff = compute_diff_with("a\nb\nc", "a\nB\nc", Alignment::Lcs);
        assert_eq!(
            kinds(&diff),
            vec![DiffLineKind::Unchanged, DiffLineKind::Modified, DiffLineKind::Unchanged]
        );
        assert_eq!(diff[1].original_text.as_deref(), Some("b"));
        assert_eq!(diff[1].suggested_text.as_deref(), Some("B"));
    }

    #[test]
    fn lcs_empty_documents() {
        assert_eq!(compute_diff_with("", "", Alignment::Lcs), compute_diff("", ""));
        assert_eq!(
            kinds(&compute_diff_with("", "p\nq", Alignment::Lcs)),
            vec![DiffLineKind::Added, DiffLineKind::Added]
        );
    }

    #[test]
    fn split_view_filters_each_side() {
        let diff = compute_diff("A\nB\nC", "A\nX");
        let (left, right) = render_split_view(&diff);
        let left_text: Vec<&str> = left.iter().map(|r| r.text.as_str()).collect();
        let right_text: Vec<&str> = right.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(left_text, vec!["A", "B", "C"]);
        assert_eq!(right_text, vec!["A", "X"]);
        assert_eq!(left[2].kind, DiffLineKind::Removed);
        assert_eq!(right[1].kind, DiffLineKind::Modified);
        assert_eq!(right[1].line_number, 2);
    }

    #[test]
    fn lcs_on_large_unrelated_documents_replays_both() {
        let original: String = (0..3000).map(|i| format!("old {i}\n")).collect();
        let suggested: String = (0..3000).map(|i| format!("new {}\n", i * 7)).collect();
        let diff = compute_diff_with(&original, &suggested, Alignment::Lcs);

        let replay = |side: fn(&DiffLine) -> Option<&str>| -> String {
            diff.iter().filter_map(side).collect::<Vec<_>>().join("\n")
        };
        assert_eq!(replay(|d| d.original_text.as_deref()), original);
        assert_eq!(replay(|d| d.suggested_text.as_deref()), suggested);
    }

    #[test]
    fn split_rows_stay_level_after_lcs_insertion() {
        let diff = compute_diff_with("a\nb", "new\na\nb", Alignment::Lcs);
        let rows = render_split_rows(&diff);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].original, None);
        assert_eq!(rows[0].suggested.as_ref().map(|r| r.text.as_str()), Some("new"));
        for row in &rows[1..] {
            let (Some(left), Some(right)) = (&row.original, &row.suggested) else {
                panic!("unchanged row lost a side: {row:?}");
            };
            assert_eq!(left.line_number, right.line_number);
            assert_eq!(left.text, right.text);
        }
    }

    #[test]
    fn split_rows_match_column_projection_when_positional() {
        let diff = compute_diff("A\nB\nC", "A\nX");
        let (left, right) = render_split_view(&diff);
        let rows = render_split_rows(&diff);
        let paired_left: Vec<ViewRow> = rows.iter().filter_map(|r| r.original.clone()).collect();
        let paired_right: Vec<ViewRow> = rows.iter().filter_map(|r| r.suggested.clone()).collect();
        assert_eq!(paired_left, left);
        assert_eq!(paired_right, right);
        assert_eq!(rows[2].suggested, None);
    }

    #[test]
    fn unified_view_doubles_modified_rows() {
        let diff = compute_diff("A\nB", "A\nX\nY");
        let rows = render_unified_view(&diff);
        let rendered: Vec<(char, usize, &str)> = rows
            .iter()
            .map(|r| (r.origin.marker(), r.line_number, r.text.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![(' ', 1, "A"), ('-', 2, "B"), ('+', 2, "X"), ('+', 3, "Y")]
        );
        assert_eq!(rows[1].kind, DiffLineKind::Modified);
        assert_eq!(rows[2].kind, DiffLineKind::Modified);
    }

    #[test]
    fn word_changes_emphasize_only_changed_words() {
        let (old, new) = word_changes("\\section{Intro} text", "\\section{Overview} text");
        let old_text: String = old.iter().map(|s| s.text.as_str()).collect();
        let new_text: String = new.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(old_text, "\\section{Intro} text");
        assert_eq!(new_text, "\\section{Overview} text");
        assert!(old.iter().any(|s| s.emphasized));
        assert!(new.iter().any(|s| s.emphasized));
        assert!(new.iter().any(|s| !s.emphasized && s.text.contains("text")));
    }
}
