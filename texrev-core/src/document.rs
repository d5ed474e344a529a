use crate::diff::split_lines;

/// The authoritative text of the document being edited.
///
/// `revision` increments on every replacement so presentation code can tell
/// that anything derived from the old text is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    path: String,
    text: String,
    revision: u64,
}

impl Document {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { path: path.into(), text: text.into(), revision: 0 }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn lines(&self) -> Vec<&str> {
        split_lines(&self.text)
    }

    /// Replaces the whole text verbatim and bumps the revision.
    ///
    /// Returns the previous text.
    pub fn replace(&mut self, text: impl Into<String>) -> String {
        self.revision += 1;
        std::mem::replace(&mut self.text, text.into())
    }
}
