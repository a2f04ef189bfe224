//! Browser location state: the `#fragment` history and the query string the
//! reader was opened with.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UrlState {
    query: String,
    hash: Option<String>,
    history: Vec<String>,
}

impl UrlState {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.trim_start_matches('?').to_string(),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current fragment without the leading `#`.
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Pushes `#cfi` onto the history unless it already is the current
    /// fragment. Returns whether an entry was pushed.
    pub fn push(&mut self, cfi: &str) -> bool {
        if self.hash.as_deref() == Some(cfi) {
            return false;
        }
        self.hash = Some(cfi.to_string());
        self.history.push(format!("#{}", cfi));
        true
    }

    /// Records a fragment change made outside the reader (back button,
    /// typed URL).
    pub fn set_hash(&mut self, fragment: &str) {
        let fragment = fragment.trim_start_matches('#');
        self.hash = (!fragment.is_empty()).then(|| fragment.to_string());
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}
