use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a user annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Location marker; at most one per location.
    Bookmark,
    /// Free-text note anchored after a sentence.
    Annotation,
}

impl AnnotationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Bookmark => "bookmark",
            AnnotationKind::Annotation => "annotation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bookmark" => Some(AnnotationKind::Bookmark),
            "annotation" => Some(AnnotationKind::Annotation),
            _ => None,
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bookmark or note anchored to a location identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    pub anchor: String,
    pub body: String,
    /// Creation time, epoch milliseconds.
    pub date: i64,
    /// Last edit time, epoch milliseconds.
    pub edited: i64,
}

impl Annotation {
    /// Creates an annotation stamped with the current time.
    ///
    /// When `id` is `None` a random UUID is generated.
    pub fn new(kind: AnnotationKind, anchor: &str, body: &str, id: Option<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            kind,
            anchor: anchor.to_string(),
            body: body.to_string(),
            date: now,
            edited: now,
        }
    }

    /// Creates a bookmark whose id is derived from its anchor.
    pub fn bookmark(anchor: &str, body: &str) -> Self {
        Self::new(AnnotationKind::Bookmark, anchor, body, Some(cfi_to_id(anchor)))
    }

    pub fn is_bookmark(&self) -> bool {
        self.kind == AnnotationKind::Bookmark
    }
}

/// Normalizes a location identifier into an annotation id by dropping every
/// non-word character.
pub fn cfi_to_id(cfi: &str) -> String {
    cfi.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Current UNIX time in milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Formats an epoch-millisecond stamp the way list items show it.
pub fn format_date(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .unwrap_or_default()
}
