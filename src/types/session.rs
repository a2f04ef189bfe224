use serde::{Deserialize, Serialize};

use super::annotation::Annotation;

/// A named value persisted by the session store (a default or a preference).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionEntry {
    pub name: String,
    pub value: serde_json::Value,
}

/// A stored annotation record. `content` is `None` when the stored payload
/// could not be decoded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAnnotation {
    pub name: String,
    pub content: Option<Annotation>,
}

/// Everything the session store pre-loads for a reader.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    /// Reader-wide defaults (style maps, toggles).
    pub defaults: Vec<SessionEntry>,
    /// Per-book preferences; applied after defaults.
    pub preferences: Vec<SessionEntry>,
    pub annotations: Vec<StoredAnnotation>,
    /// Last reading position.
    pub cursor: Option<String>,
}
