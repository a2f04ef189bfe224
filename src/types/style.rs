use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named set of CSS declarations applied to the host and content documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    pub selector: String,
    pub rules: BTreeMap<String, String>,
    #[serde(default)]
    pub extra: Option<serde_json::Value>,
}

impl Style {
    pub fn new(name: &str, selector: &str, rules: BTreeMap<String, String>) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            rules,
            extra: None,
        }
    }

    /// Declaration block body: `prop:value!important;` for every rule.
    pub fn declarations(&self) -> String {
        self.rules
            .iter()
            .map(|(prop, value)| format!("{}:{}!important;", prop, value))
            .collect()
    }

    /// Selector used in the host document. The universal selector is scoped
    /// to the reader's main area so the shell chrome keeps its own styling.
    pub fn host_selector(&self) -> &str {
        if self.selector == "*" {
            "#main"
        } else {
            &self.selector
        }
    }
}

/// Builds a rule map from `(property, value)` pairs.
pub fn rules<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
