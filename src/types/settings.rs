use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named actions a key code can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReaderAction {
    Next,
    Previous,
    First,
    Last,
    Annotate,
    Bookmark,
    Reflow,
    ToggleSidebar,
    Toolbar,
    ToggleDay,
    ToggleNight,
    ToggleFullscreen,
    CloseSidebar,
}

impl ReaderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReaderAction::Next => "next",
            ReaderAction::Previous => "previous",
            ReaderAction::First => "first",
            ReaderAction::Last => "last",
            ReaderAction::Annotate => "annotate",
            ReaderAction::Bookmark => "bookmark",
            ReaderAction::Reflow => "reflow",
            ReaderAction::ToggleSidebar => "toggleSidebar",
            ReaderAction::Toolbar => "toolbar",
            ReaderAction::ToggleDay => "toggleDay",
            ReaderAction::ToggleNight => "toggleNight",
            ReaderAction::ToggleFullscreen => "toggleFullscreen",
            ReaderAction::CloseSidebar => "closeSidebar",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
    }
}

/// Reader configuration: caller options merged over defaults.
///
/// Field names serialize in camelCase so query-string overrides and stored
/// session defaults address them by their public names (`sidebarReflow`,
/// `pageArrows`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderSettings {
    pub book_path: String,
    /// Set when the reader is embedded in a host page that can close it.
    pub contained: Option<bool>,
    pub sidebar_reflow: bool,
    pub generate_pagination: bool,
    pub history: bool,
    pub keyboard: BTreeMap<u32, ReaderAction>,
    pub night_mode: bool,
    pub day_mode: bool,
    pub max_width: u32,
    pub page_arrows: bool,
    pub user_agent: Option<String>,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            book_path: String::new(),
            contained: None,
            sidebar_reflow: false,
            generate_pagination: false,
            history: true,
            keyboard: Self::default_keyboard(),
            night_mode: false,
            day_mode: false,
            max_width: 72,
            page_arrows: false,
            user_agent: None,
        }
    }
}

impl ReaderSettings {
    /// Returns the default key-code → action table.
    pub fn default_keyboard() -> BTreeMap<u32, ReaderAction> {
        let defaults = [
            (32, ReaderAction::Next),             // space
            (34, ReaderAction::Next),             // page-down
            (39, ReaderAction::Next),             // cursor-right
            (33, ReaderAction::Previous),         // page-up
            (37, ReaderAction::Previous),         // cursor-left
            (36, ReaderAction::First),            // home
            (35, ReaderAction::Last),             // end
            (65, ReaderAction::Annotate),         // a
            (66, ReaderAction::Bookmark),         // b
            (82, ReaderAction::Reflow),           // r
            (83, ReaderAction::ToggleSidebar),    // s
            (84, ReaderAction::Toolbar),          // t
            (68, ReaderAction::ToggleDay),        // d
            (78, ReaderAction::ToggleNight),      // n
            (70, ReaderAction::ToggleFullscreen), // f
            (27, ReaderAction::CloseSidebar),     // esc
        ];
        defaults.into_iter().collect()
    }

    pub fn with_book_path(book_path: &str) -> Self {
        Self {
            book_path: book_path.to_string(),
            ..Self::default()
        }
    }
}
