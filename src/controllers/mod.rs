// Reader UI controllers
// Each controller keeps the view state of one part of the shell and reacts to
// reader events and book events. ReaderApp composes them.

pub mod bookmarks;
pub mod controls;
pub mod meta;
pub mod notes;
pub mod reader;
pub mod search;
pub mod settings;
pub mod sidebar;
pub mod styles;
pub mod toc;

use serde::{Deserialize, Serialize};

use crate::reader::Reader;

pub use bookmarks::BookmarksController;
pub use controls::ControlsController;
pub use meta::MetaController;
pub use notes::NotesController;
pub use reader::ReaderController;
pub use search::SearchController;
pub use settings::SettingsController;
pub use sidebar::SidebarController;
pub use styles::StylesController;
pub use toc::TocController;

/// A view that can be opened and closed.
pub trait Panel {
    fn show(&mut self, reader: &mut Reader);
    fn hide(&mut self, reader: &mut Reader);
    fn is_open(&self) -> bool;
}

/// Sidebar panels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PanelName {
    #[default]
    Toc,
    Bookmarks,
    Notes,
    Search,
}

impl PanelName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PanelName::Toc => "Toc",
            PanelName::Bookmarks => "Bookmarks",
            PanelName::Notes => "Notes",
            PanelName::Search => "Search",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Toc" => Some(PanelName::Toc),
            "Bookmarks" => Some(PanelName::Bookmarks),
            "Notes" => Some(PanelName::Notes),
            "Search" => Some(PanelName::Search),
            _ => None,
        }
    }
}
