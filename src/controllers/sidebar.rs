use serde::Serialize;

use super::PanelName;

/// Sidebar open state and the active panel.
///
/// Switching panels, and the slide of the viewer that accompanies showing or
/// hiding the sidebar, are carried out by the app, which owns the panels.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SidebarController {
    active: PanelName,
    open: bool,
}

impl SidebarController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_panel(&self) -> PanelName {
        self.active
    }

    /// Makes `name` the active panel. Returns the previously active panel
    /// when it changed.
    pub fn switch_to(&mut self, name: PanelName) -> Option<PanelName> {
        if self.active == name {
            return None;
        }
        Some(std::mem::replace(&mut self.active, name))
    }

    pub fn show(&mut self) {
        self.open = true;
    }

    pub fn hide(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The slider button is shown while the sidebar is closed.
    pub fn slider_visible(&self) -> bool {
        !self.open
    }
}
