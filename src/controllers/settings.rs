use serde::Serialize;
use serde_json::json;

use super::Panel;
use crate::reader::Reader;

/// Settings dialog.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsController {
    open: bool,
    /// Wide page-turn areas for touch devices.
    pub touch_nav: bool,
    pub close_visible: bool,
}

impl SettingsController {
    /// Wide navigation defaults to on for touch devices.
    pub fn new(reader: &Reader, touch_device: bool) -> Self {
        Self {
            open: false,
            touch_nav: touch_device,
            close_visible: reader.settings.contained == Some(true),
        }
    }

    pub fn sidebar_reflow(&self, reader: &Reader) -> bool {
        reader.settings.sidebar_reflow
    }

    /// Flips `sidebarReflow` and persists it. Returns the new value; the
    /// caller slides the viewer to match the sidebar.
    pub fn toggle_sidebar_reflow(&self, reader: &mut Reader) -> bool {
        let on = !reader.settings.sidebar_reflow;
        reader.settings.sidebar_reflow = on;
        reader.persist_default("sidebarReflow", json!(on));
        on
    }

    pub fn set_touch_nav(&mut self, on: bool) {
        self.touch_nav = on;
    }

    pub fn set_page_arrows(&self, reader: &mut Reader, on: bool) {
        reader.settings.page_arrows = on;
        reader.persist_default("pageArrows", json!(on));
    }

    /// Page-turn arrows are dimmed unless `pageArrows` is on.
    pub fn arrows_translucent(&self, reader: &Reader) -> bool {
        !reader.settings.page_arrows
    }
}

impl Panel for SettingsController {
    fn show(&mut self, _reader: &mut Reader) {
        self.open = true;
    }

    fn hide(&mut self, _reader: &mut Reader) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
