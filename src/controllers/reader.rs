//! Paging, keyboard commands and viewer chrome.

use serde::Serialize;

use crate::book::Direction;
use crate::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
use crate::reader::Reader;
use crate::types::settings::ReaderAction;

#[derive(Debug, Clone, Serialize)]
pub struct ReaderController {
    pub loader_visible: bool,
    pub divider_visible: bool,
    /// The viewer was narrowed to make room for the sidebar.
    pub viewer_resized: bool,
    #[serde(skip)]
    shortcuts: ShortcutManager,
}

impl ReaderController {
    pub fn new(reader: &Reader) -> Self {
        Self {
            loader_visible: true,
            divider_visible: false,
            viewer_resized: false,
            shortcuts: ShortcutManager::from_table(reader.settings.keyboard.clone()),
        }
    }

    pub fn shortcuts(&self) -> &ShortcutManager {
        &self.shortcuts
    }

    pub fn shortcuts_mut(&mut self) -> &mut ShortcutManager {
        &mut self.shortcuts
    }

    /// Resolves a key code to its action. Unbound codes are logged.
    pub fn key_command(&self, key: u32) -> Option<ReaderAction> {
        let action = self.shortcuts.get_action(key);
        if action.is_none() {
            tracing::info!(key, "unsupported keyCode");
        }
        action
    }

    fn rtl(reader: &Reader) -> bool {
        reader.book().metadata().direction == Direction::Rtl
    }

    /// Next-page button; turns backwards in right-to-left books.
    pub fn next(&self, reader: &Reader) {
        if Self::rtl(reader) {
            reader.book().prev_page();
        } else {
            reader.book().next_page();
        }
    }

    pub fn prev(&self, reader: &Reader) {
        if Self::rtl(reader) {
            reader.book().next_page();
        } else {
            reader.book().prev_page();
        }
    }

    pub fn first(&self, reader: &Reader) {
        self.goto_spine_end(reader, false);
    }

    pub fn last(&self, reader: &Reader) {
        self.goto_spine_end(reader, true);
    }

    fn goto_spine_end(&self, reader: &Reader, last: bool) {
        let spine = reader.book().spine();
        let target = if last { spine.last() } else { spine.first() };
        if let Some(item) = target {
            if let Err(e) = reader.book().goto(&item.href) {
                tracing::warn!(href = %item.href, error = %e, "navigation failed");
            }
        }
    }

    /// Narrows the viewer and re-navigates to keep the current position.
    pub fn slide_out(&mut self, reader: &Reader) {
        let current = reader.book().current_location_cfi();
        self.viewer_resized = true;
        Self::restore_position(reader, current);
    }

    /// Undoes [`ReaderController::slide_out`].
    pub fn slide_in(&mut self, reader: &Reader) {
        if !self.viewer_resized {
            return;
        }
        let current = reader.book().current_location_cfi();
        self.viewer_resized = false;
        Self::restore_position(reader, current);
    }

    fn restore_position(reader: &Reader, cfi: Option<String>) {
        if let Some(cfi) = cfi {
            if let Err(e) = reader.book().goto_cfi(&cfi) {
                tracing::warn!(cfi = %cfi, error = %e, "could not restore position");
            }
        }
    }

    pub fn show_loader(&mut self) {
        self.loader_visible = true;
        self.divider_visible = false;
    }

    pub fn hide_loader(&mut self) {
        self.loader_visible = false;
    }

    /// The renderer switched between single pages and spreads.
    pub fn spreads(&mut self, on: bool) {
        self.divider_visible = on;
    }
}
