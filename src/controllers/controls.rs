//! Toolbar state: connectivity, fullscreen and the bookmark button.

use serde::Serialize;

use crate::reader::Reader;

#[derive(Debug, Clone, Serialize)]
pub struct ControlsController {
    pub offline: bool,
    pub fullscreen: bool,
    pub toolbar_visible: bool,
    /// The current location is bookmarked.
    pub bookmarked: bool,
}

impl Default for ControlsController {
    fn default() -> Self {
        Self {
            offline: false,
            fullscreen: false,
            toolbar_visible: true,
            bookmarked: false,
        }
    }
}

impl ControlsController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn go_online(&mut self) {
        self.offline = false;
    }

    pub fn go_offline(&mut self) {
        self.offline = true;
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    pub fn fullscreen_icon(&self) -> &'static str {
        if self.fullscreen {
            "icon-fullscreen_exit"
        } else {
            "icon-fullscreen"
        }
    }

    pub fn toggle_toolbar(&mut self) {
        self.toolbar_visible = !self.toolbar_visible;
    }

    pub fn bookmark_icon(&self) -> &'static str {
        if self.bookmarked {
            "icon-turned_in"
        } else {
            "icon-turned_in_not"
        }
    }

    /// Bookmark button: bookmarks the current location, or removes the
    /// bookmark there.
    pub fn toggle_bookmark(&mut self, reader: &mut Reader) {
        let Some(cfi) = reader.book().current_location_cfi() else {
            tracing::debug!("no current location to bookmark");
            return;
        };
        if reader.is_bookmarked(&cfi) {
            reader.remove_bookmark(&cfi);
            self.bookmarked = false;
        } else {
            reader.add_bookmark(&cfi);
            self.bookmarked = true;
        }
    }

    /// Saves the cursor, refreshes the bookmark icon and records history.
    pub fn location_changed(&mut self, reader: &mut Reader, cfi: &str) {
        self.bookmarked = reader.location_changed(cfi);
    }

    pub fn page_changed(&self, page: u32, percentage: f32) {
        tracing::debug!(page, percentage, "page changed");
    }
}
