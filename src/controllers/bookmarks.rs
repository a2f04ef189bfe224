use serde::Serialize;

use super::Panel;
use crate::events::{ReaderEvent, Subscription};
use crate::reader::Reader;
use crate::types::annotation::{cfi_to_id, AnnotationKind};
use crate::view::{AnnotationItem, ItemList};

/// Bookmarks panel: a list view over the reader's bookmark annotations.
#[derive(Debug, Serialize)]
pub struct BookmarksController {
    items: ItemList,
    open: bool,
    #[serde(skip)]
    events: Subscription,
}

/// What a [`BookmarksController::sync`] pass changed outside the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookmarkSync {
    /// The bookmark at the current location was removed; the toolbar icon
    /// should show "not bookmarked".
    pub current_unbookmarked: bool,
    /// A stored location was navigated to.
    pub navigated: bool,
}

impl BookmarksController {
    pub fn new(reader: &Reader) -> Self {
        let mut controller = Self {
            items: ItemList::new(),
            open: false,
            events: reader.subscribe(),
        };
        controller.rebuild(reader);
        controller
    }

    fn rebuild(&mut self, reader: &Reader) {
        self.items.clear();
        for bookmark in reader.annotations(Some(AnnotationKind::Bookmark)) {
            self.items.upsert(AnnotationItem::from_annotation(bookmark));
        }
    }

    pub fn items(&self) -> &ItemList {
        &self.items
    }

    pub fn sync(&mut self, reader: &mut Reader) -> BookmarkSync {
        let mut outcome = BookmarkSync::default();
        for event in self.events.drain() {
            match event {
                ReaderEvent::BookmarkCreated(bookmark) => {
                    self.items.upsert(AnnotationItem::from_annotation(&bookmark));
                }
                ReaderEvent::BookmarkRemoved(id) => {
                    self.items.remove(&id);
                    let at_current = reader
                        .book()
                        .current_location_cfi()
                        .map_or(false, |cfi| cfi_to_id(&cfi) == id);
                    if at_current {
                        outcome.current_unbookmarked = true;
                    }
                }
                ReaderEvent::GotoBookmark(Some(cfi)) => match reader.book().goto_cfi(&cfi) {
                    Ok(()) => outcome.navigated = true,
                    Err(e) => tracing::warn!(cfi = %cfi, error = %e, "stored location unavailable"),
                },
                _ => {}
            }
        }
        if self.events.take_lagged() {
            self.rebuild(reader);
        }
        outcome
    }

    /// Delete control of a list item. Ids of other annotation kinds are
    /// refused; returns whether a bookmark was removed.
    pub fn remove(&mut self, reader: &mut Reader, id: &str) -> bool {
        if !reader.get_annotation(id).map_or(false, |a| a.is_bookmark()) {
            tracing::warn!(id, "not a bookmark; removal refused");
            return false;
        }
        reader.remove_annotation(id);
        self.items.remove(id);
        true
    }

    pub fn goto(&self, reader: &Reader, id: &str) {
        let Some(item) = self.items.get(id) else {
            return;
        };
        if let Err(e) = reader.book().goto_cfi(&item.anchor) {
            tracing::warn!(id, error = %e, "bookmark navigation failed");
        }
    }
}

impl Panel for BookmarksController {
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
