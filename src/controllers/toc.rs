//! Table of contents panel.

use serde::Serialize;

use super::Panel;
use crate::book::TocEntry;
use crate::reader::Reader;

/// One `<li id="toc-{id}">` of the contents tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocItem {
    pub id: String,
    pub label: String,
    pub href: String,
    pub current: bool,
    pub open: bool,
    pub subitems: Vec<TocItem>,
}

impl TocItem {
    fn from_entry(entry: &TocEntry) -> Self {
        Self {
            id: format!("toc-{}", entry.id),
            label: entry.label.clone(),
            href: entry.href.clone(),
            current: false,
            open: false,
            subitems: entry.subitems.iter().map(TocItem::from_entry).collect(),
        }
    }

    /// Entries with children get a toggle control.
    pub fn has_toggle(&self) -> bool {
        !self.subitems.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TocController {
    items: Vec<TocItem>,
    open: bool,
}

impl TocController {
    pub fn new(toc: &[TocEntry]) -> Self {
        Self {
            items: toc.iter().map(TocItem::from_entry).collect(),
            open: true,
        }
    }

    pub fn items(&self) -> &[TocItem] {
        &self.items
    }

    pub fn find(&self, item_id: &str) -> Option<&TocItem> {
        fn walk<'a>(items: &'a [TocItem], id: &str) -> Option<&'a TocItem> {
            items.iter().find_map(|item| {
                if item.id == id {
                    Some(item)
                } else {
                    walk(&item.subitems, id)
                }
            })
        }
        walk(&self.items, item_id)
    }

    fn find_mut<'a>(items: &'a mut [TocItem], id: &str) -> Option<&'a mut TocItem> {
        for item in items.iter_mut() {
            if item.id == id {
                return Some(item);
            }
            if let Some(found) = Self::find_mut(&mut item.subitems, id) {
                return Some(found);
            }
        }
        None
    }

    fn for_each_mut(items: &mut [TocItem], f: &mut impl FnMut(&mut TocItem)) {
        for item in items.iter_mut() {
            f(item);
            Self::for_each_mut(&mut item.subitems, f);
        }
    }

    /// Marks the ancestors of `id` open. Returns whether `id` is in `items`.
    fn open_ancestors(items: &mut [TocItem], id: &str) -> bool {
        for item in items.iter_mut() {
            if item.id == id {
                return true;
            }
            if Self::open_ancestors(&mut item.subitems, id) {
                item.open = true;
                return true;
            }
        }
        false
    }

    /// Follows the displayed chapter: marks it current and opens its parents.
    pub fn chapter_displayed(&mut self, chapter_id: &str) {
        let id = format!("toc-{}", chapter_id);
        if self.find(&id).is_none() {
            return;
        }
        Self::for_each_mut(&mut self.items, &mut |item: &mut TocItem| item.current = false);
        if let Some(item) = Self::find_mut(&mut self.items, &id) {
            item.current = true;
        }
        Self::open_ancestors(&mut self.items, &id);
    }

    /// A contents link was clicked: navigate, and move the current marker
    /// to the clicked entry, leaving the old one open.
    pub fn link_clicked(&mut self, reader: &mut Reader, href: &str) {
        if let Err(e) = reader.book().goto(href) {
            tracing::warn!(href, error = %e, "table of contents navigation failed");
        }
        Self::for_each_mut(&mut self.items, &mut |item: &mut TocItem| {
            if item.current {
                item.current = false;
                item.open = true;
            }
            if item.href == href {
                item.current = true;
            }
        });
    }

    pub fn toggle(&mut self, item_id: &str) {
        if let Some(item) = Self::find_mut(&mut self.items, item_id) {
            item.open = !item.open;
        }
    }
}

impl Panel for TocController {
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
