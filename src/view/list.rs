//! List item view-models shared by the notes, bookmarks and search panels.

use serde::Serialize;

use crate::types::annotation::{format_date, Annotation};

/// A rendered annotation entry in a sidebar list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationItem {
    /// Element id; equals the annotation id.
    pub id: String,
    pub text: String,
    pub date: String,
    /// Fragment link to the anchor (`#epubcfi(...)`).
    pub link: String,
    pub anchor: String,
    /// Edit mode: text is content-editable and save/cancel replace
    /// edit/delete in the control row.
    pub editing: bool,
}

impl AnnotationItem {
    pub fn from_annotation(annotation: &Annotation) -> Self {
        Self {
            id: annotation.id.clone(),
            text: annotation.body.clone(),
            date: format_date(annotation.edited),
            link: format!("#{}", annotation.anchor),
            anchor: annotation.anchor.clone(),
            editing: false,
        }
    }
}

/// Ordered list of annotation items keyed by id.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemList {
    items: Vec<AnnotationItem>,
}

impl ItemList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the item, or replaces it in place when the id is already listed.
    pub fn upsert(&mut self, item: AnnotationItem) {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        before != self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&AnnotationItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut AnnotationItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// 1-based position of `id`. An unknown id maps to one past the end, the
    /// slot a newly appended item would take.
    pub fn find_index(&self, id: &str) -> usize {
        self.items
            .iter()
            .position(|i| i.id == id)
            .unwrap_or(self.items.len())
            + 1
    }

    pub fn items(&self) -> &[AnnotationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
