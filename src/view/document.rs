//! View-model of a rendered document.
//!
//! Stands in for the DOM at the boundary: the host page and the content
//! iframe each get a [`Document`] holding the `<style>` sheets injected into
//! its head, the note markers placed in its body and the active search
//! highlight. A rendering adapter turns this state into real markup.

use serde::Serialize;

/// A `<style id=...>` element with its rule list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleSheet {
    pub id: String,
    pub rules: Vec<String>,
}

impl StyleSheet {
    /// Inserts `selector{declarations}` at `index`, clamped to the rule count.
    pub fn insert_rule(&mut self, selector: &str, declarations: &str, index: usize) {
        let index = index.min(self.rules.len());
        self.rules
            .insert(index, format!("{}{{{}}}", selector, declarations));
    }
}

/// An inline marker element placed at an annotation anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub anchor: String,
    pub classes: Vec<String>,
    pub label: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    head: Vec<StyleSheet>,
    markers: Vec<Marker>,
    highlight: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty sheet with the given id and returns it.
    pub fn add_style_sheet(&mut self, id: &str) -> &mut StyleSheet {
        self.head.push(StyleSheet {
            id: id.to_string(),
            rules: Vec::new(),
        });
        let last = self.head.len() - 1;
        &mut self.head[last]
    }

    pub fn get_style_sheet(&self, id: &str) -> Option<&StyleSheet> {
        self.head.iter().find(|s| s.id == id)
    }

    /// Removes every sheet with the given id. Returns whether one existed.
    pub fn remove_style_sheet(&mut self, id: &str) -> bool {
        let before = self.head.len();
        self.head.retain(|s| s.id != id);
        before != self.head.len()
    }

    pub fn style_sheets(&self) -> &[StyleSheet] {
        &self.head
    }

    pub fn sheet_count(&self, id: &str) -> usize {
        self.head.iter().filter(|s| s.id == id).count()
    }

    /// Places a marker, replacing any marker with the same element id.
    pub fn insert_marker(&mut self, marker: Marker) {
        self.markers.retain(|m| m.id != marker.id);
        self.markers.push(marker);
    }

    pub fn get_marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn get_marker_mut(&mut self, id: &str) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| m.id == id)
    }

    pub fn remove_marker(&mut self, id: &str) -> bool {
        let before = self.markers.len();
        self.markers.retain(|m| m.id != id);
        before != self.markers.len()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn highlight(&mut self, query: &str) {
        self.highlight = Some(query.to_string());
    }

    pub fn unhighlight(&mut self) {
        self.highlight = None;
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlight.as_deref()
    }
}
