//! Notes panel: annotation list, in-content markers and annotate mode.

use serde::Serialize;

use super::Panel;
use crate::book::CaretPosition;
use crate::events::{ReaderEvent, Subscription};
use crate::reader::Reader;
use crate::types::annotation::{Annotation, AnnotationKind};
use crate::view::{AnnotationItem, ItemList, Marker};

const ESCAPE: u32 = 27;
const MARKER_CLASSES: [&str; 3] = ["note-marker", "footnotesuperscript", "reader_generated"];

/// Offset just past the next `.` at or after `offset`, or the end of the
/// text. Offsets count characters.
pub fn sentence_end(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let from = offset.min(chars.len());
    match chars[from..].iter().position(|c| *c == '.') {
        Some(i) => from + i + 1,
        None => chars.len(),
    }
}

pub fn marker_id(annotation_id: &str) -> String {
    format!("note-{}", annotation_id)
}

#[derive(Debug, Serialize)]
pub struct NotesController {
    items: ItemList,
    open: bool,
    /// Draft in the note text box.
    pub text: String,
    pub text_disabled: bool,
    /// Annotate mode: the next content click anchors a note.
    armed: bool,
    /// Wide touch navigation was on when annotate mode started.
    restore_touch_nav: bool,
    current_spine: Option<usize>,
    #[serde(skip)]
    events: Subscription,
}

impl NotesController {
    pub fn new(reader: &Reader) -> Self {
        let mut controller = Self {
            items: ItemList::new(),
            open: false,
            text: String::new(),
            text_disabled: false,
            armed: false,
            restore_touch_nav: false,
            current_spine: None,
            events: reader.subscribe(),
        };
        controller.rebuild(reader);
        controller
    }

    fn rebuild(&mut self, reader: &Reader) {
        self.items.clear();
        for note in reader.annotations(Some(AnnotationKind::Annotation)) {
            self.items.upsert(AnnotationItem::from_annotation(note));
        }
    }

    pub fn items(&self) -> &ItemList {
        &self.items
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Icon of the anchor button.
    pub fn anchor_icon(&self) -> &'static str {
        if self.armed {
            "icon-location_off"
        } else {
            "icon-room"
        }
    }

    /// Applies pending reader events to the list and markers.
    pub fn sync(&mut self, reader: &mut Reader) {
        for event in self.events.drain() {
            match event {
                ReaderEvent::AnnotationCreated(note) => {
                    self.items.upsert(AnnotationItem::from_annotation(&note));
                }
                ReaderEvent::AnnotationRemoved(id) => self.delete_item(reader, &id),
                _ => {}
            }
        }
        if self.events.take_lagged() {
            self.rebuild(reader);
            self.renumber_markers(reader);
        }
    }

    /// Toggles annotate mode. Wide touch navigation is suspended while the
    /// mode is armed and restored afterwards.
    pub fn toggle_annotate(&mut self, touch_nav: &mut bool) {
        if self.armed {
            self.disarm(touch_nav);
        } else {
            self.armed = true;
            self.text_disabled = true;
            if *touch_nav {
                *touch_nav = false;
                self.restore_touch_nav = true;
            }
        }
    }

    fn disarm(&mut self, touch_nav: &mut bool) {
        self.armed = false;
        self.text_disabled = false;
        if self.restore_touch_nav {
            self.restore_touch_nav = false;
            *touch_nav = true;
        }
    }

    /// Handles a content click while annotate mode is armed: anchors a note
    /// with the draft text after the end of the clicked sentence.
    pub fn insert_at_point(
        &mut self,
        reader: &mut Reader,
        caret: &CaretPosition,
        touch_nav: &mut bool,
    ) -> Option<Annotation> {
        if !self.armed {
            return None;
        }
        let Some(node) = caret.text_node() else {
            tracing::warn!("click did not resolve to a text node");
            return None;
        };
        let spine_pos = self.current_spine.or_else(|| {
            reader
                .current_location()
                .and_then(|cfi| reader.book().spine_index_of(cfi))
        })?;
        let offset = sentence_end(&node.text, caret.offset);
        let cfi = match reader.book().cfi_from_text_node(spine_pos, node, offset) {
            Ok(cfi) => cfi,
            Err(e) => {
                tracing::warn!(error = %e, "could not anchor note");
                return None;
            }
        };

        let note = Annotation::new(AnnotationKind::Annotation, &cfi, &self.text, None);
        reader.add_annotation(note.clone());
        self.items.upsert(AnnotationItem::from_annotation(&note));
        self.place_marker(reader, &note);

        self.text.clear();
        self.disarm(touch_nav);
        Some(note)
    }

    /// Inserts the marker for `note` into the content document.
    pub fn place_marker(&self, reader: &mut Reader, note: &Annotation) {
        let label = format!("{}[Reader]", self.items.find_index(&note.id));
        let Some(content) = reader.content_mut() else {
            return;
        };
        content.insert_marker(Marker {
            id: marker_id(&note.id),
            anchor: note.anchor.clone(),
            classes: MARKER_CLASSES.iter().map(|c| c.to_string()).collect(),
            label,
        });
        self.renumber_markers(reader);
    }

    /// Relabels the markers of the displayed chapter with their list index.
    pub fn renumber_markers(&self, reader: &mut Reader) {
        let Some(spine) = self.current_spine else {
            return;
        };
        let mut labels = Vec::new();
        for note in reader.annotations(None) {
            match reader.book().spine_index_of(&note.anchor) {
                Some(pos) if pos == spine => labels.push((
                    marker_id(&note.id),
                    format!("{}[Reader]", self.items.find_index(&note.id)),
                )),
                Some(_) => {}
                None => tracing::warn!(anchor = %note.anchor, "renumbering of marker failed"),
            }
        }
        let Some(content) = reader.content_mut() else {
            return;
        };
        for (id, label) in labels {
            if let Some(marker) = content.get_marker_mut(&id) {
                marker.label = label;
            }
        }
    }

    fn delete_item(&mut self, reader: &mut Reader, id: &str) {
        self.items.remove(id);
        let removed = reader
            .content_mut()
            .map_or(false, |content| content.remove_marker(&marker_id(id)));
        if removed {
            self.renumber_markers(reader);
        }
    }

    /// Delete control of a list item.
    pub fn remove(&mut self, reader: &mut Reader, id: &str) {
        reader.remove_annotation(id);
        self.delete_item(reader, id);
    }

    /// Before a chapter is shown: re-places the markers anchored in it.
    pub fn before_chapter_display(&mut self, reader: &mut Reader, spine_pos: usize) {
        self.current_spine = Some(spine_pos);
        let notes: Vec<Annotation> = reader
            .annotations(Some(AnnotationKind::Annotation))
            .into_iter()
            .filter(|note| match reader.book().spine_index_of(&note.anchor) {
                Some(pos) => pos == spine_pos,
                None => {
                    tracing::warn!(anchor = %note.anchor, "anchoring failed");
                    false
                }
            })
            .cloned()
            .collect();
        for note in &notes {
            self.place_marker(reader, note);
        }
    }

    pub fn open_editor(&mut self, id: &str) {
        if let Some(item) = self.items.get_mut(id) {
            item.editing = true;
        }
    }

    /// Content-editable input while an item is being edited.
    pub fn edit_text(&mut self, id: &str, text: &str) {
        if let Some(item) = self.items.get_mut(id).filter(|item| item.editing) {
            item.text = text.to_string();
        }
    }

    /// Saves the edited text into the annotation.
    pub fn save(&mut self, reader: &mut Reader, id: &str) {
        let Some(item) = self.items.get(id) else {
            return;
        };
        match reader.get_annotation(id).cloned() {
            Some(mut note) => {
                note.body = item.text.clone();
                let stored = reader.update_annotation(note);
                self.items.upsert(AnnotationItem::from_annotation(&stored));
            }
            None => {
                tracing::warn!(id, "updating annotation failed");
                self.close_editor(id);
            }
        }
    }

    /// Discards the edit and restores the stored text.
    pub fn cancel(&mut self, reader: &Reader, id: &str) {
        if let (Some(item), Some(note)) = (self.items.get_mut(id), reader.get_annotation(id)) {
            item.text = note.body.clone();
        }
        self.close_editor(id);
    }

    /// Key press inside an item being edited. Escape cancels.
    pub fn editor_key(&mut self, reader: &Reader, id: &str, key: u32) {
        if key == ESCAPE {
            self.cancel(reader, id);
        }
    }

    fn close_editor(&mut self, id: &str) {
        if let Some(item) = self.items.get_mut(id) {
            item.editing = false;
        }
    }

    /// Context link of a list item.
    pub fn goto(&self, reader: &Reader, id: &str) {
        let Some(item) = self.items.get(id) else {
            return;
        };
        if let Err(e) = reader.book().goto_cfi(&item.anchor) {
            tracing::warn!(id, error = %e, "note navigation failed");
        }
    }
}

impl Panel for NotesController {
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
