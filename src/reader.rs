//! The reader root object.
//!
//! [`Reader`] owns the settings, the annotation store, the registered and
//! active styles, the host and content documents and the session handle.
//! Controllers receive it by `&mut` and subscribe to its [`EventBus`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::book::Book;
use crate::events::{EventBus, ReaderEvent, Subscription};
use crate::managers::annotation_manager::{AnnotationManager, AnnotationManagerTrait};
use crate::managers::session_manager::SessionStore;
use crate::services::settings_engine;
use crate::types::annotation::{self, now_millis, Annotation, AnnotationKind};
use crate::types::session::{SessionEntry, StoredAnnotation};
use crate::types::settings::ReaderSettings;
use crate::types::style::Style;
use crate::url::UrlState;
use crate::view::Document;

const CUSTOM_STYLES: &str = "customStyles";
const ACTIVE_STYLES: &str = "activeStyles";
const ELLIPSIZE_AT: usize = 79;

/// Collapses whitespace and cuts the text at a fixed length with a trailing
/// ellipsis.
pub fn ellipsize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= ELLIPSIZE_AT {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(ELLIPSIZE_AT).collect();
    cut.push('…');
    cut
}

pub struct Reader {
    pub settings: ReaderSettings,
    annotations: AnnotationManager,
    styles: BTreeMap<String, Style>,
    active_styles: BTreeSet<String>,
    host: Document,
    content: Option<Document>,
    session: Box<dyn SessionStore>,
    book: Arc<dyn Book>,
    events: EventBus,
    url: UrlState,
    current_location: Option<String>,
}

impl Reader {
    pub fn new(settings: ReaderSettings, book: Arc<dyn Book>, session: Box<dyn SessionStore>) -> Self {
        Self {
            settings,
            annotations: AnnotationManager::new(),
            styles: BTreeMap::new(),
            active_styles: BTreeSet::new(),
            host: Document::new(),
            content: Some(Document::new()),
            session,
            book,
            events: EventBus::new(),
            url: UrlState::default(),
            current_location: None,
        }
    }

    pub fn book(&self) -> &Arc<dyn Book> {
        &self.book
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn emit(&self, event: ReaderEvent) {
        self.events.emit(event);
    }

    pub fn host(&self) -> &Document {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Document {
        &mut self.host
    }

    pub fn content(&self) -> Option<&Document> {
        self.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut Document> {
        self.content.as_mut()
    }

    pub fn url(&self) -> &UrlState {
        &self.url
    }

    pub fn current_location(&self) -> Option<&str> {
        self.current_location.as_deref()
    }

    // ---- session ----

    pub fn persist_default(&mut self, name: &str, value: Value) {
        if let Err(e) = self.session.set_default(name, value) {
            tracing::warn!(name, error = %e, "failed to persist default");
        }
    }

    /// Stores a per-book preference. Failures are logged.
    pub fn persist_preference(&mut self, name: &str, value: Value) {
        if let Err(e) = self.session.set_preference(name, value) {
            tracing::warn!(name, error = %e, "failed to persist preference");
        }
    }

    fn persist_annotation(&mut self, annotation: &Annotation) {
        if let Err(e) = self.session.set_bookmark(
            &annotation.id,
            &annotation.anchor,
            annotation.kind,
            annotation,
        ) {
            tracing::warn!(id = %annotation.id, error = %e, "failed to persist annotation");
        }
    }

    /// Loads the stored session into the reader and returns the saved cursor.
    pub fn restore_session(&mut self) -> Option<String> {
        match self.session.snapshot() {
            Ok(snapshot) => {
                self.restore_defaults(&snapshot.defaults);
                self.restore_preferences(&snapshot.preferences);
                self.restore_annotations(&snapshot.annotations);
                snapshot.cursor
            }
            Err(e) => {
                tracing::warn!(error = %e, "session unavailable; starting fresh");
                None
            }
        }
    }

    fn restore_entry(&mut self, entry: &SessionEntry) {
        match entry.name.as_str() {
            CUSTOM_STYLES => {
                match serde_json::from_value::<BTreeMap<String, Style>>(entry.value.clone()) {
                    Ok(styles) => self.styles = styles,
                    Err(e) => tracing::warn!(error = %e, "ignoring stored customStyles"),
                }
            }
            ACTIVE_STYLES => {
                match serde_json::from_value::<BTreeMap<String, bool>>(entry.value.clone()) {
                    Ok(active) => {
                        self.active_styles =
                            active.into_iter().filter(|(_, on)| *on).map(|(n, _)| n).collect()
                    }
                    Err(e) => tracing::warn!(error = %e, "ignoring stored activeStyles"),
                }
            }
            name => {
                if let Err(e) = settings_engine::assign(&mut self.settings, name, entry.value.clone()) {
                    tracing::warn!(name, error = %e, "ignoring stored setting");
                }
            }
        }
    }

    /// Applies reader-wide stored values by setting name.
    pub fn restore_defaults(&mut self, defaults: &[SessionEntry]) {
        for entry in defaults {
            self.restore_entry(entry);
        }
    }

    /// Applies per-book stored values; called after the defaults.
    pub fn restore_preferences(&mut self, preferences: &[SessionEntry]) {
        for entry in preferences {
            self.restore_entry(entry);
        }
    }

    /// Loads stored annotations, skipping records without content.
    pub fn restore_annotations(&mut self, stored: &[StoredAnnotation]) {
        for record in stored {
            if let Some(content) = &record.content {
                self.annotations.insert(content.clone());
            }
        }
    }

    /// Applies URL query overrides over everything restored so far.
    pub fn apply_query(&mut self, query: &str) -> Vec<String> {
        self.url = UrlState::new(query);
        settings_engine::apply_query(&mut self.settings, query)
    }

    // ---- bookmarks ----

    pub fn cfi_to_id(&self, cfi: &str) -> String {
        annotation::cfi_to_id(cfi)
    }

    pub fn get_bookmark(&self, cfi: &str) -> Option<&Annotation> {
        self.annotations.get(&annotation::cfi_to_id(cfi))
    }

    fn bookmark_text(&self, cfi: &str) -> String {
        let Some(position) = self.book.text_at(cfi) else {
            return cfi.to_string();
        };
        if !position.whole_text.chars().any(|c| !c.is_whitespace()) {
            return cfi.to_string();
        }

        let chars: Vec<char> = position.whole_text.chars().collect();
        let offset = position.offset.min(chars.len());
        let start = if offset > 0 && chars[offset - 1] != ' ' {
            chars[offset..]
                .iter()
                .position(|c| *c == ' ')
                .map_or(offset, |p| offset + p)
        } else {
            offset
        };
        ellipsize(&chars[start..].iter().collect::<String>())
    }

    /// Bookmarks `cfi`, or refreshes the existing bookmark at that location.
    pub fn add_bookmark(&mut self, cfi: &str) -> Annotation {
        let id = annotation::cfi_to_id(cfi);
        let bookmark = match self.annotations.get(&id).cloned() {
            Some(existing) => self.update_annotation(existing),
            None => {
                let bookmark = Annotation::bookmark(cfi, &self.bookmark_text(cfi));
                self.add_annotation(bookmark.clone());
                bookmark
            }
        };
        self.emit(ReaderEvent::BookmarkCreated(bookmark.clone()));
        bookmark
    }

    pub fn update_bookmark(&mut self, bookmark: Annotation) -> Annotation {
        self.update_annotation(bookmark)
    }

    pub fn remove_bookmark(&mut self, cfi: &str) -> Option<Annotation> {
        self.remove_annotation(&annotation::cfi_to_id(cfi))
    }

    pub fn is_bookmarked(&self, cfi: &str) -> bool {
        self.annotations.contains(&annotation::cfi_to_id(cfi))
    }

    pub fn clear_bookmarks(&mut self) {
        self.clear_annotations(AnnotationKind::Bookmark);
    }

    // ---- annotations ----

    pub fn get_annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    /// Annotations in insertion order, optionally of one kind.
    pub fn annotations(&self, kind: Option<AnnotationKind>) -> Vec<&Annotation> {
        self.annotations.list(kind)
    }

    pub fn add_annotation(&mut self, note: Annotation) {
        self.persist_annotation(&note);
        let created = (note.kind == AnnotationKind::Annotation).then(|| note.clone());
        self.annotations.insert(note);
        if let Some(note) = created {
            self.emit(ReaderEvent::AnnotationCreated(note));
        }
    }

    /// Stores `note` with a fresh `edited` stamp and returns the stored copy.
    pub fn update_annotation(&mut self, mut note: Annotation) -> Annotation {
        note.edited = now_millis().max(note.date);
        self.persist_annotation(&note);
        self.annotations.insert(note.clone());
        note
    }

    pub fn remove_annotation(&mut self, id: &str) -> Option<Annotation> {
        let kind = self.annotations.get(id)?.kind;
        self.emit(ReaderEvent::removed(kind, id));
        if let Err(e) = self.session.delete_bookmark(id) {
            tracing::warn!(id, error = %e, "failed to delete stored annotation");
        }
        self.annotations.remove(id)
    }

    /// Removes every annotation of `kind`; other kinds are untouched.
    pub fn clear_annotations(&mut self, kind: AnnotationKind) {
        for id in self.annotations.ids_of_kind(kind) {
            self.remove_annotation(&id);
        }
    }

    // ---- styles ----

    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    pub fn styles(&self) -> &BTreeMap<String, Style> {
        &self.styles
    }

    pub fn is_style_active(&self, name: &str) -> bool {
        self.active_styles.contains(name)
    }

    pub fn active_styles(&self) -> impl Iterator<Item = &str> {
        self.active_styles.iter().map(String::as_str)
    }

    /// Marks a style active without touching the documents; it is applied by
    /// the next `enable_style` or chapter display.
    pub fn activate_style(&mut self, name: &str) {
        self.active_styles.insert(name.to_string());
    }

    fn persist_custom_styles(&mut self) {
        match serde_json::to_value(&self.styles) {
            Ok(value) => self.persist_default(CUSTOM_STYLES, value),
            Err(e) => tracing::warn!(error = %e, "failed to encode customStyles"),
        }
    }

    fn persist_active_styles(&mut self) {
        let active: serde_json::Map<String, Value> = self
            .active_styles
            .iter()
            .map(|name| (name.clone(), json!(true)))
            .collect();
        self.persist_default(ACTIVE_STYLES, Value::Object(active));
    }

    /// Registers a style unless one with that name exists.
    pub fn add_style(
        &mut self,
        name: &str,
        selector: &str,
        rules: BTreeMap<String, String>,
        extra: Option<Value>,
    ) {
        if self.styles.contains_key(name) {
            return;
        }
        let mut style = Style::new(name, selector, rules);
        style.extra = extra;
        self.styles.insert(name.to_string(), style);
        self.persist_custom_styles();
    }

    fn apply_style(style: &Style, content: Option<&mut Document>, host: &mut Document) {
        let declarations = style.declarations();
        if let Some(content) = content {
            content.remove_style_sheet(&style.name);
            content
                .add_style_sheet(&style.name)
                .insert_rule(&style.selector, &declarations, 0);
        }
        host.remove_style_sheet(&style.name);
        host.add_style_sheet(&style.name)
            .insert_rule(style.host_selector(), &declarations, 0);
    }

    /// Injects the style's sheet into both documents, replacing any previous
    /// copy, and marks it active.
    pub fn enable_style(&mut self, name: &str) {
        let Some(style) = self.styles.get(name) else {
            tracing::warn!(style = name, "enable of unregistered style ignored");
            return;
        };
        Self::apply_style(style, self.content.as_mut(), &mut self.host);
        self.active_styles.insert(name.to_string());
        self.persist_active_styles();
    }

    pub fn disable_style(&mut self, name: &str) {
        if let Some(content) = self.content.as_mut() {
            content.remove_style_sheet(name);
        }
        self.host.remove_style_sheet(name);
        if self.active_styles.remove(name) {
            self.persist_active_styles();
        }
    }

    /// Replaces a style's rules; re-applies it when the content document
    /// currently carries it.
    pub fn update_style(&mut self, name: &str, rules: BTreeMap<String, String>) {
        let Some(style) = self.styles.get_mut(name) else {
            tracing::warn!(style = name, "update of unregistered style ignored");
            return;
        };
        style.rules = rules;
        self.persist_custom_styles();

        let applied = self
            .content
            .as_ref()
            .map_or(false, |doc| doc.get_style_sheet(name).is_some());
        if applied {
            self.enable_style(name);
        }
    }

    /// Sets a single rule of a registered style.
    pub fn update_style_rule(&mut self, name: &str, property: &str, value: &str) {
        let Some(style) = self.styles.get(name) else {
            tracing::warn!(style = name, "update of unregistered style ignored");
            return;
        };
        let mut rules = style.rules.clone();
        rules.insert(property.to_string(), value.to_string());
        self.update_style(name, rules);
    }

    pub fn delete_style(&mut self, name: &str) {
        self.disable_style(name);
        if self.styles.remove(name).is_some() {
            self.persist_custom_styles();
        }
    }

    /// Applies every active style to a newly loaded content document.
    pub fn refresh_styles(&self, content: &mut Document) {
        for name in &self.active_styles {
            let Some(style) = self.styles.get(name) else {
                tracing::warn!(style = %name, "active style is not registered");
                continue;
            };
            content.remove_style_sheet(name);
            content
                .add_style_sheet(name)
                .insert_rule(&style.selector, &style.declarations(), 0);
        }
    }

    /// Installs the content document of a newly displayed chapter.
    pub fn load_content(&mut self, mut content: Document) {
        self.refresh_styles(&mut content);
        self.content = Some(content);
    }

    pub fn unload_content(&mut self) -> Option<Document> {
        self.content.take()
    }

    // ---- navigation ----

    /// Navigates to a `#fragment` set from outside the reader.
    pub fn hash_changed(&mut self, fragment: &str) {
        self.url.set_hash(fragment);
        let target = fragment.trim_start_matches('#');
        if target.is_empty() {
            return;
        }
        let result = if target.starts_with("epubcfi(") {
            self.book.goto_cfi(target)
        } else {
            self.book.goto(target)
        };
        if let Err(e) = result {
            tracing::warn!(fragment = target, error = %e, "hash navigation failed");
        }
    }

    fn push_history(&mut self, cfi: &str) -> bool {
        self.settings.history && self.url.push(cfi)
    }

    /// A text selection was made; its anchor becomes the current location.
    pub fn selected_range(&mut self, cfi: &str) {
        if self.push_history(cfi) {
            self.current_location = Some(cfi.to_string());
        }
    }

    /// The renderer moved. Saves the cursor, records the location and the
    /// history entry. Returns whether the new location is bookmarked.
    pub fn location_changed(&mut self, cfi: &str) -> bool {
        if let Err(e) = self.session.set_cursor(cfi) {
            tracing::warn!(error = %e, "failed to persist cursor");
        }
        self.current_location = Some(cfi.to_string());
        self.push_history(cfi);
        self.is_bookmarked(cfi)
    }
}
