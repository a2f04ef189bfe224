//! App Core for the reader.
//!
//! [`ReaderApp`] owns the [`Reader`] and every controller. Callers feed it
//! user commands and book events; it routes them to the controllers, pumps
//! reader events into the list views and keeps the displayed chapter in step
//! with the book's location.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::book::{Book, CaretPosition, InMemoryBook};
use crate::controllers::{
    BookmarksController, ControlsController, MetaController, NotesController, Panel, PanelName,
    ReaderController, SearchController, SettingsController, SidebarController, StylesController,
    TocController,
};
use crate::events::{BookEvent, ReaderEvent};
use crate::managers::session_manager::{SessionStore, SqliteSessionStore};
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::reader::Reader;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::annotation::Annotation;
use crate::types::errors::ShortcutError;
use crate::types::settings::ReaderAction;
use crate::view::Document;

/// Inputs used to build the reader settings, lowest precedence first: the
/// config file, caller options, then the URL query (applied after the stored
/// session).
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Settings file; the platform config path when `None`.
    pub config_path: Option<String>,
    /// Caller options keyed by setting name.
    pub options: Value,
    /// URL query string, e.g. `?pageArrows=true`.
    pub query: String,
    pub touch_device: bool,
}

/// Serializable view of everything the shell displays.
#[derive(Debug, Serialize)]
pub struct ViewState<'a> {
    pub location: Option<&'a str>,
    pub active_panel: PanelName,
    pub sidebar_open: bool,
    pub sidebar: &'a SidebarController,
    pub toc: &'a TocController,
    pub bookmarks: &'a BookmarksController,
    pub notes: &'a NotesController,
    pub search: &'a SearchController,
    pub styles: &'a StylesController,
    pub settings: &'a SettingsController,
    pub controls: &'a ControlsController,
    pub meta: &'a MetaController,
    pub viewer: &'a ReaderController,
    pub active_styles: Vec<&'a str>,
}

/// Central struct holding the reader and its controllers.
pub struct ReaderApp {
    pub reader: Reader,
    pub sidebar: SidebarController,
    pub toc: TocController,
    pub bookmarks: BookmarksController,
    pub notes: NotesController,
    pub search: SearchController,
    pub styles: StylesController,
    pub settings: SettingsController,
    pub controls: ControlsController,
    pub meta: MetaController,
    pub viewer: ReaderController,
    cursor: Option<String>,
    displayed_spine: Option<usize>,
}

impl ReaderApp {
    /// Builds the settings, restores the session and creates the
    /// controllers. Call [`ReaderApp::ready`] once the book can render.
    pub fn new(book: Arc<dyn Book>, session: Box<dyn SessionStore>, launch: LaunchOptions) -> Self {
        let mut engine = SettingsEngine::new(launch.config_path.clone());
        if let Err(e) = engine.load() {
            tracing::warn!(path = engine.get_config_path(), error = %e, "using default settings");
        }
        if !launch.options.is_null() {
            engine.apply_options(&launch.options);
        }

        let mut reader = Reader::new(engine.into_settings(), book, session);
        let cursor = reader.restore_session();
        let overridden = reader.apply_query(&launch.query);
        if !overridden.is_empty() {
            tracing::debug!(?overridden, "settings overridden by query");
        }

        let metadata = reader.book().metadata();
        let toc = reader.book().toc();

        let styles = StylesController::new(&mut reader);
        let settings = SettingsController::new(&reader, launch.touch_device);
        let viewer = ReaderController::new(&reader);
        let notes = NotesController::new(&reader);
        let bookmarks = BookmarksController::new(&reader);

        tracing::info!(book = %metadata.book_title, "reader opened");

        Self {
            sidebar: SidebarController::new(),
            toc: TocController::new(&toc),
            bookmarks,
            notes,
            search: SearchController::new(),
            styles,
            settings,
            controls: ControlsController::new(),
            meta: MetaController::new(&metadata),
            viewer,
            reader,
            cursor,
            displayed_spine: None,
        }
    }

    /// Opens a JSON book fixture with its session in the SQLite file at
    /// `db_path`.
    pub fn open(
        fixture_path: &str,
        db_path: &str,
        launch: LaunchOptions,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let fixture = std::fs::read_to_string(fixture_path)?;
        let book = InMemoryBook::from_json(&fixture)?;
        let session = SqliteSessionStore::open(db_path, fixture_path)?;
        Ok(Self::new(Arc::new(book), Box::new(session), launch))
    }

    /// The book finished loading: hides the loader and returns to the saved
    /// cursor.
    pub fn ready(&mut self) {
        self.viewer.hide_loader();
        let cursor = self.cursor.take();
        self.reader.emit(ReaderEvent::GotoBookmark(cursor));
        self.pump();
        self.sync_location();
    }

    /// Applies pending reader events to the controllers.
    pub fn pump(&mut self) {
        self.notes.sync(&mut self.reader);
        let outcome = self.bookmarks.sync(&mut self.reader);
        if outcome.current_unbookmarked {
            self.controls.bookmarked = false;
        }
        if outcome.navigated {
            self.sync_location();
        }
    }

    // ---- location ----

    /// Reads the book's position after a navigation; shows the new chapter
    /// when it changed and records the location.
    pub fn sync_location(&mut self) {
        let Some(cfi) = self.reader.book().current_location_cfi() else {
            return;
        };
        if self.reader.current_location() == Some(cfi.as_str()) {
            return;
        }
        if let Some(spine_pos) = self.reader.book().spine_index_of(&cfi) {
            if self.displayed_spine != Some(spine_pos) {
                let id = self
                    .reader
                    .book()
                    .spine()
                    .get(spine_pos)
                    .map(|item| item.id.clone())
                    .unwrap_or_default();
                self.display_chapter(spine_pos, &id);
            }
        }
        self.controls.location_changed(&mut self.reader, &cfi);
    }

    /// Runs the chapter-display hooks for a newly rendered chapter.
    pub fn display_chapter(&mut self, spine_pos: usize, id: &str) {
        tracing::debug!(spine_pos, id, "chapter displayed");
        self.displayed_spine = Some(spine_pos);
        self.reader.load_content(Document::new());
        self.notes.before_chapter_display(&mut self.reader, spine_pos);
        self.toc.chapter_displayed(id);
        self.search.on_chapter_displayed(&mut self.reader);
    }

    pub fn handle_book_event(&mut self, event: BookEvent) {
        tracing::trace!(event = event.name(), "book event");
        match event {
            BookEvent::LocationChanged(cfi) => self.controls.location_changed(&mut self.reader, &cfi),
            BookEvent::ChapterDisplayed { spine_pos, id } => self.display_chapter(spine_pos, &id),
            BookEvent::Selected(cfi) => self.reader.selected_range(&cfi),
            BookEvent::Click(caret) => {
                self.content_clicked(&caret);
            }
            BookEvent::KeyDown(key) => self.handle_key(key),
            BookEvent::Spreads(on) => self.viewer.spreads(on),
            BookEvent::PageChanged { page, percentage } => self.controls.page_changed(page, percentage),
            BookEvent::Online => self.controls.go_online(),
            BookEvent::Offline => self.controls.go_offline(),
        }
    }

    /// A click in the content. Anchors a note when annotate mode is armed.
    pub fn content_clicked(&mut self, caret: &CaretPosition) -> Option<Annotation> {
        let note = self
            .notes
            .insert_at_point(&mut self.reader, caret, &mut self.settings.touch_nav);
        self.pump();
        note
    }

    pub fn hash_changed(&mut self, fragment: &str) {
        self.reader.hash_changed(fragment);
        self.sync_location();
    }

    // ---- keyboard ----

    pub fn handle_key(&mut self, key: u32) {
        if let Some(action) = self.viewer.key_command(key) {
            self.dispatch(action);
        }
    }

    pub fn dispatch(&mut self, action: ReaderAction) {
        tracing::debug!(action = action.as_str(), "reader action");
        match action {
            ReaderAction::Next => {
                self.viewer.next(&self.reader);
                self.sync_location();
            }
            ReaderAction::Previous => {
                self.viewer.prev(&self.reader);
                self.sync_location();
            }
            ReaderAction::First => {
                self.viewer.first(&self.reader);
                self.sync_location();
            }
            ReaderAction::Last => {
                self.viewer.last(&self.reader);
                self.sync_location();
            }
            ReaderAction::Annotate => self.change_panel_to(PanelName::Notes),
            ReaderAction::Bookmark => self.toggle_bookmark(),
            ReaderAction::Reflow => self.toggle_sidebar_reflow(),
            ReaderAction::ToggleSidebar => self.toggle_sidebar(),
            ReaderAction::Toolbar => self.controls.toggle_toolbar(),
            ReaderAction::ToggleDay => self.styles.toggle_day(&mut self.reader),
            ReaderAction::ToggleNight => self.styles.toggle_night(&mut self.reader),
            ReaderAction::ToggleFullscreen => self.controls.toggle_fullscreen(),
            ReaderAction::CloseSidebar => self.hide_sidebar(),
        }
    }

    fn persist_keyboard(&mut self) {
        let table = self.viewer.shortcuts().list_shortcuts().clone();
        match serde_json::to_value(&table) {
            Ok(value) => self.reader.persist_default("keyboard", value),
            Err(e) => tracing::warn!(error = %e, "failed to encode keyboard"),
        }
        self.reader.settings.keyboard = table;
    }

    /// Binds a key to a named action and stores the table.
    pub fn bind_key(&mut self, key: u32, action: &str) -> Result<(), ShortcutError> {
        self.viewer.shortcuts_mut().register_named(key, action)?;
        self.persist_keyboard();
        Ok(())
    }

    pub fn unbind_key(&mut self, key: u32) -> Result<(), ShortcutError> {
        self.viewer.shortcuts_mut().unregister_shortcut(key)?;
        self.persist_keyboard();
        Ok(())
    }

    pub fn reset_keys(&mut self) {
        self.viewer.shortcuts_mut().reset_to_defaults();
        self.persist_keyboard();
    }

    // ---- sidebar ----

    fn with_panel<R>(&mut self, name: PanelName, f: impl FnOnce(&mut dyn Panel, &mut Reader) -> R) -> R {
        let reader = &mut self.reader;
        let panel: &mut dyn Panel = match name {
            PanelName::Toc => &mut self.toc,
            PanelName::Bookmarks => &mut self.bookmarks,
            PanelName::Notes => &mut self.notes,
            PanelName::Search => &mut self.search,
        };
        f(panel, reader)
    }

    /// Switches the sidebar to `name` and opens it.
    pub fn change_panel_to(&mut self, name: PanelName) {
        if let Some(previous) = self.sidebar.switch_to(name) {
            self.with_panel(previous, |panel, reader| panel.hide(reader));
            self.with_panel(name, |panel, reader| panel.show(reader));
        }
        self.show_sidebar();
    }

    pub fn show_sidebar(&mut self) {
        self.sidebar.show();
        if self.reader.settings.sidebar_reflow {
            self.viewer.slide_out(&self.reader);
        }
    }

    pub fn hide_sidebar(&mut self) {
        self.sidebar.hide();
        self.viewer.slide_in(&self.reader);
        self.search.unhighlight(&mut self.reader);
    }

    pub fn toggle_sidebar(&mut self) {
        if self.sidebar.is_open() {
            self.hide_sidebar();
        } else {
            self.show_sidebar();
        }
    }

    /// Settings checkbox: flips reflow and slides the viewer to match.
    pub fn toggle_sidebar_reflow(&mut self) {
        let on = self.settings.toggle_sidebar_reflow(&mut self.reader);
        if on && self.sidebar.is_open() {
            self.viewer.slide_out(&self.reader);
        }
        if !on && !self.sidebar.is_open() {
            self.viewer.slide_in(&self.reader);
        }
    }

    pub fn open_settings(&mut self) {
        self.settings.show(&mut self.reader);
    }

    pub fn close_settings(&mut self) {
        self.settings.hide(&mut self.reader);
    }

    // ---- bookmarks and notes ----

    pub fn toggle_bookmark(&mut self) {
        self.controls.toggle_bookmark(&mut self.reader);
        self.pump();
    }

    pub fn remove_bookmark(&mut self, id: &str) -> bool {
        let removed = self.bookmarks.remove(&mut self.reader, id);
        self.pump();
        removed
    }

    pub fn goto_bookmark(&mut self, id: &str) {
        self.bookmarks.goto(&self.reader, id);
        self.sync_location();
    }

    pub fn toggle_annotate(&mut self) {
        self.notes.toggle_annotate(&mut self.settings.touch_nav);
    }

    pub fn remove_note(&mut self, id: &str) {
        self.notes.remove(&mut self.reader, id);
        self.pump();
    }

    pub fn goto_note(&mut self, id: &str) {
        self.notes.goto(&self.reader, id);
        self.sync_location();
    }

    /// A note marker in the content was clicked.
    pub fn marker_clicked(&mut self) {
        self.change_panel_to(PanelName::Notes);
    }

    // ---- table of contents ----

    pub fn toc_link_clicked(&mut self, href: &str) {
        self.toc.link_clicked(&mut self.reader, href);
        self.sync_location();
    }

    // ---- search ----

    /// Runs a search over every chapter and renders the results. An empty
    /// query clears. Returns the number of results shown.
    pub async fn search(&mut self, query: &str) -> usize {
        if query.is_empty() {
            self.clear_search();
            return 0;
        }
        self.change_panel_to(PanelName::Search);
        let Some(pending) = self.search.start(&mut self.reader, query) else {
            return 0;
        };
        tracing::debug!(query, chapters = pending.chapter_count(), "search started");
        let outcome = pending.gather().await;
        self.search.apply(outcome);
        self.search.results().len()
    }

    pub fn select_search_result(&mut self, index: usize) {
        self.search.select_result(&mut self.reader, index);
        self.sync_location();
    }

    /// Empties the results; leaves the Search panel for Toc.
    pub fn clear_search(&mut self) {
        self.search.clear(&mut self.reader);
        if self.sidebar.active_panel() == PanelName::Search {
            self.change_panel_to(PanelName::Toc);
        }
    }

    // ---- view ----

    pub fn view_state(&self) -> ViewState<'_> {
        ViewState {
            location: self.reader.current_location(),
            active_panel: self.sidebar.active_panel(),
            sidebar_open: self.sidebar.is_open(),
            sidebar: &self.sidebar,
            toc: &self.toc,
            bookmarks: &self.bookmarks,
            notes: &self.notes,
            search: &self.search,
            styles: &self.styles,
            settings: &self.settings,
            controls: &self.controls,
            meta: &self.meta,
            viewer: &self.viewer,
            active_styles: self.reader.active_styles().collect(),
        }
    }

    pub fn view_json(&self) -> Value {
        serde_json::to_value(self.view_state()).unwrap_or_else(|e| json!({ "error": e.to_string() }))
    }
}
