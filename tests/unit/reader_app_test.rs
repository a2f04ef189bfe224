//! Unit tests for `ReaderApp`: key dispatch, location tracking, bookmarks,
//! panels and session restore across launches.

use std::path::Path;
use std::sync::Arc;

use epubreader::app::{LaunchOptions, ReaderApp};
use epubreader::book::memory::{paragraph_path, MemoryChapter};
use epubreader::book::{CaretNode, CaretPosition, InMemoryBook, Metadata, TextNode};
use epubreader::controllers::PanelName;
use epubreader::events::BookEvent;
use epubreader::managers::session_manager::{SessionStore, SqliteSessionStore};
use epubreader::managers::shortcut_manager::ShortcutManagerTrait;
use epubreader::types::annotation::AnnotationKind;
use epubreader::types::settings::ReaderAction;
use tempfile::TempDir;

const FIRST: &str = "epubcfi(/6/2[c1]!/4/2/1:0)";

fn book() -> InMemoryBook {
    InMemoryBook::new(
        Metadata {
            book_title: "Moby-Dick".into(),
            creator: "Herman Melville".into(),
            ..Metadata::default()
        },
        vec![
            MemoryChapter {
                id: "c1".into(),
                href: "c1.xhtml".into(),
                label: "Loomings".into(),
                text: "Call me Ishmael. Some years ago.\n\nIt is a way I have.".into(),
            },
            MemoryChapter {
                id: "c2".into(),
                href: "c2.xhtml".into(),
                label: "The Carpet-Bag".into(),
                text: "I stuffed a shirt or two into my old carpet-bag.".into(),
            },
            MemoryChapter {
                id: "c3".into(),
                href: "c3.xhtml".into(),
                label: "The Spouter-Inn".into(),
                text: "Entering that gable-ended Spouter-Inn.".into(),
            },
        ],
    )
}

fn launch(query: &str) -> LaunchOptions {
    LaunchOptions {
        config_path: Some("/nonexistent/epubreader-test.json".into()),
        query: query.into(),
        ..LaunchOptions::default()
    }
}

fn app_with(session: Box<dyn SessionStore>, query: &str) -> ReaderApp {
    let mut app = ReaderApp::new(Arc::new(book()), session, launch(query));
    app.ready();
    app
}

fn app() -> ReaderApp {
    app_with(Box::new(SqliteSessionStore::in_memory("moby").unwrap()), "")
}

fn file_app(db: &Path) -> ReaderApp {
    app_with(Box::new(SqliteSessionStore::open(db, "moby").unwrap()), "")
}

fn current_toc(app: &ReaderApp) -> Vec<String> {
    app.toc
        .items()
        .iter()
        .filter(|item| item.current)
        .map(|item| item.id.clone())
        .collect()
}

#[test]
fn test_ready_displays_first_chapter() {
    let app = app();
    assert!(!app.viewer.loader_visible);
    assert_eq!(app.reader.current_location(), Some(FIRST));
    assert_eq!(current_toc(&app), vec!["toc-c1"]);
    assert_eq!(app.meta.document_title, "Moby-Dick – Herman Melville");
}

#[test]
fn test_paging_keys_follow_chapters() {
    let mut app = app();
    app.handle_key(39);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/2[c1]!/4/4/1:0)"));
    app.handle_key(32);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/4[c2]!/4/2/1:0)"));
    assert_eq!(current_toc(&app), vec!["toc-c2"]);

    app.handle_key(37);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/2[c1]!/4/4/1:0)"));
    assert_eq!(current_toc(&app), vec!["toc-c1"]);
}

#[test]
fn test_first_and_last_keys() {
    let mut app = app();
    app.handle_key(35);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/6[c3]!/4/2/1:0)"));
    app.handle_key(36);
    assert_eq!(app.reader.current_location(), Some(FIRST));
}

#[test]
fn test_unbound_key_does_nothing() {
    let mut app = app();
    app.handle_key(90);
    assert_eq!(app.reader.current_location(), Some(FIRST));
}

#[test]
fn test_bookmark_key_toggles_icon_and_list() {
    let mut app = app();
    app.handle_key(66);
    assert!(app.controls.bookmarked);
    assert_eq!(app.controls.bookmark_icon(), "icon-turned_in");
    assert_eq!(app.bookmarks.items().len(), 1);
    assert_eq!(app.bookmarks.items().items()[0].text, "Call me Ishmael. Some years ago.");

    app.handle_key(66);
    assert!(!app.controls.bookmarked);
    assert!(app.bookmarks.items().is_empty());
}

#[test]
fn test_removing_current_bookmark_resets_icon() {
    let mut app = app();
    app.toggle_bookmark();
    let id = app.reader.cfi_to_id(FIRST);
    app.remove_bookmark(&id);
    assert!(!app.controls.bookmarked);
    assert!(app.reader.annotations(Some(AnnotationKind::Bookmark)).is_empty());
}

#[test]
fn test_location_change_reports_bookmark() {
    let mut app = app();
    app.toggle_bookmark();
    app.handle_key(39);
    assert!(!app.controls.bookmarked);
    app.handle_key(37);
    assert!(app.controls.bookmarked);
}

#[test]
fn test_goto_bookmark_from_list() {
    let mut app = app();
    app.handle_key(35);
    app.toggle_bookmark();
    app.handle_key(36);
    let id = app.bookmarks.items().items()[0].id.clone();
    app.goto_bookmark(&id);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/6[c3]!/4/2/1:0)"));
    assert_eq!(current_toc(&app), vec!["toc-c3"]);
}

#[test]
fn test_panels_and_escape() {
    let mut app = app();
    assert!(!app.sidebar.is_open());
    app.change_panel_to(PanelName::Bookmarks);
    assert!(app.sidebar.is_open());
    assert_eq!(app.sidebar.active_panel(), PanelName::Bookmarks);

    app.handle_key(27);
    assert!(!app.sidebar.is_open());
    assert_eq!(app.sidebar.active_panel(), PanelName::Bookmarks);

    app.handle_key(83);
    assert!(app.sidebar.is_open());
}

#[test]
fn test_annotate_key_opens_notes_panel() {
    let mut app = app();
    app.dispatch(ReaderAction::Annotate);
    assert_eq!(app.sidebar.active_panel(), PanelName::Notes);
    assert!(app.sidebar.is_open());
}

#[test]
fn test_toolbar_and_fullscreen_keys() {
    let mut app = app();
    app.handle_key(84);
    assert!(!app.controls.toolbar_visible);
    app.handle_key(70);
    assert!(app.controls.fullscreen);
}

#[test]
fn test_reflow_slides_viewer_with_sidebar() {
    let mut app = app();
    app.show_sidebar();
    assert!(!app.viewer.viewer_resized);

    app.toggle_sidebar_reflow();
    assert!(app.reader.settings.sidebar_reflow);
    assert!(app.viewer.viewer_resized);

    app.hide_sidebar();
    assert!(!app.viewer.viewer_resized);
    assert_eq!(app.reader.current_location(), Some(FIRST));
}

#[test]
fn test_note_inserted_through_content_click() {
    let mut app = app();
    app.settings.touch_nav = true;
    app.notes.text = "Ishmael".into();
    app.toggle_annotate();
    assert!(!app.settings.touch_nav);

    let caret = CaretPosition {
        node: CaretNode::Text(TextNode {
            path: paragraph_path(0),
            text: "Call me Ishmael. Some years ago.".into(),
        }),
        offset: 2,
    };
    let note = app.content_clicked(&caret).unwrap();
    assert_eq!(note.anchor, "epubcfi(/6/2[c1]!/4/2/1:16)");
    assert!(app.settings.touch_nav);
    assert_eq!(app.notes.items().len(), 1);

    app.marker_clicked();
    assert_eq!(app.sidebar.active_panel(), PanelName::Notes);

    app.remove_note(&note.id);
    assert!(app.notes.items().is_empty());
    assert!(app.reader.content().unwrap().markers().is_empty());
}

#[test]
fn test_book_events() {
    let mut app = app();
    app.handle_book_event(BookEvent::Spreads(true));
    assert!(app.viewer.divider_visible);
    app.handle_book_event(BookEvent::Offline);
    assert!(app.controls.offline);
    app.handle_book_event(BookEvent::KeyDown(35));
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/6[c3]!/4/2/1:0)"));
}

#[test]
fn test_toc_link_and_hash_navigation() {
    let mut app = app();
    app.toc_link_clicked("c2.xhtml");
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/4[c2]!/4/2/1:0)"));
    assert_eq!(current_toc(&app), vec!["toc-c2"]);

    app.hash_changed("#epubcfi(/6/6[c3]!/4/2/1:5)");
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/6[c3]!/4/2/1:5)"));
}

#[test]
fn test_query_overrides_settings() {
    let app = app_with(
        Box::new(SqliteSessionStore::in_memory("moby").unwrap()),
        "?pageArrows=true&maxWidth=50",
    );
    assert!(app.reader.settings.page_arrows);
    assert!(!app.settings.arrows_translucent(&app.reader));
    assert_eq!(app.styles.page_width, 50);
}

#[test]
fn test_view_json_shape() {
    let mut app = app();
    app.change_panel_to(PanelName::Search);
    let view = app.view_json();
    assert_eq!(view["location"], FIRST);
    assert_eq!(view["active_panel"], "Search");
    assert_eq!(view["sidebar_open"], true);
    assert_eq!(view["controls"]["toolbar_visible"], true);
    assert!(view["toc"]["items"].is_array());
}

#[test]
fn test_cursor_restored_on_next_launch() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("sessions.db");
    {
        let mut app = file_app(&db);
        app.handle_key(35);
    }
    let app = file_app(&db);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/6[c3]!/4/2/1:0)"));
    assert_eq!(current_toc(&app), vec!["toc-c3"]);
}

#[test]
fn test_annotations_and_reflow_restored_on_next_launch() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("sessions.db");
    {
        let mut app = file_app(&db);
        app.toggle_bookmark();
        app.toggle_sidebar_reflow();
    }
    let app = file_app(&db);
    assert_eq!(app.bookmarks.items().len(), 1);
    assert!(app.controls.bookmarked);
    assert!(app.reader.settings.sidebar_reflow);
}

#[test]
fn test_key_bindings_persist() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("sessions.db");
    {
        let mut app = file_app(&db);
        app.bind_key(76, "last").unwrap();
        app.unbind_key(84).unwrap();
        assert!(app.bind_key(39, "previous").is_err());
        assert_eq!(app.reader.settings.keyboard.get(&76), Some(&ReaderAction::Last));
    }
    let mut app = file_app(&db);
    assert_eq!(app.viewer.shortcuts().get_action(76), Some(ReaderAction::Last));
    assert_eq!(app.viewer.shortcuts().get_action(84), None);

    app.handle_key(76);
    assert_eq!(app.reader.current_location(), Some("epubcfi(/6/6[c3]!/4/2/1:0)"));

    app.reset_keys();
    assert_eq!(app.viewer.shortcuts().get_action(76), None);
    assert_eq!(app.reader.settings.keyboard.len(), 16);
}
