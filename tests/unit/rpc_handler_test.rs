//! Unit tests for the RPC handler: methods dispatched by `handle_method`
//! against a reader opened from a JSON fixture with an on-disk session.

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::Mutex;

use epubreader::app::{LaunchOptions, ReaderApp};
use epubreader::rpc_handler::handle_method;
use epubreader::types::errors::RpcError;

const FIRST: &str = "epubcfi(/6/2[c1]!/4/2/1:0)";

fn fixture() -> Value {
    json!({
        "title": "Moby-Dick",
        "creator": "Herman Melville",
        "chapters": [
            {"id": "c1", "href": "c1.xhtml", "label": "Loomings",
             "text": "Call me Ishmael. Some years ago.\n\nThe whale is white."},
            {"id": "c2", "href": "c2.xhtml", "label": "The Carpet-Bag",
             "text": "A whale of a tale."}
        ]
    })
}

/// Creates a ready app from a fixture and a session database in a temp dir.
async fn setup() -> (Mutex<ReaderApp>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let book_path = tmp.path().join("book.json");
    std::fs::write(&book_path, fixture().to_string()).unwrap();
    let db_path = tmp.path().join("sessions.db");
    let launch = LaunchOptions {
        config_path: Some(tmp.path().join("reader.json").to_string_lossy().into()),
        ..LaunchOptions::default()
    };
    let app = ReaderApp::open(
        book_path.to_str().unwrap(),
        db_path.to_str().unwrap(),
        launch,
    )
    .expect("Failed to open reader");
    let app = Mutex::new(app);
    handle_method(&app, "reader.ready", &json!({})).await.unwrap();
    (app, tmp)
}

// ─── Dispatch ───

#[tokio::test]
async fn test_unknown_method() {
    let (app, _tmp) = setup().await;
    let err = handle_method(&app, "no.such", &json!({})).await.unwrap_err();
    assert!(matches!(err, RpcError::UnknownMethod(m) if m == "no.such"));
}

#[tokio::test]
async fn test_missing_param() {
    let (app, _tmp) = setup().await;
    let err = handle_method(&app, "nav.toc", &json!({})).await.unwrap_err();
    assert!(matches!(err, RpcError::InvalidParam("href")));
    assert_eq!(err.to_string(), "missing or invalid param: href");
}

#[tokio::test]
async fn test_view_get() {
    let (app, _tmp) = setup().await;
    let view = handle_method(&app, "view.get", &json!({})).await.unwrap();
    assert_eq!(view["location"], FIRST);
    assert_eq!(view["meta"]["book_title"], "Moby-Dick");
    assert_eq!(view["viewer"]["loader_visible"], false);
}

// ─── Navigation ───

#[tokio::test]
async fn test_navigation() {
    let (app, _tmp) = setup().await;
    let res = handle_method(&app, "nav.next", &json!({})).await.unwrap();
    assert_eq!(res["location"], "epubcfi(/6/2[c1]!/4/4/1:0)");
    let res = handle_method(&app, "nav.last", &json!({})).await.unwrap();
    assert_eq!(res["location"], "epubcfi(/6/4[c2]!/4/2/1:0)");
    let res = handle_method(&app, "nav.first", &json!({})).await.unwrap();
    assert_eq!(res["location"], FIRST);
    let res = handle_method(&app, "nav.toc", &json!({"href": "c2.xhtml"})).await.unwrap();
    assert_eq!(res["location"], "epubcfi(/6/4[c2]!/4/2/1:0)");
}

#[tokio::test]
async fn test_key_press_and_bindings() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "key.bind", &json!({"key": 76, "action": "last"})).await.unwrap();
    handle_method(&app, "key.press", &json!({"key": 76})).await.unwrap();
    let view = handle_method(&app, "view.get", &json!({})).await.unwrap();
    assert_eq!(view["location"], "epubcfi(/6/4[c2]!/4/2/1:0)");

    let table = handle_method(&app, "key.list", &json!({})).await.unwrap();
    assert_eq!(table["76"], "last");

    let err = handle_method(&app, "key.bind", &json!({"key": 39, "action": "previous"}))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Shortcut(_)));

    let err = handle_method(&app, "action", &json!({"name": "fly"})).await.unwrap_err();
    assert!(matches!(err, RpcError::NotFound(_)));
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_toggle_and_list() {
    let (app, _tmp) = setup().await;
    let res = handle_method(&app, "bookmark.toggle", &json!({})).await.unwrap();
    assert_eq!(res["bookmarked"], true);

    let list = handle_method(&app, "bookmark.list", &json!({})).await.unwrap();
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["type"], "bookmark");
    assert_eq!(list[0]["anchor"], FIRST);

    let res = handle_method(&app, "bookmark.toggle", &json!({})).await.unwrap();
    assert_eq!(res["bookmarked"], false);
    let list = handle_method(&app, "bookmark.list", &json!({})).await.unwrap();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bookmark_add_remove() {
    let (app, _tmp) = setup().await;
    let cfi = "epubcfi(/6/4[c2]!/4/2/1:2)";
    let added = handle_method(&app, "bookmark.add", &json!({"cfi": cfi})).await.unwrap();
    let id = added["id"].as_str().unwrap().to_string();
    assert_eq!(added["body"], "whale of a tale.");

    let res = handle_method(&app, "bookmark.goto", &json!({"id": id})).await.unwrap();
    assert_eq!(res["location"], cfi);

    handle_method(&app, "bookmark.remove", &json!({"id": id})).await.unwrap();
    let err = handle_method(&app, "bookmark.remove", &json!({"id": id})).await.unwrap_err();
    assert!(matches!(err, RpcError::NotFound(_)));
}

#[tokio::test]
async fn test_bookmark_clear_keeps_notes() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "bookmark.toggle", &json!({})).await.unwrap();
    handle_method(&app, "note.text", &json!({"text": "n"})).await.unwrap();
    handle_method(&app, "note.annotate", &json!({})).await.unwrap();
    let caret = json!({"node": {"type": "text", "path": "/4/2/1", "text": "Call me Ishmael."}, "offset": 0});
    handle_method(&app, "note.click", &json!({"caret": caret})).await.unwrap();

    handle_method(&app, "bookmark.clear", &json!({})).await.unwrap();
    let bookmarks = handle_method(&app, "bookmark.list", &json!({})).await.unwrap();
    let notes = handle_method(&app, "note.list", &json!({})).await.unwrap();
    assert!(bookmarks.as_array().unwrap().is_empty());
    assert_eq!(notes.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bookmark_remove_refuses_notes() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "note.text", &json!({"text": "n"})).await.unwrap();
    handle_method(&app, "note.annotate", &json!({})).await.unwrap();
    let caret = json!({"node": {"type": "text", "path": "/4/2/1", "text": "Call me Ishmael."}, "offset": 0});
    let note = handle_method(&app, "note.click", &json!({"caret": caret})).await.unwrap();
    let id = note["id"].as_str().unwrap().to_string();

    let err = handle_method(&app, "bookmark.remove", &json!({"id": id})).await.unwrap_err();
    assert!(matches!(err, RpcError::NotFound(_)));
    let notes = handle_method(&app, "note.list", &json!({})).await.unwrap();
    assert_eq!(notes.as_array().unwrap().len(), 1);
}

// ─── Notes ───

#[tokio::test]
async fn test_note_flow() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "note.text", &json!({"text": "first thought"})).await.unwrap();
    let armed = handle_method(&app, "note.annotate", &json!({})).await.unwrap();
    assert_eq!(armed, json!({"armed": true, "icon": "icon-location_off"}));

    let caret = json!({"node": {"type": "text", "path": "/4/2/1", "text": "Call me Ishmael. Some years ago."}, "offset": 4});
    let note = handle_method(&app, "note.click", &json!({"caret": caret})).await.unwrap();
    assert_eq!(note["anchor"], "epubcfi(/6/2[c1]!/4/2/1:16)");
    assert_eq!(note["body"], "first thought");
    let id = note["id"].as_str().unwrap().to_string();

    handle_method(&app, "note.edit", &json!({"id": id})).await.unwrap();
    handle_method(&app, "note.input", &json!({"id": id, "text": "second thought"})).await.unwrap();
    handle_method(&app, "note.save", &json!({"id": id})).await.unwrap();
    let notes = handle_method(&app, "note.list", &json!({})).await.unwrap();
    assert_eq!(notes[0]["body"], "second thought");

    handle_method(&app, "note.remove", &json!({"id": id})).await.unwrap();
    let notes = handle_method(&app, "note.list", &json!({})).await.unwrap();
    assert!(notes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_note_click_requires_caret() {
    let (app, _tmp) = setup().await;
    let err = handle_method(&app, "note.click", &json!({"caret": 5})).await.unwrap_err();
    assert!(matches!(err, RpcError::InvalidParam("caret")));
}

// ─── Search ───

#[tokio::test]
async fn test_search_select_clear() {
    let (app, _tmp) = setup().await;
    let res = handle_method(&app, "search.run", &json!({"query": "whale"})).await.unwrap();
    assert_eq!(res["count"], 2);
    assert_eq!(res["results"][0]["id"], "search-0");
    assert_eq!(res["results"][1]["cfi"], "epubcfi(/6/4[c2]!/4/2/1:2)");

    let res = handle_method(&app, "search.select", &json!({"index": 1})).await.unwrap();
    assert_eq!(res["location"], "epubcfi(/6/4[c2]!/4/2/1:2)");

    handle_method(&app, "search.clear", &json!({})).await.unwrap();
    let view = handle_method(&app, "view.get", &json!({})).await.unwrap();
    assert_eq!(view["active_panel"], "Toc");
    assert!(view["search"]["results"].as_array().unwrap().is_empty());
}

// ─── Panels ───

#[tokio::test]
async fn test_panels_and_sidebar() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "panel.change", &json!({"name": "Notes"})).await.unwrap();
    let res = handle_method(&app, "sidebar.toggle", &json!({})).await.unwrap();
    assert_eq!(res["open"], false);
    let res = handle_method(&app, "sidebar.toggle", &json!({})).await.unwrap();
    assert_eq!(res["open"], true);

    let err = handle_method(&app, "panel.change", &json!({"name": "Index"})).await.unwrap_err();
    assert!(matches!(err, RpcError::NotFound(_)));
}

// ─── Styles ───

#[tokio::test]
async fn test_style_set() {
    let (app, _tmp) = setup().await;
    let form = handle_method(&app, "style.set", &json!({"name": "pageWidth", "value": 40}))
        .await
        .unwrap();
    assert_eq!(form["page_width"], 40);

    handle_method(&app, "style.set", &json!({"name": "useCustomColors", "value": true}))
        .await
        .unwrap();
    let styles = handle_method(&app, "style.list", &json!({})).await.unwrap();
    assert_eq!(styles["styles"]["pageWidth"]["rules"]["max-width"], "40em");
    assert!(styles["active"].as_array().unwrap().contains(&json!("dayMode")));

    let err = handle_method(&app, "style.set", &json!({"name": "dayColor", "value": "blue"}))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Settings(_)));

    let err = handle_method(&app, "style.set", &json!({"name": "kerning", "value": 1}))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::NotFound(_)));
}

#[tokio::test]
async fn test_night_shift() {
    let (app, _tmp) = setup().await;
    let res = handle_method(&app, "style.nightShift", &json!({})).await.unwrap();
    assert_eq!(res["nightMode"], true);
    let res = handle_method(&app, "style.nightShift", &json!({})).await.unwrap();
    assert_eq!(res["nightMode"], false);
}

// ─── Settings ───

#[tokio::test]
async fn test_settings_methods() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "settings.open", &json!({})).await.unwrap();
    let res = handle_method(&app, "settings.isOpen", &json!({})).await.unwrap();
    assert_eq!(res["open"], true);

    let res = handle_method(&app, "settings.reflow", &json!({})).await.unwrap();
    assert_eq!(res["sidebarReflow"], true);
    let res = handle_method(&app, "settings.pageArrows", &json!({"on": true})).await.unwrap();
    assert_eq!(res["translucent"], false);

    let settings = handle_method(&app, "settings.get", &json!({})).await.unwrap();
    assert_eq!(settings["pageArrows"], true);
    assert_eq!(settings["sidebarReflow"], true);

    handle_method(&app, "settings.close", &json!({})).await.unwrap();
    let res = handle_method(&app, "settings.isOpen", &json!({})).await.unwrap();
    assert_eq!(res["open"], false);
}

// ─── Book events ───

#[tokio::test]
async fn test_book_event() {
    let (app, _tmp) = setup().await;
    handle_method(&app, "book.event", &json!({"event": "spreads", "payload": true}))
        .await
        .unwrap();
    let view = handle_method(&app, "view.get", &json!({})).await.unwrap();
    assert_eq!(view["viewer"]["divider_visible"], true);

    let err = handle_method(&app, "book.event", &json!({"event": "explode"}))
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::InvalidParam("event")));
}
