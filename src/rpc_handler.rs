//! RPC method handler for the reader JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. `handle_method`
//! dispatches a method call to the `ReaderApp` and returns the result value.

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::ReaderApp;
use crate::book::CaretPosition;
use crate::controllers::{Panel, PanelName};
use crate::events::BookEvent;
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::types::annotation::AnnotationKind;
use crate::types::errors::RpcError;
use crate::types::settings::ReaderAction;

fn str_param<'a>(params: &'a Value, key: &'static str) -> Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or(RpcError::InvalidParam(key))
}

fn u64_param(params: &Value, key: &'static str) -> Result<u64, RpcError> {
    params
        .get(key)
        .and_then(Value::as_u64)
        .ok_or(RpcError::InvalidParam(key))
}

fn bool_param(params: &Value, key: &'static str) -> Result<bool, RpcError> {
    params
        .get(key)
        .and_then(Value::as_bool)
        .ok_or(RpcError::InvalidParam(key))
}

fn u32_param(params: &Value, key: &'static str) -> Result<u32, RpcError> {
    u32::try_from(u64_param(params, key)?).map_err(|_| RpcError::InvalidParam(key))
}

fn ok() -> Value {
    json!({"ok": true})
}

fn annotations_json(app: &ReaderApp, kind: AnnotationKind) -> Value {
    json!(app.reader.annotations(Some(kind)))
}

/// Dispatch a JSON-RPC method call to the reader.
pub async fn handle_method(app: &Mutex<ReaderApp>, method: &str, params: &Value) -> Result<Value, RpcError> {
    let mut a = app.lock().await;
    match method {
        // ─── Lifecycle and view ───
        "reader.ready" => {
            a.ready();
            Ok(a.view_json())
        }
        "view.get" => Ok(a.view_json()),
        "book.event" => {
            let event: BookEvent = serde_json::from_value(params.clone())
                .map_err(|_| RpcError::InvalidParam("event"))?;
            a.handle_book_event(event);
            Ok(ok())
        }

        // ─── Navigation ───
        "nav.next" => {
            a.dispatch(ReaderAction::Next);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "nav.prev" => {
            a.dispatch(ReaderAction::Previous);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "nav.first" => {
            a.dispatch(ReaderAction::First);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "nav.last" => {
            a.dispatch(ReaderAction::Last);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "nav.hash" => {
            let fragment = str_param(params, "fragment")?;
            a.hash_changed(fragment);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "nav.toc" => {
            let href = str_param(params, "href")?;
            a.toc_link_clicked(href);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "toc.toggle" => {
            let id = str_param(params, "id")?;
            a.toc.toggle(id);
            Ok(ok())
        }

        // ─── Keys ───
        "key.press" => {
            let key = u32_param(params, "key")?;
            a.handle_key(key);
            Ok(ok())
        }
        "key.bind" => {
            let key = u32_param(params, "key")?;
            let action = str_param(params, "action")?;
            a.bind_key(key, action)?;
            Ok(ok())
        }
        "key.unbind" => {
            let key = u32_param(params, "key")?;
            a.unbind_key(key)?;
            Ok(ok())
        }
        "key.reset" => {
            a.reset_keys();
            Ok(ok())
        }
        "key.list" => {
            let table = a.viewer.shortcuts().list_shortcuts();
            Ok(json!(table))
        }
        "action" => {
            let name = str_param(params, "name")?;
            let action = ReaderAction::parse(name).ok_or_else(|| RpcError::NotFound(name.to_string()))?;
            a.dispatch(action);
            Ok(ok())
        }

        // ─── Bookmarks ───
        "bookmark.toggle" => {
            a.toggle_bookmark();
            Ok(json!({"bookmarked": a.controls.bookmarked}))
        }
        "bookmark.add" => {
            let cfi = str_param(params, "cfi")?;
            let bookmark = a.reader.add_bookmark(cfi);
            a.pump();
            Ok(json!(bookmark))
        }
        "bookmark.list" => Ok(annotations_json(&a, AnnotationKind::Bookmark)),
        "bookmark.remove" => {
            let id = str_param(params, "id")?;
            if !a.remove_bookmark(id) {
                return Err(RpcError::NotFound(id.to_string()));
            }
            Ok(ok())
        }
        "bookmark.goto" => {
            let id = str_param(params, "id")?;
            a.goto_bookmark(id);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "bookmark.clear" => {
            a.reader.clear_bookmarks();
            a.pump();
            Ok(ok())
        }

        // ─── Notes ───
        "note.annotate" => {
            a.toggle_annotate();
            Ok(json!({"armed": a.notes.is_armed(), "icon": a.notes.anchor_icon()}))
        }
        "note.text" => {
            a.notes.text = str_param(params, "text")?.to_string();
            Ok(ok())
        }
        "note.click" => {
            let caret: CaretPosition = params
                .get("caret")
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .ok_or(RpcError::InvalidParam("caret"))?;
            let note = a.content_clicked(&caret);
            Ok(json!(note))
        }
        "note.list" => Ok(annotations_json(&a, AnnotationKind::Annotation)),
        "note.edit" => {
            let id = str_param(params, "id")?;
            a.notes.open_editor(id);
            Ok(ok())
        }
        "note.input" => {
            let id = str_param(params, "id")?;
            let text = str_param(params, "text")?;
            a.notes.edit_text(id, text);
            Ok(ok())
        }
        "note.save" => {
            let id = str_param(params, "id")?;
            let a = &mut *a;
            a.notes.save(&mut a.reader, id);
            Ok(ok())
        }
        "note.cancel" => {
            let id = str_param(params, "id")?;
            let a = &mut *a;
            a.notes.cancel(&a.reader, id);
            Ok(ok())
        }
        "note.remove" => {
            let id = str_param(params, "id")?;
            a.remove_note(id);
            Ok(ok())
        }
        "note.goto" => {
            let id = str_param(params, "id")?;
            a.goto_note(id);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "note.marker" => {
            a.marker_clicked();
            Ok(ok())
        }

        // ─── Search ───
        "search.run" => {
            let query = str_param(params, "query")?;
            let count = a.search(query).await;
            Ok(json!({"count": count, "results": a.search.results()}))
        }
        "search.select" => {
            let index = u64_param(params, "index")? as usize;
            a.select_search_result(index);
            Ok(json!({"location": a.reader.current_location()}))
        }
        "search.clear" => {
            a.clear_search();
            Ok(ok())
        }

        // ─── Panels ───
        "panel.change" => {
            let name = str_param(params, "name")?;
            let panel = PanelName::parse(name).ok_or_else(|| RpcError::NotFound(name.to_string()))?;
            a.change_panel_to(panel);
            Ok(ok())
        }
        "sidebar.show" => {
            a.show_sidebar();
            Ok(ok())
        }
        "sidebar.hide" => {
            a.hide_sidebar();
            Ok(ok())
        }
        "sidebar.toggle" => {
            a.toggle_sidebar();
            Ok(json!({"open": a.sidebar.is_open()}))
        }

        // ─── Styles ───
        "style.set" => {
            let name = str_param(params, "name")?;
            let a = &mut *a;
            let (styles, reader) = (&mut a.styles, &mut a.reader);
            match name {
                "dayBackground" => styles.set_day_background(reader, str_param(params, "value")?)?,
                "dayColor" => styles.set_day_color(reader, str_param(params, "value")?)?,
                "nightBackground" => styles.set_night_background(reader, str_param(params, "value")?)?,
                "nightColor" => styles.set_night_color(reader, str_param(params, "value")?)?,
                "useCustomColors" => styles.set_use_custom_colors(reader, bool_param(params, "value")?),
                "customFontFamily" => styles.set_custom_font_family(reader, bool_param(params, "value")?),
                "fontFamily" => styles.set_font_family(reader, str_param(params, "value")?),
                "customFontSize" => styles.set_custom_font_size(reader, bool_param(params, "value")?),
                "fontSize" => styles.set_font_size(reader, u32_param(params, "value")?),
                "customFontWeight" => styles.set_custom_font_weight(reader, bool_param(params, "value")?),
                "fontWeight" => styles.set_font_weight(reader, str_param(params, "value")?),
                "pageWidth" => styles.set_page_width(reader, u32_param(params, "value")?),
                "maximizePage" => styles.set_maximize_page(reader, bool_param(params, "value")?),
                other => return Err(RpcError::NotFound(other.to_string())),
            }
            Ok(json!(a.styles))
        }
        "style.nightShift" => {
            a.dispatch(ReaderAction::ToggleNight);
            Ok(json!({"nightMode": a.reader.settings.night_mode}))
        }
        "style.list" => {
            let active: Vec<&str> = a.reader.active_styles().collect();
            Ok(json!({"styles": a.reader.styles(), "active": active}))
        }

        // ─── Settings ───
        "settings.get" => Ok(json!(a.reader.settings)),
        "settings.open" => {
            a.open_settings();
            Ok(ok())
        }
        "settings.close" => {
            a.close_settings();
            Ok(ok())
        }
        "settings.reflow" => {
            a.toggle_sidebar_reflow();
            Ok(json!({"sidebarReflow": a.reader.settings.sidebar_reflow}))
        }
        "settings.touchNav" => {
            let on = bool_param(params, "on")?;
            a.settings.set_touch_nav(on);
            Ok(ok())
        }
        "settings.pageArrows" => {
            let on = bool_param(params, "on")?;
            let a = &mut *a;
            a.settings.set_page_arrows(&mut a.reader, on);
            Ok(json!({"translucent": a.settings.arrows_translucent(&a.reader)}))
        }
        "settings.isOpen" => Ok(json!({"open": a.settings.is_open()})),

        _ => Err(RpcError::UnknownMethod(method.to_string())),
    }
}
