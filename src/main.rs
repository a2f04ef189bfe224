//! epubreader: reader shell for an EPUB rendering library.
//!
//! Entry point: runs a console demo of the shell against an in-memory book
//! and an in-memory session database.

use std::sync::Arc;

use epubreader::app::{LaunchOptions, ReaderApp};
use epubreader::book::memory::{paragraph_path, MemoryChapter};
use epubreader::book::{CaretNode, CaretPosition, InMemoryBook, Metadata, TextNode};
use epubreader::controllers::PanelName;
use epubreader::managers::session_manager::SqliteSessionStore;
use epubreader::types::annotation::AnnotationKind;
use tracing_subscriber::EnvFilter;

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📖 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn sample_book() -> InMemoryBook {
    InMemoryBook::new(
        Metadata {
            book_title: "Moby-Dick".into(),
            creator: "Herman Melville".into(),
            ..Metadata::default()
        },
        vec![
            MemoryChapter {
                id: "loomings".into(),
                href: "ch001.xhtml".into(),
                label: "Loomings".into(),
                text: "Call me Ishmael. Some years ago, never mind how long precisely, \
                       having little or no money in my purse, I thought I would sail about.\n\n\
                       It is a way I have of driving off the spleen."
                    .into(),
            },
            MemoryChapter {
                id: "carpet-bag".into(),
                href: "ch002.xhtml".into(),
                label: "The Carpet-Bag".into(),
                text: "I stuffed a shirt or two into my old carpet-bag, tucked it under my arm, \
                       and started for Cape Horn and the Pacific.\n\n\
                       Quitting the good city of old Manhatto, I duly arrived in New Bedford."
                    .into(),
            },
        ],
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("epubreader=warn")),
        )
        .init();

    println!();
    println!("  epubreader v{} Demo Mode", env!("CARGO_PKG_VERSION"));
    println!();

    let session = SqliteSessionStore::in_memory("moby-dick")?;
    let launch = LaunchOptions {
        config_path: Some(std::env::temp_dir().join("epubreader-demo.json").to_string_lossy().into()),
        query: "?pageArrows=true".into(),
        ..LaunchOptions::default()
    };
    let mut app = ReaderApp::new(Arc::new(sample_book()), Box::new(session), launch);
    app.ready();

    section("Meta");
    println!("  Title: {}", app.meta.document_title);
    println!("  Page arrows from query: {}", app.reader.settings.page_arrows);
    println!();

    section("Paging");
    app.handle_key(39);
    app.handle_key(39);
    println!("  Location: {:?}", app.reader.current_location());
    let current: Vec<_> = app.toc.items().iter().filter(|i| i.current).map(|i| i.label.clone()).collect();
    println!("  Current chapter: {:?}", current);
    println!();

    section("Bookmarks");
    app.toggle_bookmark();
    println!("  Icon: {}", app.controls.bookmark_icon());
    for item in app.bookmarks.items().items() {
        println!("  • {}: {}", item.id, item.text);
    }
    println!();

    section("Notes");
    app.notes.text = "Ishmael introduces himself".into();
    app.handle_key(36);
    app.toggle_annotate();
    let caret = CaretPosition {
        node: CaretNode::Text(TextNode {
            path: paragraph_path(0),
            text: "Call me Ishmael. Some years ago".into(),
        }),
        offset: 3,
    };
    if let Some(note) = app.content_clicked(&caret) {
        println!("  Anchored at {}", note.anchor);
    }
    if let Some(content) = app.reader.content() {
        for marker in content.markers() {
            println!("  Marker {} labelled {}", marker.id, marker.label);
        }
    }
    println!(
        "  {} note(s), {} bookmark(s)",
        app.reader.annotations(Some(AnnotationKind::Annotation)).len(),
        app.reader.annotations(Some(AnnotationKind::Bookmark)).len()
    );
    println!();

    section("Search");
    let found = app.search("old").await;
    println!("  {} result(s) for \"old\"", found);
    for item in app.search.results() {
        println!("  • {} {}", item.id, item.excerpt);
    }
    app.clear_search();
    println!("  Panel after clear: {:?}", app.sidebar.active_panel());
    println!();

    section("Styles");
    app.styles.set_use_custom_colors(&mut app.reader, true);
    app.styles.set_day_background(&mut app.reader, "#fdf6e3")?;
    app.styles.toggle_night(&mut app.reader);
    let active: Vec<_> = app.reader.active_styles().collect();
    println!("  Active styles: {}", active.join(", "));
    if let Some(sheet) = app.reader.host().get_style_sheet("dayMode") {
        println!("  Host rule: {}", sheet.rules.join(" "));
    }
    println!();

    section("Panels");
    app.change_panel_to(PanelName::Bookmarks);
    println!("  Active: {:?}, open: {}", app.sidebar.active_panel(), app.sidebar.is_open());
    app.handle_key(27);
    println!("  After Escape, open: {}", app.sidebar.is_open());
    println!();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Reader shell demonstrated");
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}
