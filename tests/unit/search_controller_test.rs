//! Unit tests for the search panel: spine-ordered results, stale-result
//! discarding and highlighting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use epubreader::app::{LaunchOptions, ReaderApp};
use epubreader::book::memory::MemoryChapter;
use epubreader::book::{
    Book, InMemoryBook, LoadedChapter, Metadata, SpineItem, TextNode, TextPosition, TocEntry,
};
use epubreader::controllers::{PanelName, SearchController};
use epubreader::managers::session_manager::SqliteSessionStore;
use epubreader::reader::Reader;
use epubreader::types::errors::BookError;
use epubreader::types::settings::ReaderSettings;

/// Book whose early chapters load slowly, counting every chapter load.
struct DelayedBook {
    inner: InMemoryBook,
    loads: AtomicUsize,
}

impl DelayedBook {
    fn new() -> Self {
        let chapters = (0..4)
            .map(|i| MemoryChapter {
                id: format!("c{}", i),
                href: format!("c{}.xhtml", i),
                label: format!("Chapter {}", i),
                text: format!("The whale in chapter {}.\n\nAnother whale here.", i),
            })
            .collect();
        Self {
            inner: InMemoryBook::new(Metadata::default(), chapters),
            loads: AtomicUsize::new(0),
        }
    }
}

impl Book for DelayedBook {
    fn metadata(&self) -> Metadata {
        self.inner.metadata()
    }
    fn toc(&self) -> Vec<TocEntry> {
        self.inner.toc()
    }
    fn spine(&self) -> Vec<SpineItem> {
        self.inner.spine()
    }
    fn load_chapter(&self, item: &SpineItem) -> Result<Box<dyn LoadedChapter>, BookError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        // Earlier chapters finish last.
        std::thread::sleep(Duration::from_millis(20 * (4 - item.index as u64)));
        self.inner.load_chapter(item)
    }
    fn goto_cfi(&self, cfi: &str) -> Result<(), BookError> {
        self.inner.goto_cfi(cfi)
    }
    fn goto(&self, href: &str) -> Result<(), BookError> {
        self.inner.goto(href)
    }
    fn next_page(&self) {
        self.inner.next_page()
    }
    fn prev_page(&self) {
        self.inner.prev_page()
    }
    fn current_location_cfi(&self) -> Option<String> {
        self.inner.current_location_cfi()
    }
    fn spine_index_of(&self, cfi: &str) -> Option<usize> {
        self.inner.spine_index_of(cfi)
    }
    fn text_at(&self, cfi: &str) -> Option<TextPosition> {
        self.inner.text_at(cfi)
    }
    fn cfi_from_text_node(
        &self,
        spine_pos: usize,
        node: &TextNode,
        offset: usize,
    ) -> Result<String, BookError> {
        self.inner.cfi_from_text_node(spine_pos, node, offset)
    }
}

fn reader(book: Arc<DelayedBook>) -> Reader {
    Reader::new(
        ReaderSettings::default(),
        book,
        Box::new(SqliteSessionStore::in_memory("search").unwrap()),
    )
}

#[tokio::test]
async fn test_results_gathered_in_spine_order() {
    let book = Arc::new(DelayedBook::new());
    let mut reader = reader(Arc::clone(&book));
    let mut search = SearchController::new();

    let pending = search.start(&mut reader, "whale").unwrap();
    assert_eq!(pending.chapter_count(), 4);
    assert!(search.is_searching());
    assert_eq!(search.placeholder(), Some("Searching..."));

    let outcome = pending.gather().await;
    assert!(search.apply(outcome));
    assert!(!search.is_searching());
    assert_eq!(search.placeholder(), None);

    let results = search.results();
    assert_eq!(results.len(), 8);
    for (i, item) in results.iter().enumerate() {
        assert_eq!(item.id, format!("search-{}", i));
        let spine = i / 2;
        assert!(
            item.cfi.starts_with(&format!("epubcfi(/6/{}[c{}]", (spine + 1) * 2, spine)),
            "result {} out of order: {}",
            i,
            item.cfi
        );
    }
    assert_eq!(book.loads.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_empty_query_loads_nothing() {
    let book = Arc::new(DelayedBook::new());
    let mut reader = reader(Arc::clone(&book));
    let mut search = SearchController::new();
    assert!(search.start(&mut reader, "").is_none());
    assert!(search.results().is_empty());
    assert_eq!(book.loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_superseded_search_is_discarded() {
    let book = Arc::new(DelayedBook::new());
    let mut reader = reader(book);
    let mut search = SearchController::new();

    let first = search.start(&mut reader, "whale").unwrap();
    let second = search.start(&mut reader, "another").unwrap();
    assert!(second.generation() > first.generation());

    let stale = first.gather().await;
    assert!(!search.apply(stale));
    assert!(search.results().is_empty());
    assert!(search.is_searching());

    let fresh = second.gather().await;
    assert!(search.apply(fresh));
    assert_eq!(search.results().len(), 4);
    assert_eq!(search.query(), "another");
}

#[tokio::test]
async fn test_clear_supersedes_running_search() {
    let book = Arc::new(DelayedBook::new());
    let mut reader = reader(book);
    let mut search = SearchController::new();

    let pending = search.start(&mut reader, "whale").unwrap();
    search.clear(&mut reader);
    let outcome = pending.gather().await;
    assert!(!search.apply(outcome));
    assert!(search.results().is_empty());
    assert!(!search.is_searching());
}

#[tokio::test]
async fn test_select_result_navigates_and_highlights() {
    let book = Arc::new(DelayedBook::new());
    let mut reader = reader(Arc::clone(&book));
    let mut search = SearchController::new();
    let pending = search.start(&mut reader, "whale").unwrap();
    search.apply(pending.gather().await);

    search.select_result(&mut reader, 3);
    let selected = search.results()[3].cfi.clone();
    assert_eq!(book.current_location_cfi(), Some(selected));
    assert!(search.results()[3].current);
    assert_eq!(search.results().iter().filter(|r| r.current).count(), 1);
    assert!(search.is_highlight_armed());
    assert_eq!(reader.content().unwrap().highlighted(), Some("whale"));

    reader.load_content(epubreader::view::Document::new());
    search.on_chapter_displayed(&mut reader);
    assert_eq!(reader.content().unwrap().highlighted(), Some("whale"));

    search.unhighlight(&mut reader);
    assert_eq!(reader.content().unwrap().highlighted(), None);
    assert!(!search.is_highlight_armed());
}

#[tokio::test]
async fn test_app_search_opens_panel_and_clear_returns_to_toc() {
    let mut app = ReaderApp::new(
        Arc::new(DelayedBook::new()),
        Box::new(SqliteSessionStore::in_memory("search-app").unwrap()),
        LaunchOptions {
            config_path: Some("/nonexistent/epubreader-test.json".into()),
            ..LaunchOptions::default()
        },
    );
    app.ready();

    let count = app.search("chapter 2").await;
    assert_eq!(count, 1);
    assert_eq!(app.sidebar.active_panel(), PanelName::Search);
    assert!(app.sidebar.is_open());

    app.clear_search();
    assert!(app.search.results().is_empty());
    assert_eq!(app.sidebar.active_panel(), PanelName::Toc);
}
