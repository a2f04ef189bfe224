//! Search panel.
//!
//! A search runs one blocking task per spine item: each loads its chapter
//! and matches the query. Results are gathered in spine order once every
//! task has settled, whatever order they finish in. Every search carries a
//! generation number; results from a search that was superseded or cleared
//! in the meantime are dropped when applied.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use super::Panel;
use crate::book::{Book, SearchResult};
use crate::reader::Reader;
use crate::types::errors::BookError;

pub const PLACEHOLDER: &str = "Searching...";

/// A rendered result entry (`<li id="search-{i}">`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchItem {
    pub id: String,
    pub cfi: String,
    pub excerpt: String,
    pub current: bool,
}

type ChapterTask = JoinHandle<Result<Vec<SearchResult>, BookError>>;

/// Chapter searches in flight for one query.
pub struct PendingSearch {
    generation: u64,
    query: String,
    tasks: Vec<(usize, ChapterTask)>,
}

/// Results of a [`PendingSearch`], in spine order.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub generation: u64,
    pub query: String,
    pub results: Vec<SearchResult>,
}

impl PendingSearch {
    /// Spawns one blocking task per spine item. Must be called from within
    /// a tokio runtime.
    fn spawn(book: Arc<dyn Book>, query: &str, generation: u64) -> Self {
        let tasks = book
            .spine()
            .into_iter()
            .map(|item| {
                let book = Arc::clone(&book);
                let query = query.to_string();
                let index = item.index;
                let handle = tokio::task::spawn_blocking(move || -> Result<Vec<SearchResult>, BookError> {
                    let chapter = book.load_chapter(&item)?;
                    Ok(chapter.find(&query))
                });
                (index, handle)
            })
            .collect();
        Self {
            generation,
            query: query.to_string(),
            tasks,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn chapter_count(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for every chapter; failed chapters are logged and left out.
    pub async fn gather(self) -> SearchOutcome {
        let mut results = Vec::new();
        for (spine_pos, task) in self.tasks {
            match task.await {
                Ok(Ok(found)) => results.extend(found),
                Ok(Err(e)) => tracing::warn!(spine_pos, error = %e, "chapter search failed"),
                Err(e) => tracing::warn!(spine_pos, error = %e, "chapter search task failed"),
            }
        }
        SearchOutcome {
            generation: self.generation,
            query: self.query,
            results,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SearchController {
    open: bool,
    query: String,
    results: Vec<SearchItem>,
    /// The `Searching...` placeholder is shown.
    searching: bool,
    /// Highlight the query whenever a chapter is displayed.
    highlight_armed: bool,
    #[serde(skip)]
    generation: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[SearchItem] {
        &self.results
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    /// Text of the placeholder entry shown while a search runs.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.searching.then_some(PLACEHOLDER)
    }

    pub fn is_highlight_armed(&self) -> bool {
        self.highlight_armed
    }

    /// Resets the list and launches the chapter searches. An empty query
    /// only clears and returns `None`.
    pub fn start(&mut self, reader: &mut Reader, query: &str) -> Option<PendingSearch> {
        if query.is_empty() {
            self.clear(reader);
            return None;
        }
        self.generation += 1;
        self.query = query.to_string();
        self.results.clear();
        self.searching = true;
        Some(PendingSearch::spawn(
            Arc::clone(reader.book()),
            query,
            self.generation,
        ))
    }

    /// Renders an outcome unless a newer search or a clear superseded it.
    /// Returns whether it was applied.
    pub fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                generation = outcome.generation,
                current = self.generation,
                "discarding stale search results"
            );
            return false;
        }
        self.searching = false;
        self.results = outcome
            .results
            .into_iter()
            .enumerate()
            .map(|(i, result)| SearchItem {
                id: format!("search-{}", i),
                cfi: result.cfi,
                excerpt: result.excerpt,
                current: false,
            })
            .collect();
        true
    }

    /// A result was clicked: navigate to it, mark it current and highlight
    /// the query in displayed chapters.
    pub fn select_result(&mut self, reader: &mut Reader, index: usize) {
        let Some(cfi) = self.results.get(index).map(|r| r.cfi.clone()) else {
            return;
        };
        if let Err(e) = reader.book().goto_cfi(&cfi) {
            tracing::warn!(cfi = %cfi, error = %e, "search result navigation failed");
        }
        for (i, item) in self.results.iter_mut().enumerate() {
            item.current = i == index;
        }
        self.highlight_armed = true;
        self.highlight(reader);
    }

    fn highlight(&self, reader: &mut Reader) {
        if let Some(content) = reader.content_mut() {
            content.highlight(&self.query);
        }
    }

    /// Hook run after a chapter is displayed.
    pub fn on_chapter_displayed(&self, reader: &mut Reader) {
        if self.highlight_armed {
            self.highlight(reader);
        }
    }

    pub fn unhighlight(&mut self, reader: &mut Reader) {
        if let Some(content) = reader.content_mut() {
            content.unhighlight();
        }
        self.highlight_armed = false;
    }

    /// Removes highlighting and empties the results. Any search still in
    /// flight is superseded.
    pub fn clear(&mut self, reader: &mut Reader) {
        self.unhighlight(reader);
        self.results.clear();
        self.searching = false;
        self.generation += 1;
    }
}

impl Panel for SearchController {
    fn show(&mut self, _reader: &mut Reader) {
        self.open = true;
    }

    fn hide(&mut self, reader: &mut Reader) {
        self.unhighlight(reader);
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }
}
