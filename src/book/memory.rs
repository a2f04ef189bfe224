//! In-memory book used by the demo binary, the RPC server and tests.
//!
//! Chapters are plain text split into paragraphs on blank lines. Locations
//! use a synthetic identifier of the form
//! `epubcfi(/6/{2·(spine+1)}[id]!/4/{2·(para+1)}/1:{offset})`, which is
//! enough to drive the shell. It is not a CFI implementation.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{
    Book, Direction, LoadedChapter, Metadata, SearchResult, SpineItem, TextNode, TextPosition,
    TocEntry,
};
use crate::types::errors::BookError;

const EXCERPT_RADIUS: usize = 30;

/// Chapter source for [`InMemoryBook`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryChapter {
    pub id: String,
    pub href: String,
    pub label: String,
    pub text: String,
}

/// Fixture format accepted by [`InMemoryBook::from_json`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookFixture {
    pub title: String,
    pub creator: String,
    #[serde(default)]
    pub direction: Direction,
    pub chapters: Vec<MemoryChapter>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    spine: usize,
    paragraph: usize,
    offset: usize,
}

/// A book held entirely in memory.
pub struct InMemoryBook {
    metadata: Metadata,
    chapters: Vec<MemoryChapter>,
    position: Mutex<Position>,
}

impl InMemoryBook {
    pub fn new(metadata: Metadata, chapters: Vec<MemoryChapter>) -> Self {
        Self {
            metadata,
            chapters,
            position: Mutex::new(Position {
                spine: 0,
                paragraph: 0,
                offset: 0,
            }),
        }
    }

    /// Builds a book from a JSON fixture.
    pub fn from_json(json: &str) -> Result<Self, BookError> {
        let fixture: BookFixture =
            serde_json::from_str(json).map_err(|e| BookError::OpenFailed(e.to_string()))?;
        Ok(Self::new(
            Metadata {
                book_title: fixture.title,
                creator: fixture.creator,
                direction: fixture.direction,
            },
            fixture.chapters,
        ))
    }

    fn paragraphs(text: &str) -> Vec<&str> {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    fn chapter_id(&self, spine: usize) -> &str {
        self.chapters.get(spine).map(|c| c.id.as_str()).unwrap_or("")
    }

    fn paragraph_count(&self, spine: usize) -> usize {
        self.chapters
            .get(spine)
            .map(|c| Self::paragraphs(&c.text).len())
            .unwrap_or(0)
    }

    fn cfi_for(&self, pos: Position) -> String {
        format!(
            "epubcfi(/6/{}[{}]!/4/{}/1:{})",
            (pos.spine + 1) * 2,
            self.chapter_id(pos.spine),
            (pos.paragraph + 1) * 2,
            pos.offset
        )
    }

    fn parse_cfi(cfi: &str) -> Option<Position> {
        let inner = cfi.strip_prefix("epubcfi(")?.strip_suffix(')')?;
        let (base, path) = inner.split_once('!')?;
        let spine_step: usize = base
            .strip_prefix("/6/")?
            .split(|c: char| !c.is_ascii_digit())
            .next()?
            .parse()
            .ok()?;
        let (steps, offset) = path.rsplit_once(':')?;
        let mut parts = steps.trim_start_matches('/').split('/');
        let _body = parts.next()?;
        let para_step: usize = parts.next()?.parse().ok()?;
        if spine_step < 2 || para_step < 2 {
            return None;
        }
        Some(Position {
            spine: spine_step / 2 - 1,
            paragraph: para_step / 2 - 1,
            offset: offset.parse().ok()?,
        })
    }

    fn set_position(&self, pos: Position) {
        if let Ok(mut current) = self.position.lock() {
            *current = pos;
        }
    }

    fn get_position(&self) -> Option<Position> {
        self.position.lock().ok().map(|p| *p)
    }
}

struct MemoryLoadedChapter {
    spine_pos: usize,
    id: String,
    paragraphs: Vec<String>,
}

impl LoadedChapter for MemoryLoadedChapter {
    fn spine_pos(&self) -> usize {
        self.spine_pos
    }

    fn find(&self, query: &str) -> Vec<SearchResult> {
        let needle = query.to_ascii_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        let mut results = Vec::new();
        for (p, text) in self.paragraphs.iter().enumerate() {
            let haystack = text.to_ascii_lowercase();
            for (byte_idx, _) in haystack.match_indices(&needle) {
                let start = text[..byte_idx].chars().count();
                let len = needle.chars().count();
                results.push(SearchResult {
                    cfi: format!(
                        "epubcfi(/6/{}[{}]!/4/{}/1:{})",
                        (self.spine_pos + 1) * 2,
                        self.id,
                        (p + 1) * 2,
                        start
                    ),
                    excerpt: excerpt(text, start, len),
                });
            }
        }
        results
    }
}

/// Text around a match, trimmed to a fixed radius and marked with ellipses.
fn excerpt(text: &str, start: usize, len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let from = start.saturating_sub(EXCERPT_RADIUS);
    let to = (start + len + EXCERPT_RADIUS).min(chars.len());
    let body: String = chars[from..to].iter().collect();
    format!("...{}...", body.trim())
}

impl Book for InMemoryBook {
    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn toc(&self) -> Vec<TocEntry> {
        self.chapters
            .iter()
            .map(|c| TocEntry {
                id: c.id.clone(),
                label: c.label.clone(),
                href: c.href.clone(),
                subitems: Vec::new(),
            })
            .collect()
    }

    fn spine(&self) -> Vec<SpineItem> {
        self.chapters
            .iter()
            .enumerate()
            .map(|(index, c)| SpineItem {
                index,
                id: c.id.clone(),
                href: c.href.clone(),
            })
            .collect()
    }

    fn load_chapter(&self, item: &SpineItem) -> Result<Box<dyn LoadedChapter>, BookError> {
        let chapter = self
            .chapters
            .get(item.index)
            .ok_or(BookError::ChapterNotFound(item.index))?;
        Ok(Box::new(MemoryLoadedChapter {
            spine_pos: item.index,
            id: chapter.id.clone(),
            paragraphs: Self::paragraphs(&chapter.text)
                .into_iter()
                .map(String::from)
                .collect(),
        }))
    }

    fn goto_cfi(&self, cfi: &str) -> Result<(), BookError> {
        let pos = Self::parse_cfi(cfi).ok_or_else(|| BookError::InvalidLocation(cfi.to_string()))?;
        if pos.spine >= self.chapters.len() {
            return Err(BookError::ChapterNotFound(pos.spine));
        }
        self.set_position(pos);
        Ok(())
    }

    fn goto(&self, href: &str) -> Result<(), BookError> {
        let path = href.split('#').next().unwrap_or(href);
        let spine = self
            .chapters
            .iter()
            .position(|c| c.href == path)
            .ok_or_else(|| BookError::InvalidLocation(href.to_string()))?;
        self.set_position(Position {
            spine,
            paragraph: 0,
            offset: 0,
        });
        Ok(())
    }

    fn next_page(&self) {
        let Some(pos) = self.get_position() else { return };
        let next = if pos.paragraph + 1 < self.paragraph_count(pos.spine) {
            Position { paragraph: pos.paragraph + 1, offset: 0, ..pos }
        } else if pos.spine + 1 < self.chapters.len() {
            Position { spine: pos.spine + 1, paragraph: 0, offset: 0 }
        } else {
            return;
        };
        self.set_position(next);
    }

    fn prev_page(&self) {
        let Some(pos) = self.get_position() else { return };
        let prev = if pos.paragraph > 0 {
            Position { paragraph: pos.paragraph - 1, offset: 0, ..pos }
        } else if pos.spine > 0 {
            let spine = pos.spine - 1;
            Position {
                spine,
                paragraph: self.paragraph_count(spine).saturating_sub(1),
                offset: 0,
            }
        } else {
            return;
        };
        self.set_position(prev);
    }

    fn current_location_cfi(&self) -> Option<String> {
        if self.chapters.is_empty() {
            return None;
        }
        self.get_position().map(|pos| self.cfi_for(pos))
    }

    fn spine_index_of(&self, cfi: &str) -> Option<usize> {
        Self::parse_cfi(cfi).map(|p| p.spine)
    }

    fn text_at(&self, cfi: &str) -> Option<TextPosition> {
        let pos = Self::parse_cfi(cfi)?;
        let chapter = self.chapters.get(pos.spine)?;
        let paragraph = Self::paragraphs(&chapter.text).get(pos.paragraph)?.to_string();
        Some(TextPosition {
            whole_text: paragraph,
            offset: pos.offset,
        })
    }

    fn cfi_from_text_node(
        &self,
        spine_pos: usize,
        node: &TextNode,
        offset: usize,
    ) -> Result<String, BookError> {
        if spine_pos >= self.chapters.len() {
            return Err(BookError::ChapterNotFound(spine_pos));
        }
        Ok(format!(
            "epubcfi(/6/{}[{}]!{}:{})",
            (spine_pos + 1) * 2,
            self.chapter_id(spine_pos),
            node.path,
            offset
        ))
    }
}

/// Path of the text node holding paragraph `index` in an [`InMemoryBook`]
/// chapter.
pub fn paragraph_path(index: usize) -> String {
    format!("/4/{}/1", (index + 1) * 2)
}
