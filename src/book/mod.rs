//! Book collaborator interface.
//!
//! The shell never parses EPUB content or computes location identifiers
//! itself. Everything it needs from the rendering library goes through the
//! [`Book`] and [`LoadedChapter`] traits defined here.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::types::errors::BookError;

pub use memory::InMemoryBook;

/// Reading direction declared by the book metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Book-level metadata used by the header and paging controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub book_title: String,
    pub creator: String,
    #[serde(default)]
    pub direction: Direction,
}

/// One entry of the book's spine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpineItem {
    pub index: usize,
    pub id: String,
    pub href: String,
}

/// One entry of the table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocEntry {
    pub id: String,
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub subitems: Vec<TocEntry>,
}

/// A text match inside a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub cfi: String,
    pub excerpt: String,
}

/// Text surrounding a resolved location: the whole text of the node the
/// location falls in, and the character offset inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPosition {
    pub whole_text: String,
    pub offset: usize,
}

/// A text node of the rendered content, addressed by its document path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub path: String,
    pub text: String,
}

/// The node under the pointer when the content was clicked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CaretNode {
    Text(TextNode),
    Element { children: Vec<TextNode> },
}

/// Caret position resolved from a content click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaretPosition {
    pub node: CaretNode,
    pub offset: usize,
}

impl CaretPosition {
    /// The text node the caret falls in. Element nodes resolve to their first
    /// text child.
    pub fn text_node(&self) -> Option<&TextNode> {
        match &self.node {
            CaretNode::Text(node) => Some(node),
            CaretNode::Element { children } => children.first(),
        }
    }
}

/// A chapter whose content has been loaded and can be searched.
pub trait LoadedChapter: Send {
    fn spine_pos(&self) -> usize;
    fn find(&self, query: &str) -> Vec<SearchResult>;
}

/// The rendering library's book object, as seen by the shell.
///
/// Navigation methods take `&self`; implementations own their renderer state.
pub trait Book: Send + Sync {
    fn metadata(&self) -> Metadata;
    fn toc(&self) -> Vec<TocEntry>;
    fn spine(&self) -> Vec<SpineItem>;
    fn load_chapter(&self, item: &SpineItem) -> Result<Box<dyn LoadedChapter>, BookError>;
    fn goto_cfi(&self, cfi: &str) -> Result<(), BookError>;
    fn goto(&self, href: &str) -> Result<(), BookError>;
    fn next_page(&self);
    fn prev_page(&self);
    fn current_location_cfi(&self) -> Option<String>;
    /// Spine position a location identifier points into.
    fn spine_index_of(&self, cfi: &str) -> Option<usize>;
    /// Text around a location, used for bookmark excerpts.
    fn text_at(&self, cfi: &str) -> Option<TextPosition>;
    fn cfi_from_text_node(
        &self,
        spine_pos: usize,
        node: &TextNode,
        offset: usize,
    ) -> Result<String, BookError>;
}
