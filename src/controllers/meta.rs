use serde::Serialize;

use crate::book::Metadata;

/// Header labels and the document title.
#[derive(Debug, Clone, Serialize)]
pub struct MetaController {
    pub document_title: String,
    pub book_title: String,
    pub chapter_title: String,
    pub separator_visible: bool,
}

impl MetaController {
    pub fn new(meta: &Metadata) -> Self {
        Self {
            document_title: format!("{} – {}", meta.book_title, meta.creator),
            book_title: meta.book_title.clone(),
            chapter_title: meta.creator.clone(),
            separator_visible: true,
        }
    }
}
