//! Typed publish/subscribe between the reader and its controllers.
//!
//! The [`Reader`](crate::reader::Reader) owns an [`EventBus`]; each controller
//! takes a [`Subscription`] at construction and drains it when the
//! application pumps events. [`BookEvent`]s flow the other way: they are
//! raised by the rendering library and fed into the application.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::book::CaretPosition;
use crate::types::annotation::{Annotation, AnnotationKind};

const DEFAULT_CAPACITY: usize = 256;

/// Event names published by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BookmarkCreated,
    BookmarkRemoved,
    AnnotationCreated,
    AnnotationRemoved,
    GotoBookmark,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BookmarkCreated => "reader:bookmarkcreated",
            EventKind::BookmarkRemoved => "reader:bookmarkremoved",
            EventKind::AnnotationCreated => "reader:annotationcreated",
            EventKind::AnnotationRemoved => "reader:annotationremoved",
            EventKind::GotoBookmark => "reader:gotobookmark",
        }
    }
}

/// Reader notifications with their payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    BookmarkCreated(Annotation),
    BookmarkRemoved(String),
    AnnotationCreated(Annotation),
    AnnotationRemoved(String),
    /// Navigate to a stored location (the session cursor on startup).
    GotoBookmark(Option<String>),
}

impl ReaderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ReaderEvent::BookmarkCreated(_) => EventKind::BookmarkCreated,
            ReaderEvent::BookmarkRemoved(_) => EventKind::BookmarkRemoved,
            ReaderEvent::AnnotationCreated(_) => EventKind::AnnotationCreated,
            ReaderEvent::AnnotationRemoved(_) => EventKind::AnnotationRemoved,
            ReaderEvent::GotoBookmark(_) => EventKind::GotoBookmark,
        }
    }

    /// The "removed" notification matching an annotation kind.
    pub fn removed(kind: AnnotationKind, id: &str) -> Self {
        match kind {
            AnnotationKind::Bookmark => ReaderEvent::BookmarkRemoved(id.to_string()),
            AnnotationKind::Annotation => ReaderEvent::AnnotationRemoved(id.to_string()),
        }
    }
}

/// Sending half of the reader's event channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ReaderEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            lagged: false,
        }
    }

    /// Publishes to every live subscription. Publishing with no subscribers
    /// is not an error.
    pub fn emit(&self, event: ReaderEvent) {
        tracing::debug!(event = event.kind().as_str(), "reader event");
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half held by a controller.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ReaderEvent>,
    lagged: bool,
}

impl Subscription {
    /// Returns every event published since the last drain, in order.
    ///
    /// If the subscriber fell behind and events were dropped, the loss is
    /// recorded and reported once by [`Subscription::take_lagged`].
    pub fn drain(&mut self) -> Vec<ReaderEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                    self.lagged = true;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => break,
            }
        }
        events
    }

    pub fn take_lagged(&mut self) -> bool {
        std::mem::take(&mut self.lagged)
    }
}

/// Events raised by the book/renderer collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum BookEvent {
    LocationChanged(String),
    ChapterDisplayed { spine_pos: usize, id: String },
    /// A text selection anchored at the given location.
    Selected(String),
    Click(CaretPosition),
    KeyDown(u32),
    Spreads(bool),
    PageChanged { page: u32, percentage: f32 },
    Online,
    Offline,
}

impl BookEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BookEvent::LocationChanged(_) => "renderer:locationChanged",
            BookEvent::ChapterDisplayed { .. } => "renderer:chapterDisplayed",
            BookEvent::Selected(_) => "renderer:selected",
            BookEvent::Click(_) => "renderer:click",
            BookEvent::KeyDown(_) => "renderer:keydown",
            BookEvent::Spreads(_) => "renderer:spreads",
            BookEvent::PageChanged { .. } => "book:pageChanged",
            BookEvent::Online => "book:online",
            BookEvent::Offline => "book:offline",
        }
    }
}
