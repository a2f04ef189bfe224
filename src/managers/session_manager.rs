//! Session Manager.
//!
//! Persists reader state between runs: reader-wide defaults, per-book
//! preferences, per-book annotations and the last reading position. The
//! reader talks to the store through [`SessionStore`]; [`SqliteSessionStore`]
//! is the SQLite-backed implementation.

use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::database::connection::Database;
use crate::types::annotation::{Annotation, AnnotationKind};
use crate::types::errors::SessionError;
use crate::types::session::{SessionEntry, SessionSnapshot, StoredAnnotation};

/// Trait defining session persistence operations.
pub trait SessionStore: Send {
    /// Stores a reader-wide value shared by every book.
    fn set_default(&mut self, name: &str, value: Value) -> Result<(), SessionError>;
    /// Stores a value scoped to the current book.
    fn set_preference(&mut self, name: &str, value: Value) -> Result<(), SessionError>;
    fn set_bookmark(
        &mut self,
        id: &str,
        anchor: &str,
        kind: AnnotationKind,
        annotation: &Annotation,
    ) -> Result<(), SessionError>;
    fn delete_bookmark(&mut self, id: &str) -> Result<(), SessionError>;
    fn set_cursor(&mut self, cfi: &str) -> Result<(), SessionError>;
    /// Everything stored for the current book, annotations in insertion order.
    fn snapshot(&self) -> Result<SessionSnapshot, SessionError>;
}

/// SQLite-backed session store scoped to one book.
pub struct SqliteSessionStore {
    db: Database,
    book_key: String,
}

impl SqliteSessionStore {
    pub fn new(db: Database, book_key: &str) -> Self {
        Self {
            db,
            book_key: book_key.to_string(),
        }
    }

    pub fn open<P: AsRef<std::path::Path>>(path: P, book_key: &str) -> Result<Self, SessionError> {
        let db = Database::open(path).map_err(db_err)?;
        Ok(Self::new(db, book_key))
    }

    pub fn in_memory(book_key: &str) -> Result<Self, SessionError> {
        let db = Database::open_in_memory().map_err(db_err)?;
        Ok(Self::new(db, book_key))
    }

    pub fn book_key(&self) -> &str {
        &self.book_key
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn read_entries(&self, sql: &str, with_book: bool) -> Result<Vec<SessionEntry>, SessionError> {
        let conn = self.db.connection();
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<(String, String)> {
            Ok((row.get(0)?, row.get(1)?))
        };
        let rows = if with_book {
            stmt.query_map(params![self.book_key], map_row)
        } else {
            stmt.query_map([], map_row)
        }
        .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            let (name, raw) = row.map_err(db_err)?;
            let value = serde_json::from_str(&raw)
                .map_err(|e| SessionError::SerializationError(format!("{}: {}", name, e)))?;
            entries.push(SessionEntry { name, value });
        }
        Ok(entries)
    }
}

fn db_err(e: rusqlite::Error) -> SessionError {
    SessionError::DatabaseError(e.to_string())
}

fn encode(value: &Value) -> Result<String, SessionError> {
    serde_json::to_string(value).map_err(|e| SessionError::SerializationError(e.to_string()))
}

impl SessionStore for SqliteSessionStore {
    fn set_default(&mut self, name: &str, value: Value) -> Result<(), SessionError> {
        let raw = encode(&value)?;
        self.db
            .connection()
            .execute(
                "INSERT INTO session_defaults (name, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![name, raw, Self::now()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn set_preference(&mut self, name: &str, value: Value) -> Result<(), SessionError> {
        let raw = encode(&value)?;
        self.db
            .connection()
            .execute(
                "INSERT INTO session_preferences (book_key, name, value, updated_at) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(book_key, name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![self.book_key, name, raw, Self::now()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn set_bookmark(
        &mut self,
        id: &str,
        anchor: &str,
        kind: AnnotationKind,
        annotation: &Annotation,
    ) -> Result<(), SessionError> {
        let content = serde_json::to_string(annotation)
            .map_err(|e| SessionError::SerializationError(e.to_string()))?;
        self.db
            .connection()
            .execute(
                "INSERT INTO session_annotations (book_key, id, anchor, kind, content, position)
                 VALUES (?1, ?2, ?3, ?4, ?5,
                     (SELECT COALESCE(MAX(position), -1) + 1 FROM session_annotations WHERE book_key = ?1))
                 ON CONFLICT(book_key, id) DO UPDATE SET
                     anchor = excluded.anchor, kind = excluded.kind, content = excluded.content",
                params![self.book_key, id, anchor, kind.as_str(), content],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn delete_bookmark(&mut self, id: &str) -> Result<(), SessionError> {
        self.db
            .connection()
            .execute(
                "DELETE FROM session_annotations WHERE book_key = ?1 AND id = ?2",
                params![self.book_key, id],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn set_cursor(&mut self, cfi: &str) -> Result<(), SessionError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO session_cursor (book_key, cfi, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(book_key) DO UPDATE SET cfi = excluded.cfi, updated_at = excluded.updated_at",
                params![self.book_key, cfi, Self::now()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let defaults = self.read_entries(
            "SELECT name, value FROM session_defaults ORDER BY name",
            false,
        )?;
        let preferences = self.read_entries(
            "SELECT name, value FROM session_preferences WHERE book_key = ?1 ORDER BY name",
            true,
        )?;

        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(
                "SELECT id, content FROM session_annotations WHERE book_key = ?1 ORDER BY position",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![self.book_key], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .map_err(db_err)?;

        let mut annotations = Vec::new();
        for row in rows {
            let (name, raw) = row.map_err(db_err)?;
            let content = raw.and_then(|raw| match serde_json::from_str::<Annotation>(&raw) {
                Ok(annotation) => Some(annotation),
                Err(e) => {
                    tracing::warn!(id = %name, error = %e, "undecodable stored annotation");
                    None
                }
            });
            annotations.push(StoredAnnotation { name, content });
        }

        let cursor = conn
            .query_row(
                "SELECT cfi FROM session_cursor WHERE book_key = ?1",
                params![self.book_key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(db_err)?;

        Ok(SessionSnapshot {
            defaults,
            preferences,
            annotations,
            cursor,
        })
    }
}
