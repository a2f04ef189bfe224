//! Schema migrations for the session database.
//!
//! A `schema_version` table records which migrations have been applied; each
//! runs exactly once.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the applied schema version (0 on a fresh database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending migrations. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: defaults, preferences, annotations, cursor")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Index annotations by kind")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: reader-wide defaults, per-book preferences, per-book annotations and
/// the last reading position.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS session_defaults (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS session_preferences (
            book_key TEXT NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL,
            PRIMARY KEY (book_key, name)
        );

        CREATE TABLE IF NOT EXISTS session_annotations (
            book_key TEXT NOT NULL,
            id TEXT NOT NULL,
            anchor TEXT NOT NULL,
            content TEXT,
            position INTEGER NOT NULL,
            PRIMARY KEY (book_key, id)
        );

        CREATE TABLE IF NOT EXISTS session_cursor (
            book_key TEXT PRIMARY KEY,
            cfi TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        ",
    )
}

/// V2: annotation kind column for databases created before it existed.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    if conn.prepare("SELECT kind FROM session_annotations LIMIT 0").is_err() {
        conn.execute_batch(
            "ALTER TABLE session_annotations ADD COLUMN kind TEXT NOT NULL DEFAULT 'annotation';",
        )?;
    }
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_session_annotations_kind
             ON session_annotations(book_key, kind);",
    )
}
