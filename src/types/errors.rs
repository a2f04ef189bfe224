use thiserror::Error;

// === SessionError ===

/// Errors raised by a session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Failed to serialize or deserialize a stored record.
    #[error("Session serialization error: {0}")]
    SerializationError(String),
    /// Database operation failed.
    #[error("Session database error: {0}")]
    DatabaseError(String),
}

// === SettingsError ===

/// Errors related to reader settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing the config file.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === BookError ===

/// Errors reported by the book collaborator.
#[derive(Debug, Error)]
pub enum BookError {
    /// No spine item exists at the given position.
    #[error("Chapter not found: {0}")]
    ChapterNotFound(usize),
    /// The chapter content could not be loaded.
    #[error("Chapter load failed: {0}")]
    LoadFailed(String),
    /// The location identifier could not be resolved.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
    /// The book source could not be opened.
    #[error("Book open failed: {0}")]
    OpenFailed(String),
}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug, Error)]
pub enum ShortcutError {
    /// No binding exists for the given key code.
    #[error("Shortcut not found for key: {0}")]
    NotFound(u32),
    /// The key code is already bound to another action.
    #[error("Shortcut conflict: {0}")]
    Conflict(String),
    /// The action name is not a known reader action.
    #[error("Unknown reader action: {0}")]
    UnknownAction(String),
}

// === RpcError ===

/// Errors produced while dispatching a JSON-RPC call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The method name is not recognised.
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    /// A required parameter is missing or has the wrong type.
    #[error("missing or invalid param: {0}")]
    InvalidParam(&'static str),
    /// The addressed entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Settings could not be changed.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// A shortcut could not be changed.
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),
}
