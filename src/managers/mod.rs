// Reader state managers
// Managers hold stateful stores: annotations, the session database and key bindings.

pub mod annotation_manager;
pub mod session_manager;
pub mod shortcut_manager;
