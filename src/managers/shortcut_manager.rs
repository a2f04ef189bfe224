//! Shortcut Manager.
//!
//! Key-code bindings for reader actions, with conflict detection and reset
//! to the default table.

use std::collections::BTreeMap;

use crate::types::errors::ShortcutError;
use crate::types::settings::{ReaderAction, ReaderSettings};

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, key: u32, action: ReaderAction) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, key: u32) -> Result<(), ShortcutError>;
    fn get_action(&self, key: u32) -> Option<ReaderAction>;
    fn keys_for(&self, action: ReaderAction) -> Vec<u32>;
    fn list_shortcuts(&self) -> &BTreeMap<u32, ReaderAction>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, key: u32, action: ReaderAction) -> Option<ReaderAction>;
}

/// Keyboard table, one action per key code. Several codes may share an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutManager {
    shortcuts: BTreeMap<u32, ReaderAction>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self {
            shortcuts: ReaderSettings::default_keyboard(),
        }
    }

    pub fn from_table(table: BTreeMap<u32, ReaderAction>) -> Self {
        Self { shortcuts: table }
    }

    /// Binds `key`, replacing whatever it was bound to.
    pub fn rebind(&mut self, key: u32, action: ReaderAction) {
        self.shortcuts.insert(key, action);
    }

    /// Binds a key to an action given by name.
    pub fn register_named(&mut self, key: u32, action: &str) -> Result<(), ShortcutError> {
        let parsed = ReaderAction::parse(action)
            .ok_or_else(|| ShortcutError::UnknownAction(action.to_string()))?;
        self.register_shortcut(key, parsed)
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, key: u32, action: ReaderAction) -> Result<(), ShortcutError> {
        if let Some(bound) = self.has_conflict(key, action) {
            return Err(ShortcutError::Conflict(format!(
                "key {} is already bound to '{}'",
                key,
                bound.as_str()
            )));
        }
        self.shortcuts.insert(key, action);
        Ok(())
    }

    fn unregister_shortcut(&mut self, key: u32) -> Result<(), ShortcutError> {
        self.shortcuts
            .remove(&key)
            .map(|_| ())
            .ok_or(ShortcutError::NotFound(key))
    }

    fn get_action(&self, key: u32) -> Option<ReaderAction> {
        self.shortcuts.get(&key).copied()
    }

    fn keys_for(&self, action: ReaderAction) -> Vec<u32> {
        self.shortcuts
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect()
    }

    fn list_shortcuts(&self) -> &BTreeMap<u32, ReaderAction> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        self.shortcuts = ReaderSettings::default_keyboard();
    }

    /// The action `key` is bound to, when that differs from `action`.
    fn has_conflict(&self, key: u32, action: ReaderAction) -> Option<ReaderAction> {
        self.shortcuts
            .get(&key)
            .copied()
            .filter(|bound| *bound != action)
    }
}
