//! Annotation Manager.
//!
//! Insertion-ordered in-memory map of annotations keyed by id. Replacing an
//! existing id keeps its original position.

use std::collections::HashMap;

use crate::types::annotation::{Annotation, AnnotationKind};

/// Trait defining annotation storage operations.
pub trait AnnotationManagerTrait {
    /// Inserts or replaces by id; returns the previous value.
    fn insert(&mut self, annotation: Annotation) -> Option<Annotation>;
    fn get(&self, id: &str) -> Option<&Annotation>;
    fn get_mut(&mut self, id: &str) -> Option<&mut Annotation>;
    fn remove(&mut self, id: &str) -> Option<Annotation>;
    fn contains(&self, id: &str) -> bool;
    /// Annotations in insertion order, optionally filtered by kind.
    fn list(&self, kind: Option<AnnotationKind>) -> Vec<&Annotation>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationManager {
    order: Vec<String>,
    entries: HashMap<String, Annotation>,
}

impl AnnotationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of every annotation of `kind`, in insertion order.
    pub fn ids_of_kind(&self, kind: AnnotationKind) -> Vec<String> {
        self.list(Some(kind))
            .into_iter()
            .map(|a| a.id.clone())
            .collect()
    }
}

impl AnnotationManagerTrait for AnnotationManager {
    fn insert(&mut self, annotation: Annotation) -> Option<Annotation> {
        let id = annotation.id.clone();
        let previous = self.entries.insert(id.clone(), annotation);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    fn get(&self, id: &str) -> Option<&Annotation> {
        self.entries.get(id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Annotation> {
        self.entries.get_mut(id)
    }

    fn remove(&mut self, id: &str) -> Option<Annotation> {
        let removed = self.entries.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn list(&self, kind: Option<AnnotationKind>) -> Vec<&Annotation> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .filter(|a| kind.map_or(true, |k| a.kind == k))
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
