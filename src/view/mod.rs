// Reader view-models
// Pure state that a rendering adapter maps onto markup.

pub mod document;
pub mod list;

pub use document::{Document, Marker, StyleSheet};
pub use list::{AnnotationItem, ItemList};
