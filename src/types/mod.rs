// Reader shared type definitions
// Each submodule defines types used across the shell.

pub mod annotation;
pub mod errors;
pub mod session;
pub mod settings;
pub mod style;
