// Reader services
// Services provide stateless or file-backed functionality: the settings engine
// and the catalogue of built-in styles.

pub mod settings_engine;
pub mod style_catalogue;
