//! Renderers over document trees.

pub mod json;
pub mod markdown;
pub mod text;

pub use json::{to_json, JsonOptions};
pub use markdown::to_markdown;
pub use text::{to_text, TextOptions};
