pub mod format;
pub mod loader;

pub use format::{chunk, format_hms, rows, PromptRow};
pub use loader::{load, load_first, PLACEHOLDER_TEXT};
