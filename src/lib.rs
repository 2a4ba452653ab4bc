//! atw - Japanese typing practice in the terminal
//!
//! Shows a kanji/kana prompt split into rows of a configurable width and runs
//! a countdown while the user types it.

pub mod app;
pub mod config;
pub mod history;
pub mod logging;
pub mod models;
pub mod prompt;
pub mod timer;
pub mod ui;
pub mod utils;
