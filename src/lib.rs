//! feedpager: read syndication feeds as rendered, scrollable terminal text.
//!
//! The binary wires these modules together; the library is exposed so the
//! session can be driven headless in tests.

pub mod app;
pub mod config;
pub mod content;
pub mod feed;
pub mod keybindings;
pub mod theme;
pub mod ui;
pub mod util;
