//! Terminal user interface.
//!
//! - `loop_runner`: event loop and terminal management
//! - `render`: view dispatch
//! - [`layout`]: pure frame composition (header, body, footer)
//! - [`viewport`]: scrollable body
//! - `help`: keybinding table

mod help;
pub mod layout;
mod loop_runner;
mod render;
mod viewport;

pub use loop_runner::run;
pub use render::render;
pub use viewport::Viewport;
