//! Text utilities shared by the renderer and the frame composer.
//!
//! - **Width**: Unicode-aware measuring and truncation
//! - **Sanitizing**: stripping terminal escapes and HTML tags from feed text
//! - **Wrapping**: style-preserving word wrap for rendered lines
//!
//! ```
//! use feedpager::util::{display_width, truncate_to_width};
//!
//! let width = display_width("Hello 世界");
//! assert_eq!(width, 10);
//! assert_eq!(truncate_to_width("Long article title", 10), "Long ar...");
//! ```

mod text;

pub use text::{display_width, strip_control_chars, strip_tags, truncate_to_width, wrap_line};
