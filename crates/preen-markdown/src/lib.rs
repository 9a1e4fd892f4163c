#![forbid(unsafe_code)]

//! Markdown compilation and transcript rendering.
//!
//! Compiled HTML is never trusted: [`render_message`] always passes it through a
//! [`preen::Sanitizer`] before handing it to a view.

mod compiler;
pub mod error;
mod slug;
mod transcript;

pub use compiler::{MarkdownCompiler, MarkdownOptions, escape_html};
pub use error::{Error, Result};
pub use pulldown_cmark::{CowStr, Event};
pub use transcript::{Message, RenderedMessage, Role, render_message, render_transcript};
