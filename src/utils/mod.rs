//! Shared utility functions.
//!
//! This module contains reusable utilities used across the codebase:
//! - `html`: escaping and tag stripping
//! - `display`: text → HTML preview formatting
//! - `mime`: document format detection

mod display;
mod html;
mod mime;

pub use display::format_text_for_display;
pub use html::{
    escape_angle_brackets, escape_attribute, html_escape, newlines_to_breaks, strip_markup,
};
pub use mime::{detect_format, mime_to_format, DocumentFormat};
