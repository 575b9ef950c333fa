//! HTML escaping and cleanup utilities.

use std::sync::LazyLock;

use regex::Regex;

/// Tags, including a trailing unterminated `<tag` at end of input.
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").unwrap());

/// Escape HTML special characters for safe rendering.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape only `<` and `>`. Everything else, entities included, is kept.
pub fn escape_angle_brackets(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

/// Escape quotes for use inside a double-quoted attribute value.
pub fn escape_attribute(s: &str) -> String {
    s.replace('"', "&quot;").replace('\'', "&#39;")
}

/// Remove tags and `&nbsp;` entities that models sometimes echo back.
pub fn strip_markup(s: &str) -> String {
    TAG.replace_all(s, "").replace("&nbsp;", " ")
}

/// Convert `\n` to `<br>`.
pub fn newlines_to_breaks(s: &str) -> String {
    s.replace('\n', "<br>")
}
