//! Lightweight text → HTML formatting for showing parsed documents.
//!
//! Handles headings, list items, bold/italic and paragraphs. This is a preview
//! formatter, not a markdown renderer.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.*)$").unwrap());
static H2: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").unwrap());
static H3: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").unwrap());
static BULLET_ITEM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[*-] (.*)$").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\. (.*)$").unwrap());
static ITEM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<li>.*?</li>(?:\n<li>.*?</li>)*").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());

/// Format plain or markdown-ish text for display.
pub fn format_text_for_display(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let formatted = H3.replace_all(text, "<h3>$1</h3>");
    let formatted = H2.replace_all(&formatted, "<h2>$1</h2>");
    let formatted = H1.replace_all(&formatted, "<h1>$1</h1>");
    let formatted = BULLET_ITEM.replace_all(&formatted, "<li>$1</li>");
    let formatted = NUMBERED_ITEM.replace_all(&formatted, "<li>$1</li>");
    let formatted = ITEM_RUN.replace_all(&formatted, |caps: &Captures| {
        format!("<ul>{}</ul>", caps[0].replace('\n', ""))
    });
    let formatted = BOLD.replace_all(&formatted, "<strong>$1</strong>");
    let formatted = ITALIC.replace_all(&formatted, "<em>$1</em>");
    let formatted = formatted.replace("\n\n", "</p><p>").replace('\n', "<br>");

    if formatted.starts_with('<') {
        formatted
    } else {
        format!("<p>{}</p>", formatted)
    }
}
