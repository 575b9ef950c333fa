//! Shared helper functions for CLI commands.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Stylesheet for standalone annotated pages.
const PAGE_STYLE: &str = r#".annotation { background: #fff3b0; border-bottom: 2px solid #f0a500; position: relative; cursor: help; }
.annotation-indicator { display: inline-block; width: 6px; height: 6px; margin-left: 2px; border-radius: 50%; background: #e05d00; vertical-align: super; }
.annotation-tooltip { display: none; position: absolute; left: 0; top: 1.6em; z-index: 10; width: 24em; padding: 8px; background: #333; color: #fff; font-size: 0.85em; border-radius: 4px; }
.annotation:hover > .annotation-tooltip { display: block; }
body { max-width: 50em; margin: 2em auto; line-height: 1.8; font-family: sans-serif; }"#;

/// Create a spinner with the standard style.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Wrap rendered markup in a complete HTML page.
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"zh-CN\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        patent_annotate::utils::html_escape(title),
        PAGE_STYLE,
        body
    )
}

/// Truncate a string to at most `max_chars` characters.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Show only the last four characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
