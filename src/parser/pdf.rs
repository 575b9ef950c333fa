//! PDF text extraction via Poppler's `pdftotext`.

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

/// Shown instead of document text when a PDF cannot be read.
pub const PDF_PLACEHOLDER: &str = "# PDF文档\n\n无法直接解析PDF内容，请手动复制粘贴文本内容。\n\n建议：\n1. 使用PDF阅读器打开文件\n2. 选择并复制所需文本\n3. 粘贴到下方文本框中";

static PARAGRAPH_GAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t\r]*\n").unwrap());
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([A-Z][A-Z \t]{2,}|\d+\.[ \t]+[^\n]+)$").unwrap()
});
static BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[-•·][ \t]+").unwrap());
static NUMBERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(\d+)[.)）．][ \t]+").unwrap());

/// Errors that can occur during PDF text extraction.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle command output, mapping a missing binary to `ToolNotFound`.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, PdfError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(PdfError::ExtractionFailed(format!(
                    "{}: {}",
                    error_prefix, stderr
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PdfError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(PdfError::Io(e)),
    }
}

/// Run pdftotext on a PDF file.
fn run_pdftotext(file_path: &Path) -> Result<String, PdfError> {
    let output = Command::new("pdftotext")
        .args(["-layout", "-enc", "UTF-8"])
        .arg(file_path)
        .arg("-") // Output to stdout
        .output();

    handle_cmd_output(output, "pdftotext (install poppler-utils)", "pdftotext failed")
}

/// Extract the text of an in-memory PDF.
///
/// Blocking: writes a temporary file and waits for `pdftotext`. Pages are
/// separated by a blank line.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfError> {
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;

    let raw = run_pdftotext(file.path())?;
    let pages: Vec<&str> = raw
        .split('\u{c}')
        .map(str::trim_end)
        .filter(|p| !p.trim().is_empty())
        .collect();

    Ok(pages.join("\n\n"))
}

/// Light markdown shaping of extracted text.
///
/// Collapses whitespace-only gaps into paragraph breaks, marks all-caps and
/// numbered lines as `##` headings, and normalizes bullet and numbered list
/// prefixes.
pub fn convert_text_to_markdown(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let markdown = PARAGRAPH_GAP.replace_all(text, "\n\n");
    let markdown = HEADING_LINE.replace_all(&markdown, "## $1");
    let markdown = BULLET_ITEM.replace_all(&markdown, "- ");
    let markdown = NUMBERED_ITEM.replace_all(&markdown, |caps: &Captures| format!("{}. ", &caps[1]));
    markdown.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_paragraph_gaps() {
        assert_eq!(convert_text_to_markdown("甲\n  \n乙"), "甲\n\n乙");
    }

    #[test]
    fn test_markdown_headings() {
        let md = convert_text_to_markdown("ABSTRACT\n正文内容\n1. 一种装置");
        assert_eq!(md, "## ABSTRACT\n正文内容\n## 1. 一种装置");
    }

    #[test]
    fn test_markdown_lists() {
        let md = convert_text_to_markdown("  • 外壳\n· 底座\n2) 连接件");
        assert_eq!(md, "- 外壳\n- 底座\n2. 连接件");
    }

    #[test]
    fn test_markdown_empty() {
        assert_eq!(convert_text_to_markdown(""), "");
    }

    #[test]
    fn test_missing_tool_maps_to_tool_not_found() {
        let result = handle_cmd_output(
            Err(std::io::Error::from(std::io::ErrorKind::NotFound)),
            "pdftotext",
            "failed",
        );
        assert!(matches!(result, Err(PdfError::ToolNotFound(_))));
    }
}
