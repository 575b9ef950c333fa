//! Document parsing: uploaded Word/PDF bytes → text for review.
//!
//! Word documents are converted to simple HTML markup and PDFs to lightly
//! formatted plain text. Decode failures are logged in full and surfaced as a
//! short, user-facing [`ParseError`].

mod pdf;
mod word;

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::utils::{detect_format, DocumentFormat};

pub use pdf::{convert_text_to_markdown, PDF_PLACEHOLDER};
pub use word::{docx_to_html, DocxError};

/// Errors surfaced to callers of the parser.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("不支持的文件格式，请选择Word文档(.doc, .docx)或PDF文件(.pdf)")]
    UnsupportedFormat,

    /// Underlying cause is logged, not carried.
    #[error("{format}文档解析失败，请检查文件格式")]
    Decode { format: DocumentFormat },

    #[error("无法读取文件: {0}")]
    Io(#[from] std::io::Error),
}

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// `.docx` converted to HTML markup.
    WordMarkup,
    /// Text extracted with `pdftotext`.
    PdfToText,
    /// PDF could not be read; `text` holds manual-entry instructions.
    Placeholder,
}

/// Parsed document ready for review.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    pub text: String,
    pub format: DocumentFormat,
    pub method: ExtractionMethod,
}

/// Parses uploads into [`ParsedDocument`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser;

impl DocumentParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a file from disk.
    pub async fn parse_path(
        &self,
        path: &Path,
        declared_mime: Option<&str>,
    ) -> Result<ParsedDocument, ParseError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.parse(&bytes, file_name, declared_mime).await
    }

    /// Parse an upload given its bytes, file name and declared MIME type.
    pub async fn parse(
        &self,
        bytes: &[u8],
        file_name: &str,
        declared_mime: Option<&str>,
    ) -> Result<ParsedDocument, ParseError> {
        let format =
            detect_format(file_name, declared_mime, bytes).ok_or(ParseError::UnsupportedFormat)?;
        debug!("Detected {} document: {}", format, file_name);

        let parsed = match format {
            DocumentFormat::Word => self.parse_word(bytes)?,
            DocumentFormat::Pdf => self.parse_pdf(bytes).await?,
        };

        info!(
            "Parsed {} ({} chars via {:?})",
            file_name,
            parsed.text.chars().count(),
            parsed.method
        );
        Ok(parsed)
    }

    fn parse_word(&self, bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
        let text = docx_to_html(bytes).map_err(|e| {
            error!("Word文档解析失败: {}", e);
            ParseError::Decode {
                format: DocumentFormat::Word,
            }
        })?;

        Ok(ParsedDocument {
            text,
            format: DocumentFormat::Word,
            method: ExtractionMethod::WordMarkup,
        })
    }

    async fn parse_pdf(&self, bytes: &[u8]) -> Result<ParsedDocument, ParseError> {
        let owned = bytes.to_vec();
        let extracted = tokio::task::spawn_blocking(move || pdf::extract_text(&owned))
            .await
            .map_err(|e| {
                error!("PDF文档解析失败: {}", e);
                ParseError::Decode {
                    format: DocumentFormat::Pdf,
                }
            })?;

        let (text, method) = match extracted {
            Ok(text) if !text.trim().is_empty() => {
                (convert_text_to_markdown(&text), ExtractionMethod::PdfToText)
            }
            Ok(_) => {
                warn!("PDF has no extractable text, returning placeholder");
                (PDF_PLACEHOLDER.to_string(), ExtractionMethod::Placeholder)
            }
            Err(e) => {
                warn!("PDF extraction unavailable ({}), returning placeholder", e);
                (PDF_PLACEHOLDER.to_string(), ExtractionMethod::Placeholder)
            }
        };

        Ok(ParsedDocument {
            text,
            format: DocumentFormat::Pdf,
            method,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_format() {
        let err = DocumentParser::new()
            .parse(b"plain", "notes.txt", Some("text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedFormat));
        assert_eq!(
            err.to_string(),
            "不支持的文件格式，请选择Word文档(.doc, .docx)或PDF文件(.pdf)"
        );
    }

    #[tokio::test]
    async fn test_legacy_doc_is_decode_error() {
        let err = DocumentParser::new()
            .parse(b"\xD0\xCF\x11\xE0binary", "old.doc", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::Decode {
                format: DocumentFormat::Word
            }
        ));
        assert_eq!(err.to_string(), "Word文档解析失败，请检查文件格式");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_yields_placeholder() {
        let parsed = DocumentParser::new()
            .parse(b"not really a pdf", "scan.pdf", None)
            .await
            .unwrap();
        assert_eq!(parsed.format, DocumentFormat::Pdf);
        assert_eq!(parsed.method, ExtractionMethod::Placeholder);
        assert_eq!(parsed.text, PDF_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = DocumentParser::new()
            .parse_path(Path::new("/nonexistent/patent.docx"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }

    #[test]
    fn test_pdf_decode_message() {
        let err = ParseError::Decode {
            format: DocumentFormat::Pdf,
        };
        assert_eq!(err.to_string(), "PDF文档解析失败，请检查文件格式");
    }
}
