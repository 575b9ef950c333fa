//! Document format detection from file names, declared MIME types and content.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Formats the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Word,
    Pdf,
}

impl DocumentFormat {
    /// Canonical MIME type for the format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Word => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Self::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word => write!(f, "Word"),
            Self::Pdf => write!(f, "PDF"),
        }
    }
}

/// Categorize a declared MIME type.
pub fn mime_to_format(mime: &str) -> Option<DocumentFormat> {
    let mime_lower = mime.to_lowercase();

    if mime_lower.contains("word") || mime_lower == "application/msword" {
        Some(DocumentFormat::Word)
    } else if mime_lower.contains("pdf") {
        Some(DocumentFormat::Pdf)
    } else {
        None
    }
}

/// Decide the format of an upload.
///
/// The file name extension and the declared MIME type are checked first, Word
/// before PDF. When neither matches, the leading bytes are sniffed so that
/// files without a usable name are still accepted.
pub fn detect_format(
    file_name: &str,
    declared_mime: Option<&str>,
    bytes: &[u8],
) -> Option<DocumentFormat> {
    let name = file_name.to_lowercase();
    let declared = declared_mime.and_then(mime_to_format);

    if name.ends_with(".docx") || name.ends_with(".doc") || declared == Some(DocumentFormat::Word)
    {
        return Some(DocumentFormat::Word);
    }
    if name.ends_with(".pdf") || declared == Some(DocumentFormat::Pdf) {
        return Some(DocumentFormat::Pdf);
    }

    infer::get(bytes).and_then(|kind| mime_to_format(kind.mime_type()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(detect_format("专利.DOCX", None, b""), Some(DocumentFormat::Word));
        assert_eq!(detect_format("old.doc", None, b""), Some(DocumentFormat::Word));
        assert_eq!(detect_format("scan.pdf", None, b""), Some(DocumentFormat::Pdf));
    }

    #[test]
    fn test_detect_by_declared_mime() {
        assert_eq!(
            detect_format("upload", Some("application/msword"), b""),
            Some(DocumentFormat::Word)
        );
        assert_eq!(
            detect_format("upload", Some("Application/PDF"), b""),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_word_checked_before_pdf() {
        assert_eq!(
            detect_format("a.pdf", Some("application/msword"), b""),
            Some(DocumentFormat::Word)
        );
    }

    #[test]
    fn test_detect_by_content() {
        assert_eq!(
            detect_format("upload.bin", None, b"%PDF-1.7\n%..."),
            Some(DocumentFormat::Pdf)
        );
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(detect_format("notes.txt", Some("text/plain"), b"hello"), None);
        assert_eq!(detect_format("image.png", None, b""), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DocumentFormat::Word.to_string(), "Word");
        assert_eq!(DocumentFormat::Pdf.to_string(), "PDF");
    }
}
