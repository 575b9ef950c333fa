//! Annotation extraction and rendering.
//!
//! Model output is turned into [`Annotation`]s in two stages: the
//! `StructuredExtractor` recovers explicit quote/explanation pairs, and when
//! that yields nothing the `FallbackAnnotator` produces heuristic feedback.
//! The `compositor` then wraps each span of the original text in markup.

pub mod compositor;
mod extractor;
mod fallback;
pub mod locator;
mod pipeline;

use serde::{Deserialize, Serialize};

pub use compositor::{apply, RenderMode};
pub use extractor::StructuredExtractor;
pub use fallback::{default_hedge_keywords, FallbackAnnotator};
pub use locator::{locate, locate_all, locate_from, sentence_at, Span};
pub use pipeline::ResponseAnnotator;

/// A flagged span of the original document plus its comment.
///
/// `start_index`/`end_index` are character offsets into the original text,
/// half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Exact substring of the original text covered by this annotation.
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    /// Free-form comment; may contain newlines.
    pub annotation: String,
}

impl Annotation {
    pub fn new(
        text: impl Into<String>,
        start_index: usize,
        end_index: usize,
        annotation: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            start_index,
            end_index,
            annotation: annotation.into(),
        }
    }

    /// Build an annotation whose text is taken from `original` at `span`.
    /// Returns `None` if the span is empty or out of bounds.
    pub fn from_span(original: &str, span: Span, annotation: impl Into<String>) -> Option<Self> {
        let text = locator::char_slice(original, span.start, span.end)?;
        Some(Self::new(text, span.start, span.end, annotation))
    }

    /// Like [`Annotation::from_span`], over text already split into chars.
    pub fn from_chars(chars: &[char], span: Span, annotation: impl Into<String>) -> Option<Self> {
        if span.is_empty() || span.end > chars.len() {
            return None;
        }
        let text: String = chars[span.start..span.end].iter().collect();
        Some(Self::new(text, span.start, span.end, annotation))
    }

    pub fn span(&self) -> Span {
        Span {
            start: self.start_index,
            end: self.end_index,
        }
    }

    /// Whether the range is non-empty and fits in a text of `len` characters.
    pub fn fits(&self, len: usize) -> bool {
        self.start_index < self.end_index && self.end_index <= len
    }
}
