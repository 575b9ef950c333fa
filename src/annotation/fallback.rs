//! Heuristic annotations for responses without usable structure.
//!
//! Strategies run in order and the first one that produces anything wins:
//! hedge-keyword sentences, then a random sample of long sentences, then a
//! single annotation over the start of the document carrying the raw response.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use tracing::{debug, info};

use super::locator::{locate, locate_all, sentence_at, Span};
use super::Annotation;
use crate::utils::strip_markup;

/// Sentences at or below this many characters are not worth sampling.
const MIN_SENTENCE_CHARS: usize = 10;

/// Upper bound on sampled sentences.
const MAX_SAMPLED: usize = 3;

/// Characters covered by the last-resort annotation.
const WHOLE_TEXT_PREVIEW_CHARS: usize = 100;

static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[。！？\n]").unwrap());

/// Hedge words flagged as vague in patent drafting.
pub fn default_hedge_keywords() -> Vec<String> {
    ["等", "及其他", "诸如", "比如", "例如", "包括但不限于"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Generates fallback annotations from the original text.
#[derive(Debug, Clone)]
pub struct FallbackAnnotator {
    keywords: Vec<String>,
}

impl Default for FallbackAnnotator {
    fn default() -> Self {
        Self::new(default_hedge_keywords())
    }
}

impl FallbackAnnotator {
    pub fn new(keywords: Vec<String>) -> Self {
        let keywords = keywords.into_iter().filter(|k| !k.is_empty()).collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Run the strategies in order. Only empty `original` text yields nothing.
    pub fn annotate<R: Rng + ?Sized>(
        &self,
        response: &str,
        original: &str,
        rng: &mut R,
    ) -> Vec<Annotation> {
        let cleaned = strip_markup(response);

        let flagged = self.keyword_sentences(original, &cleaned);
        if !flagged.is_empty() {
            info!("Fallback flagged {} hedge-word sentences", flagged.len());
            return flagged;
        }

        let sampled = sample_sentences(original, rng);
        if !sampled.is_empty() {
            info!("Fallback sampled {} sentences", sampled.len());
            return sampled;
        }

        debug!("Fallback annotating document head");
        whole_text(original, &cleaned).into_iter().collect()
    }

    /// One annotation per keyword occurrence, covering its sentence.
    ///
    /// Searching resumes one character after each hit, so a sentence holding
    /// several hedge words is annotated once per word.
    pub fn keyword_sentences(&self, original: &str, cleaned_response: &str) -> Vec<Annotation> {
        let chars: Vec<char> = original.chars().collect();
        let mut annotations = Vec::new();

        for keyword in &self.keywords {
            let comment = keyword_comment(keyword, cleaned_response);
            for hit in locate_all(original, keyword) {
                let span = sentence_at(&chars, hit.start);
                if let Some(ann) = Annotation::from_chars(&chars, span, comment.clone()) {
                    annotations.push(ann);
                }
            }
        }

        annotations
    }
}

/// Pick `min(3, max(1, n / 3))` distinct long sentences at random.
pub fn sample_sentences<R: Rng + ?Sized>(original: &str, rng: &mut R) -> Vec<Annotation> {
    let sentences: Vec<&str> = SENTENCE_BREAK
        .split(original)
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect();

    if sentences.is_empty() {
        return Vec::new();
    }

    let amount = (sentences.len() / 3).clamp(1, MAX_SAMPLED);
    rand::seq::index::sample(rng, sentences.len(), amount)
        .iter()
        .filter_map(|i| {
            let sentence = sentences[i];
            let span = locate(original, sentence)?;
            Annotation::from_span(original, span, sample_comment(sentence))
        })
        .collect()
}

/// Single annotation over the first characters of the document.
pub fn whole_text(original: &str, cleaned_response: &str) -> Option<Annotation> {
    let end = original.chars().count().min(WHOLE_TEXT_PREVIEW_CHARS);
    Annotation::from_span(
        original,
        Span { start: 0, end },
        format!("LLM分析结果：\n{}", cleaned_response),
    )
}

fn keyword_comment(keyword: &str, cleaned_response: &str) -> String {
    format!(
        "检测到可能的问题：使用了\"{}\"等不确定性表述。\n\n\
         建议：在专利申请中应避免使用不确定性的表述，建议具体列举或使用更精确的描述。\n\n\
         LLM分析结果：\n{}",
        keyword, cleaned_response
    )
}

fn sample_comment(sentence: &str) -> String {
    format!(
        "专利审查建议：\n\n此句表述可以进一步优化，建议：\n\
         1. 确保技术术语的准确性\n\
         2. 避免使用模糊或不确定的表述\n\
         3. 保持逻辑清晰和结构完整\n\n\
         当前句子：\"{}\"",
        sentence
    )
}
