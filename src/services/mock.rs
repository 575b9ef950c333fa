//! Offline reviewer that flags hedge words without calling a model.
//!
//! Useful for demos and for exercising the pipeline without an API key.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use super::review::{BackendOutput, ReviewBackend, ReviewError};
use crate::annotation::{locate_all, sentence_at, Annotation};

/// A vague expression and the reason it is flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedgeKeyword {
    pub keyword: String,
    pub message: String,
}

impl HedgeKeyword {
    pub fn new(keyword: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

/// Expressions commonly objected to in patent claims.
pub fn default_hedge_table() -> Vec<HedgeKeyword> {
    vec![
        HedgeKeyword::new("等", "在权利要求书中不应使用\"等\"字，应具体列举所有要素。"),
        HedgeKeyword::new("及其他", "\"及其他\"表述不够具体，建议明确列举。"),
        HedgeKeyword::new("诸如", "\"诸如\"等举例性表述在权利要求中应谨慎使用。"),
        HedgeKeyword::new("比如", "\"比如\"等口语化表述不适合在专利文件中使用。"),
        HedgeKeyword::new(
            "包括但不限于",
            "\"包括但不限于\"在权利要求中可能导致保护范围不明确。",
        ),
        HedgeKeyword::new("可以", "\"可以\"表述不够确定，建议使用\"能够\"或\"用于\"。"),
        HedgeKeyword::new("大概", "\"大概\"等不确定表述不适合在专利文件中使用。"),
        HedgeKeyword::new("大约", "\"大约\"等模糊表述应避免，建议给出具体数值范围。"),
        HedgeKeyword::new("一般", "\"一般\"等泛化表述缺乏具体性。"),
        HedgeKeyword::new("通常", "\"通常\"等表述在专利中应谨慎使用。"),
    ]
}

/// Keyword-table reviewer.
#[derive(Debug, Clone)]
pub struct MockReviewer {
    table: Vec<HedgeKeyword>,
    delay: Duration,
}

impl Default for MockReviewer {
    fn default() -> Self {
        Self::new(default_hedge_table())
    }
}

impl MockReviewer {
    pub fn new(table: Vec<HedgeKeyword>) -> Self {
        let table = table.into_iter().filter(|h| !h.keyword.is_empty()).collect();
        Self {
            table,
            delay: Duration::ZERO,
        }
    }

    /// Simulate model latency before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// One annotation per keyword occurrence, covering its sentence.
    pub fn analyze(&self, text: &str) -> Vec<Annotation> {
        let chars: Vec<char> = text.chars().collect();
        let mut annotations = Vec::new();

        for hedge in &self.table {
            let comment = format!(
                "问题：{}\n\n建议：请修改为更具体和明确的表述，避免使用不确定性词汇。",
                hedge.message
            );
            for hit in locate_all(text, &hedge.keyword) {
                let span = sentence_at(&chars, hit.start);
                if let Some(ann) = Annotation::from_chars(&chars, span, comment.clone()) {
                    annotations.push(ann);
                }
            }
        }

        annotations
    }
}

#[async_trait]
impl ReviewBackend for MockReviewer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn review(&self, text: &str, _prompt: Option<&str>) -> Result<BackendOutput, ReviewError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let annotations = self.analyze(text);
        info!("Mock review produced {} annotations", annotations.len());
        Ok(BackendOutput::Annotations(annotations))
    }
}
