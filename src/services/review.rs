//! Review service: parse → analyze → extract → compose.
//!
//! Parse, configuration and transport failures abort a review. Anything that
//! goes wrong after a response arrives degrades to fallback annotations.

use std::path::Path;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::annotation::{self, Annotation, FallbackAnnotator, RenderMode, ResponseAnnotator};
use crate::llm::{ConfigError, LlmClient, LlmError};
use crate::parser::{DocumentParser, ParseError, ParsedDocument};

/// Response text used when the model returns no content.
pub const EMPTY_RESULT: &str = "LLM分析结果为空";

/// Pipeline failures, by kind.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("不支持的文件格式，请选择Word文档(.doc, .docx)或PDF文件(.pdf)")]
    UnsupportedFormat,

    #[error(transparent)]
    Parse(ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Network failure or non-success status.
    #[error("{message}")]
    Transport { status: Option<u16>, message: String },
}

impl From<ParseError> for ReviewError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::UnsupportedFormat => Self::UnsupportedFormat,
            other => Self::Parse(other),
        }
    }
}

impl From<LlmError> for ReviewError {
    fn from(err: LlmError) -> Self {
        let message = err.to_string();
        match err {
            LlmError::Config(e) => Self::Config(e),
            LlmError::Status { status, .. } => Self::Transport {
                status: Some(status),
                message,
            },
            LlmError::Connection(_) | LlmError::Parse(_) => Self::Transport {
                status: None,
                message,
            },
        }
    }
}

/// What a backend produced for a document.
#[derive(Debug, Clone)]
pub enum BackendOutput {
    /// Free-form model text, still to be turned into annotations.
    Response(String),
    /// Annotations computed directly.
    Annotations(Vec<Annotation>),
}

/// Something that can review document text.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Short name for logs and reports.
    fn name(&self) -> &str;

    async fn review(&self, text: &str, prompt: Option<&str>) -> Result<BackendOutput, ReviewError>;
}

/// Backend that calls the configured chat API.
pub struct LlmReviewer {
    client: LlmClient,
    name: String,
}

impl LlmReviewer {
    pub fn new(client: LlmClient) -> Self {
        let name = format!("llm:{}", client.endpoint().model);
        Self { client, name }
    }
}

#[async_trait]
impl ReviewBackend for LlmReviewer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn review(&self, text: &str, prompt: Option<&str>) -> Result<BackendOutput, ReviewError> {
        let response = self.client.review(text, prompt).await?;
        Ok(BackendOutput::Response(response))
    }
}

/// Result of reviewing one document.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub backend: String,
    pub document: ParsedDocument,
    pub annotations: Vec<Annotation>,
    pub html: String,
}

/// Orchestrates a full review.
pub struct ReviewService {
    parser: DocumentParser,
    backend: Box<dyn ReviewBackend>,
    annotator: ResponseAnnotator,
    mode: RenderMode,
    seed: Option<u64>,
}

impl ReviewService {
    pub fn new(backend: Box<dyn ReviewBackend>) -> Self {
        Self {
            parser: DocumentParser::new(),
            backend,
            annotator: ResponseAnnotator::default(),
            mode: RenderMode::default(),
            seed: None,
        }
    }

    pub fn with_fallback(mut self, fallback: FallbackAnnotator) -> Self {
        self.annotator = ResponseAnnotator::new(fallback);
        self
    }

    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Seed the sentence sampler for reproducible output.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Annotations for `text`, falling back to heuristics as needed.
    ///
    /// Non-empty text always yields at least one annotation, whichever
    /// backend produced the review.
    pub async fn annotate_text(
        &self,
        text: &str,
        prompt: Option<&str>,
    ) -> Result<Vec<Annotation>, ReviewError> {
        let output = self.backend.review(text, prompt).await?;
        let mut rng = self.rng();

        let annotations = match output {
            BackendOutput::Annotations(annotations) if annotations.is_empty() => {
                warn!("{} found no issues, using fallback annotations", self.backend.name());
                self.annotator.fallback().annotate(EMPTY_RESULT, text, &mut rng)
            }
            BackendOutput::Annotations(annotations) => annotations,
            BackendOutput::Response(response) if response.trim().is_empty() => {
                warn!("{} returned an empty result, using fallback annotations", self.backend.name());
                self.annotator.fallback().annotate(EMPTY_RESULT, text, &mut rng)
            }
            BackendOutput::Response(response) => self.annotator.annotate(&response, text, &mut rng),
        };

        Ok(annotations)
    }

    /// Review an already parsed document.
    pub async fn review_document(
        &self,
        document: ParsedDocument,
        prompt: Option<&str>,
    ) -> Result<ReviewReport, ReviewError> {
        let annotations = self.annotate_text(&document.text, prompt).await?;
        let html = annotation::apply(&document.text, &annotations, self.mode);
        info!(
            "Review by {} produced {} annotations",
            self.backend.name(),
            annotations.len()
        );

        Ok(ReviewReport {
            backend: self.backend.name().to_string(),
            document,
            annotations,
            html,
        })
    }

    /// Parse an upload and review it.
    pub async fn review_bytes(
        &self,
        bytes: &[u8],
        file_name: &str,
        declared_mime: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<ReviewReport, ReviewError> {
        let document = self.parser.parse(bytes, file_name, declared_mime).await?;
        self.review_document(document, prompt).await
    }

    /// Read, parse and review a file.
    pub async fn review_path(
        &self,
        path: &Path,
        declared_mime: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<ReviewReport, ReviewError> {
        let document = self.parser.parse_path(path, declared_mime).await?;
        self.review_document(document, prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ExtractionMethod;
    use crate::services::MockReviewer;
    use crate::utils::DocumentFormat;

    struct Canned(&'static str);

    #[async_trait]
    impl ReviewBackend for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn review(
            &self,
            _text: &str,
            _prompt: Option<&str>,
        ) -> Result<BackendOutput, ReviewError> {
            Ok(BackendOutput::Response(self.0.to_string()))
        }
    }

    struct Failing;

    #[async_trait]
    impl ReviewBackend for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn review(
            &self,
            _text: &str,
            _prompt: Option<&str>,
        ) -> Result<BackendOutput, ReviewError> {
            Err(LlmError::Status {
                status: 500,
                reason: "Internal Server Error".to_string(),
            }
            .into())
        }
    }

    fn document(text: &str) -> ParsedDocument {
        ParsedDocument {
            text: text.to_string(),
            format: DocumentFormat::Word,
            method: ExtractionMethod::WordMarkup,
        }
    }

    #[tokio::test]
    async fn test_structured_response() {
        let service = ReviewService::new(Box::new(Canned(
            "问题：\"关于XX的描述不清晰\"\n建议：补充具体参数\n\n",
        )));
        let report = service
            .review_document(document("本发明关于XX的描述不清晰，需要补充。"), None)
            .await
            .unwrap();

        assert_eq!(report.backend, "canned");
        assert_eq!(report.annotations.len(), 1);
        assert!(report.html.contains(r#"data-index="0""#));
    }

    #[tokio::test]
    async fn test_empty_response_uses_fallback() {
        let service = ReviewService::new(Box::new(Canned("   "))).with_seed(Some(1));
        let anns = service
            .annotate_text("一种螺丝等紧固件。", None)
            .await
            .unwrap();

        assert_eq!(anns.len(), 1);
        assert!(anns[0].annotation.ends_with(EMPTY_RESULT));
    }

    #[tokio::test]
    async fn test_mock_without_hedge_words_uses_fallback() {
        let service = ReviewService::new(Box::new(MockReviewer::default())).with_seed(Some(2));
        let anns = service
            .annotate_text("一种杯子。用于盛水。", None)
            .await
            .unwrap();

        assert_eq!(anns.len(), 1);
        assert_eq!((anns[0].start_index, anns[0].end_index), (0, 10));
        assert!(anns[0].annotation.ends_with(EMPTY_RESULT));
    }

    #[tokio::test]
    async fn test_mock_annotations_pass_through() {
        let service = ReviewService::new(Box::new(MockReviewer::default()));
        let anns = service.annotate_text("该装置可以转动。", None).await.unwrap();
        assert_eq!(anns.len(), 1);
        assert!(anns[0].annotation.starts_with("问题：\"可以\""));
    }

    #[tokio::test]
    async fn test_transport_error_aborts() {
        let service = ReviewService::new(Box::new(Failing));
        let err = service.annotate_text("文本", None).await.unwrap_err();
        match err {
            ReviewError::Transport { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "API请求失败: 500 Internal Server Error");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsupported_upload() {
        let service = ReviewService::new(Box::new(Canned("")));
        let err = service
            .review_bytes(b"hello", "notes.txt", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::UnsupportedFormat));
    }

    #[test]
    fn test_config_error_passes_through() {
        let err: ReviewError = LlmError::Config(ConfigError::MissingBaseUrl).into();
        assert!(matches!(err, ReviewError::Config(ConfigError::MissingBaseUrl)));
        assert_eq!(err.to_string(), "请配置API地址");
    }

    #[tokio::test]
    async fn test_visual_mode() {
        let service = ReviewService::new(Box::new(Canned("")))
            .with_mode(RenderMode::VisualOnly)
            .with_seed(Some(3));
        let report = service
            .review_document(document("一种杯子。"), None)
            .await
            .unwrap();
        assert!(report.html.contains("annotation-tooltip"));
    }
}
