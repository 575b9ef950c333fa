//! Response → annotations, with structured extraction first.

use rand::Rng;
use tracing::{debug, warn};

use super::{Annotation, FallbackAnnotator, StructuredExtractor};

/// Turns a model response into annotations over the original text.
#[derive(Debug, Clone, Default)]
pub struct ResponseAnnotator {
    extractor: StructuredExtractor,
    fallback: FallbackAnnotator,
}

impl ResponseAnnotator {
    pub fn new(fallback: FallbackAnnotator) -> Self {
        Self {
            extractor: StructuredExtractor::new(),
            fallback,
        }
    }

    pub fn fallback(&self) -> &FallbackAnnotator {
        &self.fallback
    }

    /// Structured extraction, falling back to heuristics when it finds
    /// nothing. Non-empty `original` text always yields at least one
    /// annotation.
    pub fn annotate<R: Rng + ?Sized>(
        &self,
        response: &str,
        original: &str,
        rng: &mut R,
    ) -> Vec<Annotation> {
        let extracted = self.extractor.extract(response, original);
        if !extracted.is_empty() {
            debug!("Extracted {} structured annotations", extracted.len());
            return extracted;
        }

        warn!("No structured issues in model response, using fallback annotations");
        self.fallback.annotate(response, original, rng)
    }
}
