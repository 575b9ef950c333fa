//! LLM integration for patent review.
//!
//! Sends document text to an OpenAI-compatible chat API and returns the raw
//! review text for annotation.

mod client;

pub use client::{
    ConfigError, Endpoint, LlmClient, LlmConfig, LlmError, LlmProvider, ProviderPreset,
    ProviderPresets, DEFAULT_REVIEW_PROMPT,
};
