//! Review LLM client configuration.
//!
//! Env vars: ANNOTATE_PROVIDER, ANNOTATE_BASE_URL, ANNOTATE_MODEL, ANNOTATE_API_KEY
//! (MOONSHOT_API_KEY / DEEPSEEK_API_KEY accepted for their providers)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prompts::DEFAULT_REVIEW_PROMPT;

/// Configuration problems detected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("请先配置API Key")]
    MissingApiKey,

    #[error("请配置API地址")]
    MissingBaseUrl,

    #[error("unknown provider: {0} (expected kimi, deepseek or custom)")]
    UnknownProvider(String),
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Moonshot Kimi (default)
    #[default]
    Kimi,
    /// DeepSeek chat API
    DeepSeek,
    /// Any OpenAI-compatible endpoint; base URL must be configured
    Custom,
}

impl LlmProvider {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Kimi => "kimi",
            Self::DeepSeek => "deepseek",
            Self::Custom => "custom",
        }
    }

    /// Provider-specific API key variable, if any.
    fn key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Kimi => Some("MOONSHOT_API_KEY"),
            Self::DeepSeek => Some("DEEPSEEK_API_KEY"),
            Self::Custom => None,
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kimi" | "moonshot" => Ok(Self::Kimi),
            "deepseek" => Ok(Self::DeepSeek),
            "custom" => Ok(Self::Custom),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Connection defaults for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPreset {
    pub provider: LlmProvider,
    pub label: String,
    /// `None` when the caller must supply the URL.
    pub base_url: Option<String>,
    pub model: String,
}

/// Immutable lookup table of provider presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPresets(Vec<ProviderPreset>);

impl ProviderPresets {
    pub fn new(presets: Vec<ProviderPreset>) -> Self {
        Self(presets)
    }

    /// Kimi, DeepSeek and a custom OpenAI-compatible entry.
    pub fn builtin() -> Self {
        Self(vec![
            ProviderPreset {
                provider: LlmProvider::Kimi,
                label: "Kimi (Moonshot)".to_string(),
                base_url: Some("https://api.moonshot.cn/v1".to_string()),
                model: "moonshot-v1-8k".to_string(),
            },
            ProviderPreset {
                provider: LlmProvider::DeepSeek,
                label: "DeepSeek".to_string(),
                base_url: Some("https://api.deepseek.com/v1".to_string()),
                model: "deepseek-chat".to_string(),
            },
            ProviderPreset {
                provider: LlmProvider::Custom,
                label: "Custom (OpenAI-compatible)".to_string(),
                base_url: None,
                model: "gpt-3.5-turbo".to_string(),
            },
        ])
    }

    pub fn get(&self, provider: LlmProvider) -> Option<&ProviderPreset> {
        self.0.iter().find(|p| p.provider == provider)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderPreset> {
        self.0.iter()
    }
}

impl Default for ProviderPresets {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Configuration for the review client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider preset to use
    #[serde(default)]
    pub provider: LlmProvider,
    /// API base URL; overrides the preset (required for `custom`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model name; overrides the preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Review requirements appended to every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_prompt: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: None,
            model: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            review_prompt: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Fully resolved connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl Endpoint {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl LlmConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `ANNOTATE_PROVIDER`: "kimi", "deepseek" or "custom"
    /// - `ANNOTATE_BASE_URL`: API base URL
    /// - `ANNOTATE_MODEL`: Model name
    /// - `ANNOTATE_API_KEY`: API key
    /// - `MOONSHOT_API_KEY` / `DEEPSEEK_API_KEY`: used for their provider when
    ///   no other key is set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ANNOTATE_PROVIDER") {
            match val.parse() {
                Ok(provider) => self.provider = provider,
                Err(e) => tracing::warn!("Ignoring ANNOTATE_PROVIDER: {}", e),
            }
        }
        if let Some(val) = lookup("ANNOTATE_BASE_URL") {
            self.base_url = Some(val);
        }
        if let Some(val) = lookup("ANNOTATE_MODEL") {
            self.model = Some(val);
        }

        // Explicit API key always wins
        if let Some(val) = lookup("ANNOTATE_API_KEY") {
            self.api_key = Some(val);
        } else if self.api_key.is_none() {
            self.api_key = self.provider.key_env_var().and_then(&lookup);
        }

        self
    }

    /// Review requirements, using custom or default.
    pub fn get_review_prompt(&self) -> &str {
        self.review_prompt
            .as_deref()
            .unwrap_or(DEFAULT_REVIEW_PROMPT)
    }

    /// Resolve base URL, model and key against the preset table.
    ///
    /// The key is checked first, then the base URL.
    pub fn resolve(&self, presets: &ProviderPresets) -> Result<Endpoint, ConfigError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let preset = presets.get(self.provider);
        let base_url = non_empty(self.base_url.as_deref())
            .or_else(|| preset.and_then(|p| non_empty(p.base_url.as_deref())))
            .ok_or(ConfigError::MissingBaseUrl)?;
        let model = non_empty(self.model.as_deref())
            .or_else(|| preset.map(|p| p.model.as_str()))
            .unwrap_or("gpt-3.5-turbo");

        Ok(Endpoint {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
