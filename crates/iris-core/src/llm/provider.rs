//! LLM provider trait and request/response types.
//!
//! The remote model is reached through one narrow capability, `generate`,
//! so the network call can be swapped for a stub in tests.

use crate::error::AnalyzeError;
use crate::image::ImageInput;
use async_trait::async_trait;

/// A request to analyse one image.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The image to analyse
    pub image: ImageInput,
    /// Text prompt for the model
    pub prompt: String,
    /// Maximum tokens to generate (provider default when `None`)
    pub max_tokens: Option<u32>,
    /// Sampling temperature (provider default when `None`)
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Build a request with provider-default sampling.
    pub fn new(image: ImageInput, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            max_tokens: None,
            temperature: None,
        }
    }
}

/// The text a provider returned.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the analyzer holds a `Box<dyn LlmProvider>`).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send the image and prompt, return the model's text.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, AnalyzeError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Name of the variable in a `${ENV_VAR}` reference, if it is one.
pub fn env_var_name(value: &str) -> Option<&str> {
    value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
}
