//! Single-image analysis: read the file, make one model call, collect the text.
//!
//! The file is loaded and validated before anything touches the network, so
//! a bad path never costs a request. There is no retry; whatever the provider
//! reports is surfaced as a classified [`AnalyzeError`].

use crate::config::{Config, LimitsConfig};
use crate::error::AnalyzeError;
use crate::image::{ImageInput, MediaType};
use crate::llm::{LlmProvider, LlmRequest};
use crate::types::Analysis;
use std::path::Path;
use std::time::Duration;

/// Options for a single analysis.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Prompt sent with the image
    pub prompt: String,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Reject files larger than this
    pub max_file_size_mb: u64,
    /// Upper bound on the model call in milliseconds
    pub timeout_ms: u64,
    /// Declared media type; sniffed from the file when `None`
    pub media_type: Option<MediaType>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AnalyzeOptions {
    /// Build options from the `[request]` and `[limits]` config sections.
    pub fn from_config(config: &Config) -> Self {
        Self {
            prompt: config.request.prompt.clone(),
            max_tokens: config.request.max_tokens,
            temperature: config.request.temperature,
            max_file_size_mb: config.limits.max_file_size_mb,
            timeout_ms: config.limits.request_timeout_ms,
            media_type: None,
        }
    }
}

/// Sends one image to one provider.
pub struct Analyzer {
    provider: Box<dyn LlmProvider>,
    options: AnalyzeOptions,
}

impl Analyzer {
    pub fn new(provider: Box<dyn LlmProvider>, options: AnalyzeOptions) -> Self {
        Self { provider, options }
    }

    /// Analyse the image at `path`.
    pub async fn analyze(&self, path: &Path) -> Result<Analysis, AnalyzeError> {
        let limits = LimitsConfig {
            max_file_size_mb: self.options.max_file_size_mb,
            request_timeout_ms: self.options.timeout_ms,
        };
        let image = ImageInput::load(path, &limits, self.options.media_type).await?;
        let media_type = image.media_type;
        let file_size = image.bytes.len() as u64;

        let request = LlmRequest {
            image,
            prompt: self.options.prompt.clone(),
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };

        tracing::info!(
            provider = self.provider.name(),
            "Analyzing {:?} ({media_type}, {file_size} bytes)",
            path
        );

        let response = match tokio::time::timeout(
            Duration::from_millis(self.options.timeout_ms),
            self.provider.generate(&request),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AnalyzeError::Timeout {
                    provider: self.provider.name().to_string(),
                    timeout_ms: self.options.timeout_ms,
                });
            }
        };

        tracing::info!(
            model = %response.model,
            tokens = ?response.tokens_used,
            "Response received in {}ms",
            response.latency_ms
        );

        Ok(Analysis {
            file: path.to_path_buf(),
            media_type,
            file_size,
            prompt: request.prompt,
            provider: self.provider.name().to_string(),
            model: response.model,
            text: response.text,
            tokens_used: response.tokens_used,
            latency_ms: response.latency_ms,
        })
    }
}
