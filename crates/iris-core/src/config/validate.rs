//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

/// Largest accepted `limits.max_file_size_mb`. Inline request payloads are
/// capped at 20MB by the API.
pub const MAX_FILE_SIZE_MB: u64 = 100;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request.prompt.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "request.prompt must not be empty".into(),
            ));
        }
        if self.request.max_tokens == Some(0) {
            return Err(ConfigError::ValidationError(
                "request.max_tokens must be > 0".into(),
            ));
        }
        if let Some(t) = self.request.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "request.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb > MAX_FILE_SIZE_MB {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_file_size_mb must be <= {MAX_FILE_SIZE_MB}"
            )));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"text\" or \"json\", got \"{}\"",
                self.output.format
            )));
        }
        if self.llm.gemini.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.gemini.endpoint must not be empty".into(),
            ));
        }
        if self.llm.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.gemini.model must not be empty".into(),
            ));
        }
        Ok(())
    }
}
