//! Error types for Iris.
//!
//! Failures are split by where they happen: loading configuration, or
//! analysing an image (file access, the network call, the provider's reply).
//! Every analysis failure maps onto a stable [`ErrorKind`] so the CLI can
//! report it distinctly instead of crashing.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Iris operations.
#[derive(Error, Debug)]
pub enum IrisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Image analysis errors
    #[error("Analysis error: {0}")]
    Analyze(#[from] AnalyzeError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while analysing a single image.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Input path does not exist
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Input exists but could not be read, or is empty
    #[error("Cannot read {path}: {message}")]
    FileRead { path: PathBuf, message: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Media type could not be determined or is not accepted
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Connection, DNS or transport failure before a status was received
    #[error("{provider} request failed: {message}")]
    Network { provider: String, message: String },

    /// Request exceeded the configured timeout
    #[error("{provider} request timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    /// No API key could be resolved
    #[error("{provider} API key not set. Set the {env_var} env var or pass --api-key.")]
    MissingApiKey { provider: String, env_var: String },

    /// Credentials rejected by the remote service
    #[error("{provider} rejected the API key (HTTP {status}): {message}")]
    Auth {
        provider: String,
        status: u16,
        message: String,
    },

    /// Quota or rate limit exhausted
    #[error("{provider} quota exceeded (HTTP {status}): {message}")]
    Quota {
        provider: String,
        status: u16,
        message: String,
    },

    /// Any other non-success status
    #[error("{provider} HTTP {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Response parsed but carried no usable text
    #[error("{provider} returned an empty response: {reason}")]
    EmptyResponse { provider: String, reason: String },

    /// Response body did not match the expected shape
    #[error("Failed to parse {provider} response: {message}")]
    MalformedResponse { provider: String, message: String },
}

/// Coarse classification of [`AnalyzeError`] for reporting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    File,
    Network,
    Auth,
    Quota,
    Api,
    EmptyResponse,
}

impl ErrorKind {
    /// Stable slug used in log fields and CLI messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::FileNotFound => "file-not-found",
            ErrorKind::File => "file-error",
            ErrorKind::Network => "network-error",
            ErrorKind::Auth => "auth-error",
            ErrorKind::Quota => "quota-error",
            ErrorKind::Api => "api-error",
            ErrorKind::EmptyResponse => "empty-response",
        }
    }

    /// Process exit code for this kind. 0-2 are left to success, generic
    /// failures and configuration problems.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::FileNotFound | ErrorKind::File => 3,
            ErrorKind::Network => 4,
            ErrorKind::Auth => 5,
            ErrorKind::Quota => 6,
            ErrorKind::EmptyResponse => 7,
            ErrorKind::Api => 8,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnalyzeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalyzeError::FileNotFound(_) => ErrorKind::FileNotFound,
            AnalyzeError::FileRead { .. }
            | AnalyzeError::FileTooLarge { .. }
            | AnalyzeError::UnsupportedFormat { .. } => ErrorKind::File,
            AnalyzeError::Network { .. } | AnalyzeError::Timeout { .. } => ErrorKind::Network,
            AnalyzeError::MissingApiKey { .. } | AnalyzeError::Auth { .. } => ErrorKind::Auth,
            AnalyzeError::Quota { .. } => ErrorKind::Quota,
            AnalyzeError::Api { .. } | AnalyzeError::MalformedResponse { .. } => ErrorKind::Api,
            AnalyzeError::EmptyResponse { .. } => ErrorKind::EmptyResponse,
        }
    }

    /// HTTP status returned by the provider, if the failure carried one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AnalyzeError::Auth { status, .. }
            | AnalyzeError::Quota { status, .. }
            | AnalyzeError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience type alias for Iris results.
pub type Result<T> = std::result::Result<T, IrisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_errors_classified() {
        let err = AnalyzeError::FileNotFound(PathBuf::from("2.png"));
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
        assert_eq!(err.kind().as_str(), "file-not-found");

        let err = AnalyzeError::FileTooLarge {
            path: PathBuf::from("big.jpg"),
            size_mb: 40,
            max_mb: 20,
        };
        assert_eq!(err.kind(), ErrorKind::File);
    }

    #[test]
    fn test_timeout_counts_as_network() {
        let err = AnalyzeError::Timeout {
            provider: "gemini".to_string(),
            timeout_ms: 1000,
        };
        assert_eq!(err.kind(), ErrorKind::Network);
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_missing_key_is_auth() {
        let err = AnalyzeError::MissingApiKey {
            provider: "gemini".to_string(),
            env_var: "GEMINI_API_KEY".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_status_code_exposed() {
        let err = AnalyzeError::Quota {
            provider: "gemini".to_string(),
            status: 429,
            message: "Resource has been exhausted".to_string(),
        };
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.kind().exit_code(), 6);
    }

    #[test]
    fn test_exit_codes_distinct_per_kind() {
        let kinds = [
            ErrorKind::File,
            ErrorKind::Network,
            ErrorKind::Auth,
            ErrorKind::Quota,
            ErrorKind::Api,
            ErrorKind::EmptyResponse,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|c| *c > 2));
    }
}
