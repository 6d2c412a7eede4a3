//! Iris Core - send one image and a prompt to a hosted vision model.
//!
//! ```text
//! File → ImageInput (bytes + media type) → LlmProvider::generate → Analysis → stdout
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use iris_core::{AnalyzeOptions, Analyzer, Config, GeminiProvider};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> iris_core::Result<()> {
//!     let config = Config::load()?;
//!     let provider = GeminiProvider::from_config(
//!         &config.llm.gemini,
//!         None,
//!         None,
//!         Duration::from_millis(config.limits.request_timeout_ms),
//!     )?;
//!     let analyzer = Analyzer::new(Box::new(provider), AnalyzeOptions::from_config(&config));
//!
//!     let analysis = analyzer.analyze("./2.png".as_ref()).await?;
//!     println!("{}", analysis.text);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod analyzer;
pub mod config;
pub mod error;
pub mod image;
pub mod llm;
pub mod output;
pub mod types;

// Re-exports for convenient access
pub use analyzer::{AnalyzeOptions, Analyzer};
pub use config::Config;
pub use error::{AnalyzeError, ConfigError, ErrorKind, IrisError, Result};
pub use image::{ImageInput, MediaType};
pub use llm::{GeminiProvider, LlmProvider, LlmRequest, LlmResponse};
pub use output::OutputFormat;
pub use types::Analysis;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
