//! LLM integration for image analysis.
//!
//! A provider abstraction over the hosted model, plus the Gemini backend.

pub(crate) mod gemini;
pub(crate) mod provider;

pub use gemini::GeminiProvider;
pub use provider::{env_var_name, resolve_env_var, LlmProvider, LlmRequest, LlmResponse};
