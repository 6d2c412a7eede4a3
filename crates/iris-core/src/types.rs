//! Core data types for Iris.

use crate::image::MediaType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of analysing one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    // === Input ===
    /// Path of the analysed file
    pub file: PathBuf,

    /// Media type declared to the provider
    pub media_type: MediaType,

    /// Size of the transmitted payload in bytes
    pub file_size: u64,

    /// Prompt sent with the image
    pub prompt: String,

    // === Response ===
    /// Provider that answered ("gemini")
    pub provider: String,

    /// Model identifier reported by the provider
    pub model: String,

    /// Text returned by the model
    pub text: String,

    /// Tokens consumed (input + output), if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>,

    /// Round-trip latency in milliseconds. Logged, never rendered.
    #[serde(skip)]
    pub latency_ms: u64,
}
