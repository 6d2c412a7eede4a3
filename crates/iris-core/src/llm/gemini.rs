//! Google Gemini provider using the `generateContent` API.
//!
//! Sends the image as an `inlineData` part followed by the prompt as a text
//! part, in a single user turn.

use super::provider::{env_var_name, resolve_env_var, LlmProvider, LlmRequest, LlmResponse};
use crate::config::GeminiConfig;
use crate::error::AnalyzeError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

const PROVIDER: &str = "gemini";

/// Longest slice of a raw error body echoed back to the user.
const MAX_ERROR_BODY: usize = 500;

/// Gemini provider.
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.trim_start_matches("models/").to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider from config, with optional CLI overrides.
    ///
    /// The API key comes from `api_key_override` when given, otherwise from
    /// the config value (with `${ENV_VAR}` expansion).
    pub fn from_config(
        config: &GeminiConfig,
        model_override: Option<&str>,
        api_key_override: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, AnalyzeError> {
        let api_key = api_key_override
            .filter(|k| !k.is_empty())
            .map(String::from)
            .or_else(|| resolve_env_var(&config.api_key))
            .ok_or_else(|| AnalyzeError::MissingApiKey {
                provider: PROVIDER.to_string(),
                env_var: env_var_name(&config.api_key)
                    .unwrap_or("GEMINI_API_KEY")
                    .to_string(),
            })?;
        let model = model_override.unwrap_or(&config.model);
        Ok(Self::new(&config.endpoint, &api_key, model, timeout))
    }

    /// Model name without the "models/" prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Text {
        text: String,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

/// Google API error envelope: `{"error": {"code", "message", "status", "details"}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    reason: Option<String>,
}

/// Map a non-success HTTP response onto an error kind.
///
/// Gemini reports an invalid key as 400 INVALID_ARGUMENT with reason
/// API_KEY_INVALID, so the envelope is consulted as well as the status.
fn classify_failure(status: u16, body: &str) -> AnalyzeError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let message = match &envelope {
        Some(env) if !env.error.message.is_empty() => env.error.message.clone(),
        _ => truncate(body.trim(), MAX_ERROR_BODY),
    };
    let api_status = envelope
        .as_ref()
        .map(|env| env.error.status.as_str())
        .unwrap_or_default();
    let key_invalid = envelope.as_ref().is_some_and(|env| {
        env.error
            .details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
    });

    let provider = PROVIDER.to_string();
    if status == 401
        || status == 403
        || key_invalid
        || api_status == "UNAUTHENTICATED"
        || api_status == "PERMISSION_DENIED"
    {
        AnalyzeError::Auth {
            provider,
            status,
            message,
        }
    } else if status == 429 || api_status == "RESOURCE_EXHAUSTED" {
        AnalyzeError::Quota {
            provider,
            status,
            message,
        }
    } else {
        AnalyzeError::Api {
            provider,
            status,
            message,
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Pull the answer text out of a parsed response.
fn extract_text(resp: &GenerateResponse) -> Result<String, AnalyzeError> {
    let empty = |reason: String| AnalyzeError::EmptyResponse {
        provider: PROVIDER.to_string(),
        reason,
    };

    if let Some(reason) = resp
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        return Err(empty(format!("prompt blocked ({reason})")));
    }

    let candidate = resp
        .candidates
        .first()
        .ok_or_else(|| empty("no candidates returned".to_string()))?;

    let text = candidate
        .content
        .as_ref()
        .map(|c| {
            c.parts
                .iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        let reason = match candidate.finish_reason.as_deref() {
            Some(r) if r != "STOP" => format!("no text content (finish reason {r})"),
            _ => "no text content generated".to_string(),
        };
        return Err(empty(reason));
    }

    Ok(text.to_string())
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, AnalyzeError> {
        let start = Instant::now();

        let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
            Some(GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            })
        } else {
            None
        };

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: request.image.media_type.as_str().to_string(),
                            data: request.image.base64(),
                        },
                    },
                    Part::Text {
                        text: request.prompt.clone(),
                    },
                ],
            }],
            generation_config,
        };

        tracing::debug!(
            "POST {} ({}, {} bytes)",
            self.url(),
            request.image.media_type,
            request.image.bytes.len()
        );

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzeError::Timeout {
                        provider: PROVIDER.to_string(),
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    AnalyzeError::Network {
                        provider: PROVIDER.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::debug!("Gemini HTTP {status}: {text}");
            return Err(classify_failure(status.as_u16(), &text));
        }

        let generate_resp: GenerateResponse =
            resp.json().await.map_err(|e| AnalyzeError::MalformedResponse {
                provider: PROVIDER.to_string(),
                message: e.to_string(),
            })?;

        let text = extract_text(&generate_resp)?;

        Ok(LlmResponse {
            text,
            model: generate_resp
                .model_version
                .unwrap_or_else(|| self.model.clone()),
            tokens_used: generate_resp
                .usage_metadata
                .and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
