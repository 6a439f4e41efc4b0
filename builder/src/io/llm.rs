//! Generative call boundary.
//!
//! The [`Generator`] trait decouples the phases from the model backend
//! (currently the Gemini `generateContent` REST endpoint). Tests use scripted
//! generators that return predetermined responses without network access.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::types::Phase;
use crate::io::config::BuilderConfig;

/// Response bodies longer than this are cut in error messages.
const ERROR_BODY_PREVIEW_CHARS: usize = 300;

/// One prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub phase: Phase,
    pub prompt: String,
}

impl GenerateRequest {
    pub fn new(phase: Phase, prompt: impl Into<String>) -> Self {
        Self {
            phase,
            prompt: prompt.into(),
        }
    }
}

/// Abstraction over text-in/text-out model backends.
pub trait Generator {
    /// Send the prompt and return the full response text.
    fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

/// Failures at the model boundary that abort the build.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no candidates{}", blocked_suffix(.block_reason))]
    NoCandidates { block_reason: Option<String> },
    #[error("API key environment variable {0} is not set")]
    MissingApiKey(String),
}

fn blocked_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(" (blocked: {reason})"))
        .unwrap_or_default()
}

/// Settings for the generative client, resolved once per run.
#[derive(Clone)]
pub struct LlmSettings {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmSettings {
    /// Combine config with the API key read from `cfg.llm.api_key_env`.
    ///
    /// `api_key` is passed in rather than read here so callers decide where
    /// the environment lookup happens.
    pub fn resolve(cfg: &BuilderConfig, api_key: Option<String>) -> Result<Self, GenerateError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| GenerateError::MissingApiKey(cfg.llm.api_key_env.clone()))?;
        Ok(Self {
            model: cfg.llm.model.clone(),
            api_key,
            base_url: cfg.llm.base_url.trim_end_matches('/').to_string(),
            temperature: cfg.llm.temperature,
            max_output_tokens: cfg.llm.max_output_tokens,
            timeout: cfg.request_timeout(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Generator backed by the Gemini REST API.
pub struct GeminiClient {
    http: Client,
    settings: LlmSettings,
}

impl GeminiClient {
    pub fn new(settings: LlmSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("build http client")?;
        Ok(Self { http, settings })
    }
}

impl Generator for GeminiClient {
    #[instrument(skip_all, fields(phase = %request.phase, model = %self.settings.model, prompt_bytes = request.prompt.len()))]
    fn generate(&self, request: &GenerateRequest) -> Result<String> {
        info!("sending generate request");
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.settings.endpoint())
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body)
            .send()
            .with_context(|| format!("send {} request", request.phase))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .with_context(|| format!("read {} response body", request.phase))?;
        check_status(status, &text)?;

        let content = decode_response(&text)?;
        debug!(response_bytes = content.len(), "generate request completed");
        Ok(content)
    }
}

/// Reject non-2xx responses, keeping a preview of the body.
fn check_status(status: u16, body: &str) -> Result<(), GenerateError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    warn!(status, "generate request failed");
    Err(GenerateError::Status {
        status,
        body: preview(body, ERROR_BODY_PREVIEW_CHARS).to_string(),
    })
}

/// Concatenate the text parts of the first candidate.
fn decode_response(body: &str) -> Result<String> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).context("parse generateContent response")?;
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err(GenerateError::NoCandidates {
            block_reason: parsed.prompt_feedback.and_then(|f| f.block_reason),
        }
        .into());
    };
    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!(finish_reason = reason, "response finished early");
        }
    }
    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Ok(text)
}

fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_joins_text_parts_of_first_candidate() {
        let body = r####"{
            "candidates": [
                {"content": {"parts": [{"text": "### index.html\n"}, {"text": "```html\n```"}]},
                 "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"####;
        let text = decode_response(body).expect("decode");
        assert_eq!(text, "### index.html\n```html\n```");
    }

    #[test]
    fn decode_without_candidates_reports_block_reason() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = decode_response(body).unwrap_err();
        let err = err.downcast::<GenerateError>().expect("generate error");
        assert!(matches!(
            err,
            GenerateError::NoCandidates { block_reason: Some(ref r) } if r == "SAFETY"
        ));
        assert!(err.to_string().contains("blocked: SAFETY"));
    }

    #[test]
    fn decode_candidate_without_content_is_empty_text() {
        let body = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        assert_eq!(decode_response(body).expect("decode"), "");
    }

    #[test]
    fn request_serializes_to_gemini_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.5,
                max_output_tokens: 128,
            },
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 128);
        assert_eq!(value["generationConfig"]["temperature"], 0.5);
    }

    #[test]
    fn settings_require_api_key() {
        let cfg = BuilderConfig::default();
        let err = LlmSettings::resolve(&cfg, Some("  ".to_string())).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let settings = LlmSettings::resolve(&cfg, Some("secret".to_string())).expect("settings");
        assert_eq!(
            settings.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-pro:generateContent"
        );
        assert!(!format!("{settings:?}").contains("secret"));
    }

    #[test]
    fn error_status_keeps_body_preview() {
        assert!(check_status(200, "{}").is_ok());

        let body = format!("{{\"error\": \"{}\"}}", "x".repeat(500));
        let err = check_status(429, &body).unwrap_err();
        let GenerateError::Status { status, body: shown } = &err else {
            panic!("expected status error, got {err:?}");
        };
        assert_eq!(*status, 429);
        assert_eq!(shown.chars().count(), ERROR_BODY_PREVIEW_CHARS);
        assert!(shown.starts_with("{\"error\": \"xxx"));
        assert!(err.to_string().starts_with("model API returned 429: "));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("ééé", 2), "éé");
        assert_eq!(preview("ok", 10), "ok");
    }
}
