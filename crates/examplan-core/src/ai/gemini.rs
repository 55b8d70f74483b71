//! Gemini `generateContent` client with chat history.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{ImageUpload, ModelClient};
use crate::error::{ConfigError, CoreError, Result};
use crate::prompt;

/// Environment variable that overrides `model.api_key`.
pub const API_KEY_ENV: &str = "EXAMPLAN_API_KEY";

/// Model identity and sampling parameters shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_response_mime_type")]
    pub response_mime_type: String,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f64 {
    1.0
}
fn default_top_p() -> f64 {
    0.95
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> u32 {
    8192
}
fn default_response_mime_type() -> String {
    "text/plain".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            response_mime_type: default_response_mime_type(),
        }
    }
}

impl ModelConfig {
    /// `EXAMPLAN_API_KEY` if set, else the configured key.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| (!self.api_key.is_empty()).then(|| self.api_key.clone()))
    }

    fn generation_config(&self) -> GenerationConfig<'_> {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
            response_mime_type: &self.response_mime_type,
        }
    }
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

/// Pull `error.message` out of an API error body, or fall back to the body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

// ── Client ───────────────────────────────────────────────────────────

/// One chat session against the Gemini REST API.
///
/// Successful exchanges are appended to the history and resent with every
/// later request, so the plan request still sees the schedule image.
pub struct GeminiClient {
    config: ModelConfig,
    http_client: Client,
    history: Vec<Content>,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Number of turns (user and model) kept in the session.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    async fn send(&mut self, parts: Vec<Part>) -> Result<String> {
        let api_key = self
            .config
            .resolved_api_key()
            .ok_or_else(|| ConfigError::MissingKey("model.api_key".into()))?;

        let mut contents = self.history.clone();
        contents.push(Content {
            role: "user",
            parts,
        });

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let body = GenerateContentRequest {
            contents: &contents,
            generation_config: self.config.generation_config(),
        };
        tracing::debug!(model = %self.config.model, turns = contents.len(), "sending generateContent");

        let resp = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CoreError::Service {
                status: Some(status.as_u16()),
                message: api_error_message(&text),
            });
        }

        let payload: GenerateContentResponse = resp.json().await?;
        let text = payload
            .text()
            .ok_or_else(|| CoreError::service("response contained no candidate text"))?;
        tracing::debug!(chars = text.len(), "model responded");

        self.history = contents;
        self.history.push(Content {
            role: "model",
            parts: vec![Part::Text { text: text.clone() }],
        });
        Ok(text)
    }
}

impl ModelClient for GeminiClient {
    async fn extract(&mut self, image: &ImageUpload) -> Result<String> {
        let parts = vec![
            Part::Text {
                text: prompt::extraction_prompt().to_string(),
            },
            Part::InlineData {
                inline_data: Blob {
                    mime_type: image.mime_type.clone(),
                    data: STANDARD.encode(&image.bytes),
                },
            },
        ];
        self.send(parts).await
    }

    async fn generate(&mut self, prompt: &str) -> Result<String> {
        self.send(vec![Part::Text {
            text: prompt.to_string(),
        }])
        .await
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_wire_names() {
        let config = ModelConfig::default();
        let contents = [Content {
            role: "user",
            parts: vec![
                Part::Text { text: "hi".into() },
                Part::InlineData {
                    inline_data: Blob {
                        mime_type: "image/png".into(),
                        data: STANDARD.encode(b"png"),
                    },
                },
            ],
        }];
        let body = serde_json::to_value(GenerateContentRequest {
            contents: &contents,
            generation_config: config.generation_config(),
        })
        .unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "cG5n");
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let payload: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Morning\n"},{"text":"Rest"}]}},
                               {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(payload.text().as_deref(), Some("Morning\nRest"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn api_error_message_prefers_error_object() {
        assert_eq!(
            api_error_message(r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }
}
