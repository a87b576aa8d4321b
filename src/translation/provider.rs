//! The remote model call and its Gemini implementation.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ClientError, RequestError};

/// Default Gemini REST base URL.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Fixed per-request generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub system_instruction: String,
    pub temperature: f32,
}

/// A model that can answer one `generateContent` call.
///
/// `Ok(None)` means the provider replied successfully but produced no text.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<Option<String>, RequestError>;
}

/// Builds a [`Provider`] for a credential and model.
pub trait Connector: Send + Sync {
    fn connect(&self, api_key: &str, model: &str) -> Result<Arc<dyn Provider>, ClientError>;
}

/// Connects to the Gemini REST API at `endpoint`.
#[derive(Debug, Clone)]
pub struct GeminiConnector {
    endpoint: String,
}

impl GeminiConnector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for GeminiConnector {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl Connector for GeminiConnector {
    fn connect(&self, api_key: &str, model: &str) -> Result<Arc<dyn Provider>, ClientError> {
        let provider = GeminiProvider::new(&self.endpoint, api_key, model)?;
        Ok(Arc::new(provider))
    }
}

pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    api_key: HeaderValue,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Validates the credential and model and builds the HTTP client.
    pub fn new(endpoint: &str, api_key: &str, model: &str) -> Result<Self, ClientError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::EmptyKey);
        }
        if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ClientError::InitFailed(
                "API key contains whitespace or control characters".to_string(),
            ));
        }
        validate_model_name(model)?;

        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| ClientError::InitFailed(format!("invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        let client = Client::builder()
            .build()
            .map_err(|e| ClientError::InitFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

fn validate_model_name(model: &str) -> Result<(), ClientError> {
    let name = model.strip_prefix("models/").unwrap_or(model);
    if name.is_empty() {
        return Err(ClientError::InitFailed("model name is empty".to_string()));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
    {
        return Err(ClientError::InitFailed(format!(
            "invalid model name: '{model}'"
        )));
    }
    Ok(())
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate_content(
        &self,
        model: &str,
        user_text: &str,
        config: &GenerationConfig,
    ) -> Result<Option<String>, RequestError> {
        let model = model.strip_prefix("models/").unwrap_or(model);
        let url = format!("{}/models/{model}:generateContent", self.endpoint);

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &config.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user_text }],
            }],
            generation_config: GenerationSettings {
                temperature: config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(RequestError::Api { status, message });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RequestError::Decode(e.to_string()))?;

        Ok(parsed.text())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationSettings,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationSettings {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        }
    }
}
