use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::model::diagram::DiagramImage;

pub const API_KEY_HEADER: &str = "x-goog-api-key";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The external generative model, reduced to the two calls the workflow makes.
/// Both block until the service answers and are tried exactly once.
pub trait ModelClient {
    /// Stage 1: diagram plus prompt text, returns the structural XML.
    fn generate_structure(&self, image: &DiagramImage, prompt: &str)
        -> Result<String, ServiceError>;

    /// Stage 2: text only, returns the XML with rates filled in.
    fn generate_rates(&self, prompt: &str) -> Result<String, ServiceError>;
}

#[derive(Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
    pub total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Joins every text part of the first candidate, trimmed.
    pub fn into_text(self) -> Result<String, ServiceError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Google Gemini `generateContent` over blocking HTTP.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn send(&self, parts: Vec<Part>) -> Result<String, ServiceError> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user".into(),
                parts,
            }],
        };

        debug!(url = %self.endpoint(), model = %self.model, "sending generateContent request");

        // The key travels as a header; errors are stripped of their URL too.
        let resp = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&req)
            .send()
            .map_err(reqwest::Error::without_url)?;

        let status = resp.status();
        let body = resp.text().map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            info!(
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "model usage"
            );
        }

        parsed.into_text()
    }
}

impl ModelClient for GeminiClient {
    fn generate_structure(
        &self,
        image: &DiagramImage,
        prompt: &str,
    ) -> Result<String, ServiceError> {
        debug!(
            image = %image.file_name,
            width = image.width,
            height = image.height,
            bytes = image.bytes.len(),
            prompt_chars = prompt.len(),
            "stage 1 request"
        );

        self.send(vec![
            Part::InlineData {
                mime_type: image.mime_type.to_string(),
                data: STANDARD.encode(&image.bytes),
            },
            Part::Text(prompt.to_string()),
        ])
    }

    fn generate_rates(&self, prompt: &str) -> Result<String, ServiceError> {
        debug!(prompt_chars = prompt.len(), "stage 2 request");
        self.send(vec![Part::Text(prompt.to_string())])
    }
}
