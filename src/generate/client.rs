use async_trait::async_trait;

use crate::{
    config::GenerationConfig,
    foundation::error::{CarouselError, CarouselResult},
};

/// Text-completion seam used by [`crate::CarouselGenerator`].
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Complete `prompt`, returning the raw model text.
    async fn complete(&self, prompt: &str) -> CarouselResult<String>;
}

/// Completion client for the `generateContent` REST API.
///
/// One request per call; there is no retry or timeout beyond what the HTTP client does.
#[derive(Clone, Debug)]
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }

    /// `true` when an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request URL without the key query parameter.
    pub fn request_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

/// JSON body for a single-turn text prompt.
pub(crate) fn request_body(prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
    })
}

/// Concatenated text parts of the first candidate.
pub(crate) fn extract_text(body: &str) -> CarouselResult<String> {
    let resp: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| CarouselError::generation(format!("malformed completion response: {e}")))?;
    let text = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(CarouselError::generation("completion response has no text"));
    }
    Ok(text)
}

#[async_trait]
impl TextCompletion for HttpCompletionClient {
    #[tracing::instrument(skip_all, fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> CarouselResult<String> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            CarouselError::backend_unavailable(
                "no API key configured; set CAROUSEL_API_KEY or GEMINI_API_KEY",
            )
        })?;

        let resp = self
            .http
            .post(self.request_url())
            .query(&[("key", key)])
            .json(&request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                CarouselError::generation(format!("completion request failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CarouselError::generation(format!("read completion response: {e}")))?;
        if !status.is_success() {
            tracing::warn!(%status, "completion backend returned an error");
            return Err(CarouselError::generation(format!(
                "completion backend returned {status}: {body}"
            )));
        }

        let text = extract_text(&body)?;
        tracing::debug!(chars = text.len(), "completion received");
        Ok(text)
    }
}
