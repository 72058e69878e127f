// src/llm/gemini.rs

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{LlmError, TextGenerator, status_error};
use crate::config::LlmConfig;

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, config: &LlmConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<PartReq<'a>>,
}

#[derive(Serialize)]
struct PartReq<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResp>,
}

#[derive(Deserialize)]
struct PartResp {
    text: Option<String>,
}

/// Concatenated text of the first candidate.
fn first_candidate_text(body: GenerateContentResponse) -> Option<String> {
    let parts = body.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate_json(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![PartReq { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(status_error(res).await);
        }

        let body: GenerateContentResponse = res.json().await?;
        let text = first_candidate_text(body).ok_or(LlmError::EmptyResponse)?;
        info!(response_len = text.len(), "Gemini response received");
        Ok(text)
    }
}
