//! Gemini backend
//!
//! Uses `generateContent` with a response schema so the model answers with
//! the analysis JSON directly.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{build_prompt, parse_analysis, AIAnalysis, AgentSummary, InsightBackend, InsightError};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Gemini generative-language client
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
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
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Gemini's OpenAPI-subset schema uses uppercase type names
fn gemini_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "recommendations": { "type": "ARRAY", "items": { "type": "STRING" } },
            "bottlenecks": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["summary", "recommendations", "bottlenecks"]
    })
}

#[async_trait]
impl InsightBackend for GeminiBackend {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn analyze(&self, agents: &[AgentSummary]) -> Result<AIAnalysis, InsightError> {
        if self.api_key.is_empty() {
            return Err(InsightError::Config(
                "Gemini API key not configured (set GEMINI_API_KEY)".to_string(),
            ));
        }

        let prompt = build_prompt(agents)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": gemini_schema()
            }
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| InsightError::Transport {
                backend: "gemini",
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                backend: "gemini",
                status,
                body,
            });
        }

        let generated: GenerateResponse =
            response.json().await.map_err(|source| InsightError::Transport {
                backend: "gemini",
                source,
            })?;

        let text = generated
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .next()
            .ok_or(InsightError::EmptyResponse("gemini"))?;

        parse_analysis(&text)
    }
}
