//! Ollama backend
//!
//! Direct `/api/chat` call with a JSON-schema `format`, non-streaming.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{
    build_prompt, parse_analysis, response_schema, AIAnalysis, AgentSummary, InsightBackend,
    InsightError,
};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

/// Ollama chat client
pub struct OllamaBackend {
    client: Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(client: Client, url: &str, model: &str) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl InsightBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn analyze(&self, agents: &[AgentSummary]) -> Result<AIAnalysis, InsightError> {
        let prompt = build_prompt(agents)?;
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
            "format": response_schema()
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|source| InsightError::Transport {
                backend: "ollama",
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Status {
                backend: "ollama",
                status,
                body,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|source| InsightError::Transport {
            backend: "ollama",
            source,
        })?;

        let content = chat
            .message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(InsightError::EmptyResponse("ollama"))?;

        parse_analysis(&content)
    }
}
