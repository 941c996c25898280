//! LLM floor analysis
//!
//! Sends a reduced projection of the roster to a generative backend and
//! expects a strict JSON [`AIAnalysis`] back. Failures never reach the user
//! as hard errors: [`analyze_or_fallback`] substitutes a fixed analysis.

mod gemini;
mod ollama;

pub use gemini::{GeminiBackend, DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
pub use ollama::{OllamaBackend, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::agents::Agent;

// ============================================================================
// Types
// ============================================================================

/// Structured analysis returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIAnalysis {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub bottlenecks: Vec<String>,
}

impl AIAnalysis {
    /// Deterministic stand-in used when the backend fails
    pub fn fallback() -> Self {
        Self {
            summary: "Error generating AI analysis. Please check your API configuration."
                .to_string(),
            recommendations: vec![
                "Ensure agents are properly logging off".to_string(),
                "Check queue assignments".to_string(),
            ],
            bottlenecks: vec!["Data analysis unavailable".to_string()],
        }
    }
}

/// Per-agent projection sent to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub name: String,
    pub queue: String,
    pub idle_time: u64,
    pub status: String,
    pub score: u8,
}

impl From<&Agent> for AgentSummary {
    fn from(agent: &Agent) -> Self {
        Self {
            name: agent.name.clone(),
            queue: agent.queue.clone(),
            idle_time: agent.idle_minutes,
            status: agent.routing_status.to_string(),
            score: agent.efficiency_score,
        }
    }
}

/// Analysis failures; only ever logged
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("request to {backend} failed: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned no content")]
    EmptyResponse(&'static str),

    #[error("failed to parse analysis JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Config(String),
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Trait for generative analysis backends
#[async_trait]
pub trait InsightBackend: Send + Sync {
    /// Get the name of this backend
    fn name(&self) -> &'static str;

    /// Analyze the given agent projections
    async fn analyze(&self, agents: &[AgentSummary]) -> Result<AIAnalysis, InsightError>;
}

/// Run an analysis, degrading to [`AIAnalysis::fallback`] on any failure
pub async fn analyze_or_fallback(backend: &dyn InsightBackend, agents: &[Agent]) -> AIAnalysis {
    let summaries: Vec<AgentSummary> = agents.iter().map(AgentSummary::from).collect();

    match backend.analyze(&summaries).await {
        Ok(analysis) => {
            tracing::info!(
                backend = backend.name(),
                agents = summaries.len(),
                "Analysis complete"
            );
            analysis
        }
        Err(e) => {
            tracing::warn!(backend = backend.name(), "AI analysis failed: {}", e);
            AIAnalysis::fallback()
        }
    }
}

// ============================================================================
// Prompt
// ============================================================================

/// Build the analysis prompt with the roster embedded as a JSON array
pub fn build_prompt(agents: &[AgentSummary]) -> Result<String, InsightError> {
    let data = serde_json::to_string(agents)?;
    Ok(format!(
        "Analyze the following Genesys Cloud CX agent activity data:\n\
         {}\n\n\
         Provide a detailed analysis including:\n\
         1. A concise summary of the current floor state.\n\
         2. Specific recommendations to reduce idle time.\n\
         3. Potential bottlenecks or agents needing intervention.\n\n\
         Respond in strict JSON format.",
        data
    ))
}

/// JSON Schema of [`AIAnalysis`] (lowercase types, as Ollama expects)
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string" },
            "recommendations": { "type": "array", "items": { "type": "string" } },
            "bottlenecks": { "type": "array", "items": { "type": "string" } }
        },
        "required": ["summary", "recommendations", "bottlenecks"]
    })
}

/// Parse model output, tolerating a fenced code block around the JSON
pub fn parse_analysis(text: &str) -> Result<AIAnalysis, InsightError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);
    Ok(serde_json::from_str(body.trim())?)
}
