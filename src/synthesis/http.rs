//! HTTP-backed `SynthesisClient`, grounded on `LiteLlmClient`
//! (OpenAI-chat-compatible request/response shape, `from_env()` reading
//! prefixed environment variables, bounded `reqwest::Client` timeout).

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SynthesisError;

use super::{SynthesisClient, SynthesisRequest};

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Synthesizes candidate source by calling an OpenAI-chat-compatible
/// completion endpoint.
pub struct HttpSynthesisClient {
    api_base: String,
    api_key: Option<String>,
    model: String,
    http_client: Client,
}

impl HttpSynthesisClient {
    pub fn new(api_base: String, api_key: Option<String>, model: String) -> Self {
        Self {
            api_base,
            api_key,
            model,
            http_client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builds a client from `CASCADE_SYNTHESIS_*` environment variables.
    ///
    /// - `CASCADE_SYNTHESIS_API_BASE` (required)
    /// - `CASCADE_SYNTHESIS_API_KEY` (optional)
    /// - `CASCADE_SYNTHESIS_MODEL` (defaults to `"gpt-4o-mini"`)
    pub fn from_env() -> Result<Self, SynthesisError> {
        let api_base = env::var("CASCADE_SYNTHESIS_API_BASE")
            .map_err(|_| SynthesisError::RequestFailed("CASCADE_SYNTHESIS_API_BASE not set".to_string()))?;
        let api_key = env::var("CASCADE_SYNTHESIS_API_KEY").ok();
        let model = env::var("CASCADE_SYNTHESIS_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        Ok(Self::new(api_base, api_key, model))
    }

    fn build_prompt(request: &SynthesisRequest<'_>) -> String {
        let mut prompt = format!(
            "Task category: {}\nTitle: {}\nDescription: {}\n",
            request.task.category, request.task.title, request.task.description
        );
        if !request.hints.is_empty() {
            prompt.push_str(&format!("Hints:\n{}\n", request.hints.join("\n")));
        }
        if let Some(feedback) = request.feedback {
            prompt.push_str(&format!("Previous attempt feedback: {}\n", feedback));
        }
        prompt.push_str(if request.task.is_state_task() {
            "Respond with a newline-separated shell command sequence that satisfies the task, nothing else.\n"
        } else {
            "Respond with source code only, no prose, no code fences.\n"
        });
        prompt
    }
}

#[async_trait]
impl SynthesisClient for HttpSynthesisClient {
    async fn synthesize(&self, request: SynthesisRequest<'_>) -> Result<Option<String>, SynthesisError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Self::build_prompt(&request),
            }],
            max_tokens: Some(2048),
        };

        let mut builder = self
            .http_client
            .post(format!("{}/chat/completions", self.api_base))
            .timeout(request.budget)
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(SynthesisError::Transient(e.to_string())),
            Err(e) => return Err(SynthesisError::Transient(e.to_string())),
        };

        if !response.status().is_success() {
            let status = response.status();
            return Err(SynthesisError::Transient(format!("synthesis endpoint returned {}", status)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::ParseError(e.to_string()))?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty()))
    }
}
