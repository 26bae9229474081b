//! External Synthesis Client — S2: last-resort tier, an adapter over an
//! external code-generation endpoint treated as a black box by the core.
//! Grounded on the `LlmProvider` trait and `LiteLlmClient`
//! (`llm/litellm.rs`).

mod http;
mod null;

pub use http::HttpSynthesisClient;
pub use null::NullSynthesisClient;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::SynthesisError;
use crate::task::Task;

/// A bounded synthesis request: the task itself, optional prior-attempt
/// feedback and retrieval hints, and a per-call time budget.
#[derive(Debug, Clone)]
pub struct SynthesisRequest<'a> {
    pub task: &'a Task,
    pub feedback: Option<&'a str>,
    pub hints: &'a [String],
    pub budget: Duration,
}

/// Adapter over a remote code generator. Transient failures MUST surface
/// as `Ok(None)` or a `SynthesisError`, never as a panic — the
/// orchestrator's retry loop is responsible for bounded retries.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    async fn synthesize(&self, request: SynthesisRequest<'_>) -> Result<Option<String>, SynthesisError>;
}
