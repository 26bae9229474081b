//! Error types for the solver cascade.
//!
//! Defines one `thiserror`-derived enum per subsystem (sandbox, evaluation,
//! synthesis, promotion, mutation) plus a top-level `CoreError` that
//! composes them for the orchestrator's public `Result`.

use thiserror::Error;

/// Errors raised by the sandbox runner.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to spawn interpreter: {0}")]
    Spawn(String),

    #[error("failed to write temporary source file: {0}")]
    Io(#[from] std::io::Error),

    #[error("command blocked by deny list: {0}")]
    Blocked(String),
}

/// Errors raised by the external synthesis client.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("transient failure: {0}")]
    Transient(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("failed to parse synthesis response: {0}")]
    ParseError(String),
}

/// Errors raised by the promotion pipeline.
#[derive(Debug, Error)]
pub enum PromotionError {
    #[error("failed to persist promotion state: {0}")]
    Persistence(String),

    #[error("failed to (de)serialize promotion state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the mutation engine.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("no mutation site found in source")]
    NoMutationSite,

    #[error("mutation did not change program behavior")]
    Ineffective,
}

/// Top-level error returned by the `SolverOrchestrator`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The task's test-case list is empty or otherwise non-conforming.
    /// Fatal for the attempt, never invokes a tier.
    #[error("malformed task '{task_id}': {reason}")]
    MalformedTask { task_id: String, reason: String },

    /// A contract violation in a core component. Fatal for the worker;
    /// the external driver decides whether to continue.
    #[error("internal contract violation: {0}")]
    Internal(String),

    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    #[error("synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("promotion error: {0}")]
    Promotion(#[from] PromotionError),
}
