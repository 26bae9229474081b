//! Tiered program-synthesis core: a solver cascade that routes coding
//! tasks through deterministic templates, promoted strategies, a
//! response cache, and external synthesis, sandboxing every candidate
//! before it is trusted.

pub mod cache;
pub mod config;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod mutation;
pub mod orchestrator;
pub mod promotion;
pub mod sandbox;
pub mod solvers;
pub mod synthesis;
pub mod task;

pub use config::{ConfigError, OrchestratorConfig};
pub use error::{CoreError, MutationError, PromotionError, SandboxError, SynthesisError};
pub use eval::EvalResult;
pub use orchestrator::{OutcomeRecord, SolverOrchestrator};
pub use task::{Candidate, Task, Tier};
