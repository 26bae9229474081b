//! Prometheus-based metrics for the solver cascade.
//!
//! This module provides comprehensive metrics collection and export for
//! orchestrator runs, including per-tier invocation counts, promotion
//! events, sandbox outcomes, and evaluation scores.
//!
//! # Example
//!
//! ```ignore
//! use cascade_core::metrics::{init_metrics, export_metrics};
//!
//! init_metrics().expect("failed to initialize metrics");
//! let text = export_metrics();
//! ```

mod prometheus;

pub use prometheus::{
    export_metrics, init_metrics, metrics_handler, record_eval_score, record_promotion,
    record_sandbox_outcome, record_tier_attempt, ACTIVE_WORKERS, EVAL_SCORE, PROMOTIONS_TOTAL,
    REGISTRY, SANDBOX_OUTCOMES_TOTAL, TIER_ATTEMPT_DURATION, TIER_ATTEMPTS_TOTAL,
};
