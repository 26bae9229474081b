//! Prometheus metrics registration and export.
//!
//! This module defines all Prometheus metrics used by the solver cascade
//! and provides functions for initializing, registering, and exporting
//! them.

use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all cascade-core metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Total attempts per tier, labeled by tier and outcome ("pass"/"fail").
pub static TIER_ATTEMPTS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Per-attempt wall-clock duration in seconds, labeled by tier.
pub static TIER_ATTEMPT_DURATION: OnceLock<HistogramVec> = OnceLock::new();

/// Total promotion events, labeled by transition ("s2_to_s1"/"s1_to_s0").
pub static PROMOTIONS_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Total sandbox command/program outcomes, labeled by outcome
/// ("ok"/"timeout"/"blocked"/"runtime_error").
pub static SANDBOX_OUTCOMES_TOTAL: OnceLock<CounterVec> = OnceLock::new();

/// Distribution of evaluation scores across all attempts.
pub static EVAL_SCORE: OnceLock<Histogram> = OnceLock::new();

/// Number of active orchestrator workers sharing the promotion pipeline.
pub static ACTIVE_WORKERS: OnceLock<Gauge> = OnceLock::new();

/// Initializes all metrics and registers them with the registry.
///
/// Must be called once at process startup before any `record_*` call;
/// subsequent calls are idempotent (the underlying `OnceLock`s silently
/// keep their first value).
///
/// # Errors
///
/// Returns a `prometheus::Error` if metric registration fails, typically
/// due to duplicate metric names.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let registry = Registry::new();

    let tier_attempts_total = CounterVec::new(
        Opts::new(
            "cascade_tier_attempts_total",
            "Total solver-tier attempts by tier and outcome",
        ),
        &["tier", "outcome"],
    )?;

    let tier_attempt_duration = HistogramVec::new(
        prometheus::HistogramOpts::new(
            "cascade_tier_attempt_duration_seconds",
            "Wall-clock duration of a tier attempt in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["tier"],
    )?;

    let promotions_total = CounterVec::new(
        Opts::new("cascade_promotions_total", "Total promotion events"),
        &["transition", "category"],
    )?;

    let sandbox_outcomes_total = CounterVec::new(
        Opts::new(
            "cascade_sandbox_outcomes_total",
            "Total sandbox command/program outcomes",
        ),
        &["outcome"],
    )?;

    let eval_score = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "cascade_eval_score",
            "Distribution of evaluation scores (0.0-1.0)",
        )
        .buckets(vec![0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0]),
    )?;

    let active_workers = Gauge::new(
        "cascade_active_workers",
        "Number of orchestrator workers sharing the promotion pipeline",
    )?;

    registry.register(Box::new(tier_attempts_total.clone()))?;
    registry.register(Box::new(tier_attempt_duration.clone()))?;
    registry.register(Box::new(promotions_total.clone()))?;
    registry.register(Box::new(sandbox_outcomes_total.clone()))?;
    registry.register(Box::new(eval_score.clone()))?;
    registry.register(Box::new(active_workers.clone()))?;

    // If any `set` fails, metrics were already initialized (idempotent).
    let _ = REGISTRY.set(registry);
    let _ = TIER_ATTEMPTS_TOTAL.set(tier_attempts_total);
    let _ = TIER_ATTEMPT_DURATION.set(tier_attempt_duration);
    let _ = PROMOTIONS_TOTAL.set(promotions_total);
    let _ = SANDBOX_OUTCOMES_TOTAL.set(sandbox_outcomes_total);
    let _ = EVAL_SCORE.set(eval_score);
    let _ = ACTIVE_WORKERS.set(active_workers);

    tracing::info!("prometheus metrics initialized");

    Ok(())
}

/// Records a tier attempt outcome and its duration.
pub fn record_tier_attempt(tier: &str, passed: bool, elapsed_secs: f64) {
    if let Some(counter) = TIER_ATTEMPTS_TOTAL.get() {
        let outcome = if passed { "pass" } else { "fail" };
        counter.with_label_values(&[tier, outcome]).inc();
    }
    if let Some(hist) = TIER_ATTEMPT_DURATION.get() {
        hist.with_label_values(&[tier]).observe(elapsed_secs);
    }
}

/// Records a promotion event (`"s2_to_s1"` or `"s1_to_s0"`).
pub fn record_promotion(transition: &str, category: &str) {
    if let Some(counter) = PROMOTIONS_TOTAL.get() {
        counter.with_label_values(&[transition, category]).inc();
    }
}

/// Records a sandbox outcome (`"ok"`, `"timeout"`, `"blocked"`, `"runtime_error"`).
pub fn record_sandbox_outcome(outcome: &str) {
    if let Some(counter) = SANDBOX_OUTCOMES_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

/// Records an evaluation score observation.
pub fn record_eval_score(score: f64) {
    if let Some(hist) = EVAL_SCORE.get() {
        hist.observe(score);
    }
}

/// Exports all registered metrics in Prometheus text format.
///
/// Returns an informative comment line if metrics have not been
/// initialized yet rather than panicking.
pub fn export_metrics() -> String {
    let Some(registry) = REGISTRY.get() else {
        return "# Metrics not initialized. Call init_metrics() first.\n".to_string();
    };

    let encoder = TextEncoder::new();
    let metric_families = registry.gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return format!("# Error encoding metrics: {}\n", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|e| format!("# Error converting metrics to UTF-8: {}\n", e))
}

/// HTTP-framework-agnostic handler for a `/metrics` endpoint.
pub async fn metrics_handler() -> String {
    export_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_metrics_is_idempotent() {
        let result = init_metrics();
        assert!(result.is_ok() || REGISTRY.get().is_some());
    }

    #[test]
    fn export_after_init_has_no_error_prefix() {
        let _ = init_metrics();
        let text = export_metrics();
        assert!(!text.is_empty());
        assert!(!text.starts_with("# Error"));
    }

    #[test]
    fn record_helpers_do_not_panic_before_init() {
        // Calling record_* before init_metrics must be a silent no-op, not a panic,
        // since tests across the crate may run in any order.
        record_tier_attempt("s0", true, 0.01);
        record_promotion("s2_to_s1", "algorithms");
        record_sandbox_outcome("ok");
        record_eval_score(1.0);
    }
}
