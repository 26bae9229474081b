//! Promotion Pipeline: the state machine moving strategies between tiers
//! as they accumulate successes. Grounded on
//! `promotion_pipeline.py::PromotionPipeline`, wrapped in a shared guarded
//! handle (`Arc<tokio::sync::Mutex<...>>`) so K workers can observe a
//! single consistent promotion object, following the same sharing of
//! `Arc<Database>`/`Arc<CostTracker>` handles across spawned workers seen
//! in `scheduler/worker_pool.rs`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use crate::metrics;

use super::persistence;
use super::signature::sign;
use super::state::{PromotionCandidate, PromotionState, ResponseCache};

/// Default S2→S1 promotion threshold.
pub const DEFAULT_S2_TO_S1_THRESHOLD: u32 = 3;
/// Default S1→S0 promotion threshold.
pub const DEFAULT_S1_TO_S0_THRESHOLD: u32 = 10;

/// A typed promotion transition, richer than the bare log-line string
/// the original produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PromotionEvent {
    S2ToS1 {
        signature: String,
        category: String,
        successes: u32,
    },
    S1ToS0 {
        signature: String,
        category: String,
        consecutive_successes: u32,
    },
}

impl PromotionEvent {
    pub fn log_line(&self) -> String {
        match self {
            PromotionEvent::S2ToS1 { signature, category, successes } => format!(
                "PROMOTED S2→S1: {} (sig={}, {} successes)",
                category, signature, successes
            ),
            PromotionEvent::S1ToS0 { signature, category, consecutive_successes } => format!(
                "PROMOTED S1→S0: {} (sig={}, {} consecutive)",
                category, signature, consecutive_successes
            ),
        }
    }
}

pub struct PromotionPipeline {
    state: Arc<Mutex<PromotionState>>,
    cache: Arc<Mutex<ResponseCache>>,
    state_path: PathBuf,
    log_path: PathBuf,
    s2_to_s1_threshold: u32,
    s1_to_s0_threshold: u32,
}

impl PromotionPipeline {
    pub fn new(state_path: PathBuf, log_path: PathBuf) -> Self {
        let state = persistence::load(&state_path);
        Self {
            state: Arc::new(Mutex::new(state)),
            cache: Arc::new(Mutex::new(ResponseCache::default())),
            state_path,
            log_path,
            s2_to_s1_threshold: DEFAULT_S2_TO_S1_THRESHOLD,
            s1_to_s0_threshold: DEFAULT_S1_TO_S0_THRESHOLD,
        }
    }

    pub fn with_thresholds(mut self, s2_to_s1: u32, s1_to_s0: u32) -> Self {
        self.s2_to_s1_threshold = s2_to_s1;
        self.s1_to_s0_threshold = s1_to_s0;
        self
    }

    /// A handle to the shared state, for components (e.g. the Strategy
    /// Cache) that need read access to the same guarded object rather
    /// than their own copy.
    pub fn shared_state(&self) -> Arc<Mutex<PromotionState>> {
        Arc::clone(&self.state)
    }

    /// Records a successful solution. Returns a promotion event if this
    /// success crossed a threshold.
    pub async fn record_success(
        &self,
        category: &str,
        description: &str,
        artifact: &str,
        strategy: &str,
        source_tier: &str,
    ) -> Option<PromotionEvent> {
        let sig = sign(category, description);

        {
            let mut cache = self.cache.lock().await;
            cache.put(&sig, strategy, artifact);
        }

        let mut state = self.state.lock().await;

        if state.promoted_s0.contains_key(&sig) {
            self.persist(&state).await;
            return None;
        }

        let event = if source_tier == "s2" && !state.promoted_s1.contains_key(&sig) {
            let cand = state
                .candidates
                .entry(sig.clone())
                .or_insert_with(|| PromotionCandidate::new(&sig, category, "s2", "s1"));
            cand.record_success(artifact);

            if cand.successes >= self.s2_to_s1_threshold {
                let best = cand.best_code.clone();
                let successes = cand.successes;
                state.promoted_s1.insert(sig.clone(), best);
                state.candidates.remove(&sig);
                state
                    .candidates
                    .insert(sig.clone(), PromotionCandidate::new(&sig, category, "s1", "s0"));
                Some(PromotionEvent::S2ToS1 { signature: sig.clone(), category: category.to_string(), successes })
            } else {
                None
            }
        } else if matches!(source_tier, "s1" | "s2") && state.promoted_s1.contains_key(&sig) {
            let cand = state
                .candidates
                .entry(sig.clone())
                .or_insert_with(|| PromotionCandidate::new(&sig, category, "s1", "s0"));
            cand.record_success(artifact);

            if cand.consecutive_successes >= self.s1_to_s0_threshold {
                let template = cand.extract_template();
                let consecutive = cand.consecutive_successes;
                state.promoted_s0.insert(sig.clone(), template);
                state.promoted_s1.remove(&sig);
                state.candidates.remove(&sig);
                Some(PromotionEvent::S1ToS0 { signature: sig.clone(), category: category.to_string(), consecutive_successes: consecutive })
            } else {
                None
            }
        } else {
            None
        };

        self.persist(&state).await;
        drop(state);

        if let Some(ev) = &event {
            let line = ev.log_line();
            info!(%line, "promotion event");
            super::log::append(&self.log_path, &line);
            let (transition, category) = match ev {
                PromotionEvent::S2ToS1 { category, .. } => ("s2_to_s1", category.clone()),
                PromotionEvent::S1ToS0 { category, .. } => ("s1_to_s0", category.clone()),
            };
            metrics::record_promotion(transition, &category);
        }

        event
    }

    /// Resets the consecutive-success streak for `(category, description)`.
    pub async fn record_failure(&self, category: &str, description: &str, _source_tier: &str) {
        let sig = sign(category, description);
        let mut state = self.state.lock().await;
        if let Some(cand) = state.candidates.get_mut(&sig) {
            cand.record_failure();
        }
        self.persist(&state).await;
    }

    pub async fn s1_lookup(&self, category: &str, description: &str) -> Option<String> {
        let sig = sign(category, description);
        let state = self.state.lock().await;
        state.promoted_s1.get(&sig).cloned()
    }

    pub async fn s0_lookup(&self, category: &str, description: &str) -> Option<String> {
        let sig = sign(category, description);
        let state = self.state.lock().await;
        state.promoted_s0.get(&sig).cloned()
    }

    pub async fn cache_put(&self, category: &str, description: &str, strategy: &str, artifact: &str) {
        let sig = sign(category, description);
        let mut cache = self.cache.lock().await;
        cache.put(&sig, strategy, artifact);
    }

    pub async fn cache_get(&self, category: &str, description: &str, strategy: &str) -> Option<String> {
        let sig = sign(category, description);
        let mut cache = self.cache.lock().await;
        cache.get(&sig, strategy)
    }

    async fn persist(&self, state: &PromotionState) {
        if let Err(e) = persistence::save(&self.state_path, state) {
            tracing::warn!(error = %e, "failed to persist promotion state, continuing in-memory");
        }
    }
}

impl std::fmt::Debug for PromotionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionPipeline")
            .field("state_path", &self.state_path)
            .field("log_path", &self.log_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> (tempfile::TempDir, PromotionPipeline) {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PromotionPipeline::new(dir.path().join("state.json"), dir.path().join("promotions.log"));
        (dir, pipeline)
    }

    #[tokio::test]
    async fn s2_to_s1_after_three_successes() {
        let (_dir, pipeline) = pipeline();
        let desc = "two sum task";
        assert!(pipeline.record_success("algorithms", desc, "code-a", "s2", "s2").await.is_none());
        assert!(pipeline.record_success("algorithms", desc, "code-bb", "s2", "s2").await.is_none());
        let event = pipeline.record_success("algorithms", desc, "code-ccc", "s2", "s2").await;
        assert!(matches!(event, Some(PromotionEvent::S2ToS1 { .. })));
        assert_eq!(pipeline.s1_lookup("algorithms", desc).await, Some("code-ccc".to_string()));
    }

    #[tokio::test]
    async fn s1_to_s0_after_ten_consecutive() {
        let (_dir, pipeline) = pipeline();
        let desc = "two sum task";
        for _ in 0..3 {
            pipeline.record_success("algorithms", desc, "code", "s2", "s2").await;
        }
        assert!(pipeline.s1_lookup("algorithms", desc).await.is_some());
        let mut last = None;
        for _ in 0..10 {
            last = pipeline.record_success("algorithms", desc, "code", "s1", "s1").await;
        }
        assert!(matches!(last, Some(PromotionEvent::S1ToS0 { .. })));
        assert_eq!(pipeline.s0_lookup("algorithms", desc).await, Some("code".to_string()));
        assert!(pipeline.s1_lookup("algorithms", desc).await.is_none());
    }

    #[tokio::test]
    async fn failure_resets_streak_not_total() {
        let (_dir, pipeline) = pipeline();
        let desc = "two sum task";
        pipeline.record_success("algorithms", desc, "code", "s2", "s2").await;
        pipeline.record_failure("algorithms", desc, "s2").await;
        let state = pipeline.state.lock().await;
        let sig = sign("algorithms", desc);
        let cand = state.candidates.get(&sig).unwrap();
        assert_eq!(cand.successes, 1);
        assert_eq!(cand.consecutive_successes, 0);
        assert_eq!(cand.failures, 1);
    }

    #[tokio::test]
    async fn s0_success_never_opens_a_candidate() {
        let (_dir, pipeline) = pipeline();
        let desc = "two sum task";
        let event = pipeline.record_success("algorithms", desc, "code", "s0", "s0").await;
        assert!(event.is_none());
        let state = pipeline.state.lock().await;
        assert!(state.candidates.is_empty());
    }

    #[tokio::test]
    async fn state_persists_across_pipeline_instances() {
        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("state.json");
        let log_path = dir.path().join("promotions.log");
        {
            let pipeline = PromotionPipeline::new(state_path.clone(), log_path.clone());
            for _ in 0..3 {
                pipeline.record_success("algorithms", "desc", "code", "s2", "s2").await;
            }
        }
        let reopened = PromotionPipeline::new(state_path, log_path);
        assert_eq!(reopened.s1_lookup("algorithms", "desc").await, Some("code".to_string()));
    }
}
