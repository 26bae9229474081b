//! Strategy Cache — S1: reuses artifacts that have already succeeded at
//! least N times for a task signature. There is no direct `put`; entries
//! appear only via the Promotion Pipeline.
//!
//! Modeled as a thin reader over the same guarded `PromotionState` the
//! Promotion Pipeline owns, rather than its own copy — kept as a separate
//! type so the component boundary stays visible in the code, the way
//! `registry/` and `storage/` stay separate modules over a shared
//! `Database` handle.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::promotion::{sign, PromotionState};

pub struct StrategyCache {
    state: Arc<Mutex<PromotionState>>,
}

impl StrategyCache {
    pub fn new(state: Arc<Mutex<PromotionState>>) -> Self {
        Self { state }
    }

    /// Reads the persisted S1 map for `(category, description)`'s signature.
    pub async fn get(&self, category: &str, description: &str) -> Option<String> {
        let sig = sign(category, description);
        let state = self.state.lock().await;
        state.promoted_s1.get(&sig).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::PromotionPipeline;

    #[tokio::test]
    async fn cache_reflects_pipeline_promotions() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PromotionPipeline::new(dir.path().join("state.json"), dir.path().join("log.txt"));
        let cache = StrategyCache::new(pipeline.shared_state());

        assert!(cache.get("algorithms", "desc").await.is_none());
        for _ in 0..3 {
            pipeline.record_success("algorithms", "desc", "code", "s2", "s2").await;
        }
        assert_eq!(cache.get("algorithms", "desc").await, Some("code".to_string()));
    }
}
