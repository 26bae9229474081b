//! Persisted and in-memory shape of the Promotion Pipeline's state,
//! grounded on `promotion_pipeline.py`'s `PromotionCandidate`/`PromotionState`
//! dataclasses and `_save_state`/`_load_state`.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recent-success ring capacity used for S1→S0 template extraction.
const RING_CAPACITY: usize = 10;

/// A strategy under observation for promotion to a cheaper tier.
///
/// `codes` (the recent-success ring) is intentionally not persisted — on
/// reload it starts empty, matching the original's `_save_state`, which
/// only ever wrote `best_code` to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCandidate {
    pub task_signature: String,
    pub category: String,
    pub source_tier: String,
    pub target_tier: String,
    #[serde(default)]
    pub successes: u32,
    #[serde(default)]
    pub consecutive_successes: u32,
    #[serde(default)]
    pub failures: u32,
    #[serde(default)]
    pub best_code: String,
    #[serde(skip)]
    pub codes: VecDeque<String>,
    #[serde(default = "Utc::now")]
    pub first_seen: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub last_seen: DateTime<Utc>,
}

impl PromotionCandidate {
    pub fn new(task_signature: &str, category: &str, source_tier: &str, target_tier: &str) -> Self {
        let now = Utc::now();
        Self {
            task_signature: task_signature.to_string(),
            category: category.to_string(),
            source_tier: source_tier.to_string(),
            target_tier: target_tier.to_string(),
            successes: 0,
            consecutive_successes: 0,
            failures: 0,
            best_code: String::new(),
            codes: VecDeque::new(),
            first_seen: now,
            last_seen: now,
        }
    }

    /// Records one more successful artifact, updating the streak, the
    /// best-known artifact (longest wins, ties go to the most recent), and
    /// the recent-success ring.
    pub fn record_success(&mut self, code: &str) {
        self.successes += 1;
        self.consecutive_successes += 1;
        self.last_seen = Utc::now();
        if code.len() >= self.best_code.len() {
            self.best_code = code.to_string();
        }
        self.codes.push_back(code.to_string());
        while self.codes.len() > RING_CAPACITY {
            self.codes.pop_front();
        }
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
        self.consecutive_successes = 0;
    }

    /// Extracts an S0 template from the recent-success ring: longest body
    /// wins. Falls back to `best_code` if the ring is empty (e.g. after a
    /// restart where the ring was not persisted).
    pub fn extract_template(&self) -> String {
        self.codes
            .iter()
            .max_by_key(|c| c.len())
            .cloned()
            .unwrap_or_else(|| self.best_code.clone())
    }
}

/// The persisted aggregate of every tracked/promoted strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionState {
    #[serde(default)]
    pub promoted_s1: HashMap<String, String>,
    #[serde(default)]
    pub promoted_s0: HashMap<String, String>,
    #[serde(default)]
    pub candidates: HashMap<String, PromotionCandidate>,
}

/// Ephemeral signature+strategy → artifact cache, 24h TTL, never persisted.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<String, (String, DateTime<Utc>)>,
}

impl ResponseCache {
    pub fn ttl() -> chrono::Duration {
        chrono::Duration::seconds(86_400)
    }

    pub fn put(&mut self, signature: &str, strategy: &str, artifact: &str) {
        self.entries
            .insert(Self::key(signature, strategy), (artifact.to_string(), Utc::now()));
    }

    pub fn get(&mut self, signature: &str, strategy: &str) -> Option<String> {
        let key = Self::key(signature, strategy);
        match self.entries.get(&key) {
            Some((artifact, ts)) => {
                if Utc::now() - *ts < Self::ttl() {
                    Some(artifact.clone())
                } else {
                    self.entries.remove(&key);
                    None
                }
            }
            None => None,
        }
    }

    fn key(signature: &str, strategy: &str) -> String {
        format!("{}:{}", signature, strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_code_prefers_longer_artifact() {
        let mut cand = PromotionCandidate::new("sig", "algorithms", "s2", "s1");
        cand.record_success("short");
        cand.record_success("much longer artifact body");
        assert_eq!(cand.best_code, "much longer artifact body");
    }

    #[test]
    fn failure_resets_streak_without_touching_total() {
        let mut cand = PromotionCandidate::new("sig", "algorithms", "s2", "s1");
        cand.record_success("a");
        cand.record_success("b");
        cand.record_failure();
        assert_eq!(cand.successes, 2);
        assert_eq!(cand.consecutive_successes, 0);
        assert_eq!(cand.failures, 1);
    }

    #[test]
    fn response_cache_roundtrips_within_ttl() {
        let mut cache = ResponseCache::default();
        cache.put("algorithms:deadbeef", "s2", "print(1)");
        assert_eq!(cache.get("algorithms:deadbeef", "s2").as_deref(), Some("print(1)"));
        assert_eq!(cache.get("algorithms:deadbeef", "other"), None);
    }

    #[test]
    fn state_roundtrips_through_json() {
        let mut state = PromotionState::default();
        state.promoted_s1.insert("a:1".to_string(), "code".to_string());
        let json = serde_json::to_string(&state).unwrap();
        let back: PromotionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.promoted_s1.get("a:1"), Some(&"code".to_string()));
    }
}
