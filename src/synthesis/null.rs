//! Test double that always reports "no synthesis available", following
//! the pattern of swappable trait objects behind `Arc<dyn Trait>` used
//! in `pipeline/orchestrator.rs`.

use async_trait::async_trait;

use crate::error::SynthesisError;

use super::{SynthesisClient, SynthesisRequest};

#[derive(Debug, Default)]
pub struct NullSynthesisClient;

#[async_trait]
impl SynthesisClient for NullSynthesisClient {
    async fn synthesize(&self, _request: SynthesisRequest<'_>) -> Result<Option<String>, SynthesisError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{IoSpec, Task, TaskKind, TestCase};
    use std::time::Duration;

    #[tokio::test]
    async fn always_returns_none() {
        let task = Task {
            id: "t1".to_string(),
            title: "title".to_string(),
            description: "desc".to_string(),
            difficulty: 1,
            category: "algorithms".to_string(),
            hints: vec![],
            tags: vec![],
            kind: TaskKind::Io(IoSpec { test_cases: vec![TestCase::new("1", "1", "d")] }),
        };
        let client = NullSynthesisClient;
        let result = client
            .synthesize(SynthesisRequest { task: &task, feedback: None, hints: &[], budget: Duration::from_secs(1) })
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
