//! Solver Orchestrator: the top-level entry point that takes a `Task`
//! and drives it through the S0 → S1 → ResponseCache → S2 cascade,
//! consulting the promotion pipeline after every attempt and stopping at
//! the first perfect score.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::cache::StrategyCache;
use crate::config::OrchestratorConfig;
use crate::error::CoreError;
use crate::eval::{self, EvalResult};
use crate::metrics;
use crate::promotion::{PromotionEvent, PromotionPipeline};
use crate::sandbox::SandboxLimits;
use crate::synthesis::{SynthesisClient, SynthesisRequest};
use crate::task::{Candidate, Task, Tier};

/// The outcome of routing a single task through the cascade.
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub task_id: String,
    pub signature: String,
    pub tier: Option<Tier>,
    pub score: f64,
    pub elapsed_ms: f64,
    pub solved: bool,
    pub feedback: String,
    pub promotion_event: Option<PromotionEvent>,
}

/// Owns a `PromotionPipeline`, a `StrategyCache` reader over the same
/// shared state, and the synthesis clients consulted at S2. Constructed
/// explicitly by the caller; no process-global singletons.
pub struct SolverOrchestrator {
    config: OrchestratorConfig,
    pipeline: PromotionPipeline,
    cache: StrategyCache,
    synthesis_clients: Vec<Arc<dyn SynthesisClient>>,
    sandbox_limits: SandboxLimits,
}

impl SolverOrchestrator {
    pub fn new(config: OrchestratorConfig, synthesis_clients: Vec<Arc<dyn SynthesisClient>>) -> Self {
        let pipeline = PromotionPipeline::new(config.state_path.clone(), config.promotions_log_path.clone())
            .with_thresholds(config.s2_to_s1_threshold, config.s1_to_s0_threshold);
        let cache = StrategyCache::new(pipeline.shared_state());
        let sandbox_limits = SandboxLimits {
            timeout: config.sandbox_timeout,
            stdout_cap: config.sandbox_stdout_cap,
            stderr_cap: config.sandbox_stderr_cap,
            interpreter: config.interpreter.clone(),
            interpreter_args: Vec::new(),
        };
        Self {
            config,
            pipeline,
            cache,
            synthesis_clients,
            sandbox_limits,
        }
    }

    /// Routes `task` through the cascade, returning the outcome of the
    /// first tier to produce a perfect score, or the last (imperfect)
    /// result seen after the synthesis retry budget is exhausted.
    pub async fn solve(&self, task: &Task) -> Result<OutcomeRecord, CoreError> {
        task.validate()?;

        let signature = crate::promotion::sign(&task.category, &task.description);

        if let Some(record) = self.try_s0(task, &signature).await {
            return Ok(record);
        }
        if let Some(record) = self.try_s1(task, &signature).await {
            return Ok(record);
        }
        if let Some(record) = self.try_cache(task, &signature).await {
            return Ok(record);
        }
        Ok(self.try_s2(task, &signature).await)
    }

    async fn try_s0(&self, task: &Task, signature: &str) -> Option<OutcomeRecord> {
        let artifact = if task.is_state_task() {
            crate::solvers::shell::solve_deterministic(task).map(|commands| Candidate::Commands {
                commands,
                tier: Tier::S0,
            })
        } else {
            crate::solvers::s0::solve_deterministic(task).map(|code| Candidate::Source { code, tier: Tier::S0 })
        };

        let Some(candidate) = artifact else {
            // S0 also covers signatures already promoted to the template tier.
            let template = self.pipeline.s0_lookup(&task.category, &task.description).await?;
            let candidate = Candidate::from_artifact_text(&template, &task.kind, Tier::S0);
            let record = self.attempt(task, signature, candidate.clone(), Tier::S0).await?;
            if record.solved {
                self.pipeline
                    .record_success(&task.category, &task.description, &candidate.artifact_text(), "s0", "s0")
                    .await;
                return Some(record);
            }
            return None;
        };

        let record = self.attempt(task, signature, candidate.clone(), Tier::S0).await?;
        if record.solved {
            self.pipeline
                .record_success(&task.category, &task.description, &candidate.artifact_text(), "s0", "s0")
                .await;
            return Some(record);
        }
        None
    }

    async fn try_s1(&self, task: &Task, signature: &str) -> Option<OutcomeRecord> {
        let artifact = self.cache.get(&task.category, &task.description).await?;
        let candidate = Candidate::from_artifact_text(&artifact, &task.kind, Tier::S1);
        let record = self.attempt(task, signature, candidate.clone(), Tier::S1).await?;

        if record.solved {
            let event = self
                .pipeline
                .record_success(&task.category, &task.description, &candidate.artifact_text(), "s1", "s1")
                .await;
            return Some(OutcomeRecord { promotion_event: event, ..record });
        }

        self.pipeline.record_failure(&task.category, &task.description, "s1").await;
        None
    }

    async fn try_cache(&self, task: &Task, signature: &str) -> Option<OutcomeRecord> {
        let artifact = self
            .pipeline
            .cache_get(&task.category, &task.description, "synthesis")
            .await?;
        let candidate = Candidate::from_artifact_text(&artifact, &task.kind, Tier::S2);
        let record = self.attempt(task, signature, candidate, Tier::S2).await?;
        record.solved.then_some(record)
    }

    async fn try_s2(&self, task: &Task, signature: &str) -> OutcomeRecord {
        let mut last = OutcomeRecord {
            task_id: task.id.clone(),
            signature: signature.to_string(),
            tier: None,
            score: 0.0,
            elapsed_ms: 0.0,
            solved: false,
            feedback: "no synthesis client produced a candidate".to_string(),
            promotion_event: None,
        };

        if self.synthesis_clients.is_empty() {
            return last;
        }

        let mut feedback: Option<String> = None;
        for attempt in 0..self.config.synthesis_retry_budget {
            let hints: Vec<String> = task.hints.clone();
            let request = SynthesisRequest {
                task,
                feedback: feedback.as_deref(),
                hints: &hints,
                budget: Duration::from_secs(30),
            };

            let client = &self.synthesis_clients[attempt as usize % self.synthesis_clients.len()];
            let artifact = match client.synthesize(request).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    feedback = Some("previous attempt produced no candidate".to_string());
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, attempt, "synthesis attempt failed");
                    feedback = Some(format!("previous attempt errored: {}", e));
                    continue;
                }
            };

            let candidate = Candidate::from_artifact_text(&artifact, &task.kind, Tier::S2);
            let Some(record) = self.attempt(task, signature, candidate.clone(), Tier::S2).await else {
                continue;
            };

            if record.solved {
                let event = self
                    .pipeline
                    .record_success(&task.category, &task.description, &candidate.artifact_text(), "synthesis", "s2")
                    .await;
                self.pipeline
                    .cache_put(&task.category, &task.description, "synthesis", &candidate.artifact_text())
                    .await;
                return OutcomeRecord { promotion_event: event, ..record };
            }

            feedback = Some(record.feedback.clone());
            if record.score > last.score {
                last = record;
            }
        }

        last
    }

    async fn attempt(&self, task: &Task, signature: &str, candidate: Candidate, tier: Tier) -> Option<OutcomeRecord> {
        let start = Instant::now();
        let result: EvalResult = eval::evaluate(task, &candidate, &self.sandbox_limits).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        metrics::record_tier_attempt(tier.as_str(), result.is_perfect(), start.elapsed().as_secs_f64());
        metrics::record_eval_score(result.score);

        info!(
            task_id = %task.id,
            tier = %tier,
            score = result.score,
            solved = result.is_perfect(),
            "tier attempt"
        );

        Some(OutcomeRecord {
            task_id: task.id.clone(),
            signature: signature.to_string(),
            tier: Some(tier),
            score: result.score,
            elapsed_ms,
            solved: result.is_perfect(),
            feedback: result.feedback,
            promotion_event: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{IoSpec, TaskKind, TestCase};
    use tempfile::tempdir;

    fn two_sum_task() -> Task {
        Task {
            id: "t-two-sum".to_string(),
            title: "Two Sum".to_string(),
            description: "Given a list of numbers and a target, find two indices that sum to target".to_string(),
            difficulty: 2,
            category: "algorithms".to_string(),
            hints: vec![],
            tags: vec![],
            kind: TaskKind::Io(IoSpec {
                test_cases: vec![TestCase::new("4\n2 7 11 15\n9\n", "0 1", "basic pair")],
            }),
        }
    }

    #[tokio::test]
    async fn malformed_task_short_circuits_before_any_tier() {
        let dir = tempdir().unwrap();
        let config = OrchestratorConfig::default()
            .with_state_path(dir.path().join("state.json"))
            .with_promotions_log_path(dir.path().join("promotions.log"));
        let orchestrator = SolverOrchestrator::new(config, vec![]);

        let mut task = two_sum_task();
        task.category = String::new();

        let err = orchestrator.solve(&task).await.unwrap_err();
        assert!(matches!(err, CoreError::MalformedTask { .. }));
    }

    #[tokio::test]
    async fn s2_never_invoked_when_no_synthesis_clients_and_no_s0_match() {
        let dir = tempdir().unwrap();
        let config = OrchestratorConfig::default()
            .with_state_path(dir.path().join("state.json"))
            .with_promotions_log_path(dir.path().join("promotions.log"));
        let orchestrator = SolverOrchestrator::new(config, vec![]);

        let mut task = two_sum_task();
        task.title = "Untitled".to_string();
        task.description = "an unrecognizable task with no matching template".to_string();

        let outcome = orchestrator.solve(&task).await.unwrap();
        assert!(!outcome.solved);
        assert!(outcome.tier.is_none());
    }
}
