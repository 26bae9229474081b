//! End-to-end promotion sequence: a strategy tracked from S2 is promoted
//! to S1 after three successes, then promoted further to S0 after ten
//! consecutive S1 successes, with the S1 entry retired on that second
//! promotion.

use tempfile::tempdir;

use cascade_core::promotion::PromotionPipeline;

const CATEGORY: &str = "algorithms";
const DESCRIPTION: &str = "Given a list of numbers, return them sorted ascending.";
const ARTIFACT: &str = "print(sorted(map(int, input().split())))\n";

#[tokio::test]
async fn strategy_climbs_from_s2_to_s1_to_s0() {
    let dir = tempdir().unwrap();
    let pipeline = PromotionPipeline::new(dir.path().join("state.json"), dir.path().join("promotions.log"));

    // Two S2 successes: tracked, not yet promoted.
    assert!(pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "synthesis", "s2").await.is_none());
    assert!(pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "synthesis", "s2").await.is_none());
    assert!(pipeline.s1_lookup(CATEGORY, DESCRIPTION).await.is_none());

    // Third S2 success crosses the threshold.
    let event = pipeline
        .record_success(CATEGORY, DESCRIPTION, ARTIFACT, "synthesis", "s2")
        .await
        .expect("third success should trigger S2->S1 promotion");
    assert!(matches!(event, cascade_core::promotion::PromotionEvent::S2ToS1 { .. }));
    assert_eq!(pipeline.s1_lookup(CATEGORY, DESCRIPTION).await.as_deref(), Some(ARTIFACT));

    // Nine consecutive S1 successes: tracked, not yet promoted to S0.
    for _ in 0..9 {
        let event = pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "s1", "s1").await;
        assert!(event.is_none());
    }
    assert!(pipeline.s0_lookup(CATEGORY, DESCRIPTION).await.is_none());

    // Tenth consecutive success crosses the S1->S0 threshold; the S1
    // entry is retired since S0 now wins lookup for this signature.
    let event = pipeline
        .record_success(CATEGORY, DESCRIPTION, ARTIFACT, "s1", "s1")
        .await
        .expect("tenth consecutive success should trigger S1->S0 promotion");
    assert!(matches!(event, cascade_core::promotion::PromotionEvent::S1ToS0 { .. }));
    assert_eq!(pipeline.s0_lookup(CATEGORY, DESCRIPTION).await.as_deref(), Some(ARTIFACT));
    assert!(pipeline.s1_lookup(CATEGORY, DESCRIPTION).await.is_none());
}

#[tokio::test]
async fn a_failure_resets_the_consecutive_streak_but_not_the_total() {
    let dir = tempdir().unwrap();
    let pipeline = PromotionPipeline::new(dir.path().join("state.json"), dir.path().join("promotions.log"));

    for _ in 0..3 {
        pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "synthesis", "s2").await;
    }
    assert!(pipeline.s1_lookup(CATEGORY, DESCRIPTION).await.is_some());

    for _ in 0..5 {
        pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "s1", "s1").await;
    }
    pipeline.record_failure(CATEGORY, DESCRIPTION, "s1").await;

    // Nine more successes: five before the reset don't count, so this
    // should still fall one short of the ten-in-a-row threshold.
    for _ in 0..9 {
        let event = pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "s1", "s1").await;
        assert!(event.is_none(), "streak should have been reset by the failure");
    }
    assert!(pipeline.s0_lookup(CATEGORY, DESCRIPTION).await.is_none());
}

#[tokio::test]
async fn state_persists_across_pipeline_restarts() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("state.json");
    let log_path = dir.path().join("promotions.log");

    {
        let pipeline = PromotionPipeline::new(state_path.clone(), log_path.clone());
        for _ in 0..3 {
            pipeline.record_success(CATEGORY, DESCRIPTION, ARTIFACT, "synthesis", "s2").await;
        }
    }

    let reloaded = PromotionPipeline::new(state_path, log_path);
    assert_eq!(reloaded.s1_lookup(CATEGORY, DESCRIPTION).await.as_deref(), Some(ARTIFACT));
}
