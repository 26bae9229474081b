//! A State-task candidate whose command sequence contains a denied
//! destructive command scores 0 through the full evaluation path
//! (evaluate -> Workspace::execute deny list), rather than erroring out.

use std::time::Duration;

use cascade_core::sandbox::SandboxLimits;
use cascade_core::task::{StateAssertion, StateCheck, StateSpec, Task, TaskKind};
use cascade_core::{eval, Candidate, Tier};

fn destructive_task() -> Task {
    Task {
        id: "t-denial".to_string(),
        title: "Clear the scratch directory".to_string(),
        description: "Remove every file under the workspace.".to_string(),
        difficulty: 1,
        category: "filesystem".to_string(),
        hints: vec![],
        tags: vec![],
        kind: TaskKind::State(StateSpec {
            assertions: vec![StateAssertion::new(
                "report.txt should exist",
                StateCheck::FileExists,
                "report.txt",
                "",
            )],
            max_steps: 5,
            wall_clock_budget: Duration::from_secs(10),
            setup_commands: vec!["printf 'item 1\\n' > report.txt".to_string()],
        }),
    }
}

#[tokio::test]
async fn blocked_command_candidate_scores_zero_and_leaves_no_trace() {
    let task = destructive_task();
    let candidate = Candidate::Commands {
        commands: vec!["rm -rf /".to_string()],
        tier: Tier::S0,
    };

    let result = eval::evaluate(&task, &candidate, &SandboxLimits::default()).await;

    assert_eq!(result.score, 0.0);
    assert!(!result.details[0].passed);
    assert_eq!(result.commands_executed, vec!["rm -rf /".to_string()]);
}

#[tokio::test]
async fn well_behaved_candidate_satisfies_the_assertion() {
    let task = destructive_task();
    let candidate = Candidate::Commands {
        commands: vec!["echo already set up by the setup commands".to_string()],
        tier: Tier::S0,
    };

    let result = eval::evaluate(&task, &candidate, &SandboxLimits::default()).await;

    assert!(result.is_perfect());
}
