//! End-to-end mutation round trip: an insertion-sort solution is broken
//! by the chaos engine, the broken candidate scores below 1.0 against
//! the original task, and resubmitting the original (fixed) source
//! against the derived "find and fix the bug" task scores a perfect 1.0.

use cascade_core::eval;
use cascade_core::mutation::create_chaos_task;
use cascade_core::sandbox::SandboxLimits;
use cascade_core::task::{IoSpec, TaskKind, TestCase};
use cascade_core::{Candidate, Task, Tier};

const INSERTION_SORT: &str = "\
n = int(input())
values = list(map(int, input().split()))
for i in range(1, n):
    key = values[i]
    j = i - 1
    while j >= 0 and values[j] > key:
        values[j + 1] = values[j]
        j -= 1
    values[j + 1] = key
print(' '.join(map(str, values)))
";

fn sort_task() -> Task {
    Task {
        id: "t-insertion-sort".to_string(),
        title: "Insertion Sort".to_string(),
        description: "Read n then n integers, print them sorted ascending.".to_string(),
        difficulty: 2,
        category: "algorithms".to_string(),
        hints: vec![],
        tags: vec![],
        kind: TaskKind::Io(IoSpec {
            test_cases: vec![
                TestCase::new("5\n5 3 4 1 2\n", "1 2 3 4 5", "five elements"),
                TestCase::new("3\n1 2 3\n", "1 2 3", "already sorted"),
            ],
        }),
    }
}

#[tokio::test]
async fn mutate_breaks_then_the_correct_fix_scores_perfect_again() {
    let task = sort_task();
    let limits = SandboxLimits::default();

    let chaos = create_chaos_task(&task, INSERTION_SORT, &limits, 20)
        .await
        .expect("insertion sort should yield at least one breakable mutation");

    let broken_candidate = Candidate::Source {
        code: chaos.broken_code.clone(),
        tier: Tier::S0,
    };
    let broken_result = eval::evaluate(&chaos.task, &broken_candidate, &limits).await;
    assert!(broken_result.score < 1.0, "mutation must actually break a test case");

    let fixed_candidate = Candidate::Source {
        code: chaos.correct_code.clone(),
        tier: Tier::S0,
    };
    let fixed_result = eval::evaluate(&chaos.task, &fixed_candidate, &limits).await;
    assert!(fixed_result.is_perfect(), "resubmitting the original fix must pass every test case");

    assert!(chaos.task.id.starts_with("chaos-"));
    assert_eq!(chaos.task.category, "chaos_algorithms");
}
