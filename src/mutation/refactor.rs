//! Refactor challenge mode: given a correct-but-naive solution, derive a
//! "same tests, different implementation constraint" task. Grounded on
//! `chaos_monkey.py::generate_refactor_task`.

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChallengeKind {
    Optimize,
    Compact,
    Functional,
}

impl ChallengeKind {
    fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Optimize => "optimize",
            ChallengeKind::Compact => "compact",
            ChallengeKind::Functional => "functional",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            ChallengeKind::Optimize => {
                "Optimize the code to use fewer nested loops. The time complexity should be better than O(n^2) if possible."
            }
            ChallengeKind::Compact => {
                "Rewrite the code more compactly -- at most half as many lines -- while staying readable and correct."
            }
            ChallengeKind::Functional => {
                "Rewrite the code in a functional style using map/filter/reduce or comprehensions instead of explicit loops."
            }
        }
    }
}

/// Builds a refactor-challenge task from a correct solution, or `None` if
/// no applicable challenge exists for this code shape.
pub fn generate_refactor_task(task: &Task, correct_code: &str) -> Option<Task> {
    let lines: Vec<&str> = correct_code.trim().lines().collect();
    if lines.len() < 3 {
        return None;
    }

    let mut challenges = Vec::new();
    if correct_code.matches("for ").count() >= 2 {
        challenges.push(ChallengeKind::Optimize);
    }
    if lines.len() > 8 {
        challenges.push(ChallengeKind::Compact);
    }
    if !correct_code.contains("import")
        && ["sorted(", "sum(", "max(", "min("].iter().any(|kw| correct_code.contains(kw))
    {
        challenges.push(ChallengeKind::Functional);
    }
    let challenge = *{
        use rand::seq::IndexedRandom;
        challenges.choose(&mut rand::rng())?
    };

    Some(Task {
        id: format!("refactor-{}-{}", challenge.as_str(), task.id),
        title: format!("Refactor: {}", task.title),
        description: format!(
            "Original task: {}\n\nCurrent solution:\n{}\n\nCHALLENGE: {}\n\nThe code must still produce exactly the same output.",
            task.description, correct_code, challenge.prompt()
        ),
        difficulty: (task.difficulty + 2).min(10),
        category: format!("refactor_{}", task.category),
        hints: vec!["Keep the same I/O behavior, only change the implementation.".to_string()],
        tags: {
            let mut tags = vec!["refactor".to_string(), challenge.as_str().to_string()];
            tags.extend(task.tags.clone());
            tags
        },
        kind: task.kind.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{IoSpec, TaskKind, TestCase};

    fn sample_task() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Two Sum".to_string(),
            description: "find two indices".to_string(),
            difficulty: 3,
            category: "algorithms".to_string(),
            hints: vec![],
            tags: vec![],
            kind: TaskKind::Io(IoSpec { test_cases: vec![TestCase::new("1", "1", "d")] }),
        }
    }

    #[test]
    fn too_short_solution_yields_no_challenge() {
        let task = sample_task();
        assert!(generate_refactor_task(&task, "print(1)\n").is_none());
    }

    #[test]
    fn nested_loop_solution_yields_a_challenge() {
        let task = sample_task();
        let code = "for i in range(10):\n    for j in range(10):\n        print(i, j)\n";
        let refactor = generate_refactor_task(&task, code).unwrap();
        assert!(refactor.id.starts_with("refactor-"));
        assert_eq!(refactor.category, "refactor_algorithms");
    }
}
