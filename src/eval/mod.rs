//! Evaluation Engine: given a Task and a Candidate, decides to what
//! extent the candidate satisfies the task.
//!
//! IO-task algorithm grounded on `programming_env.py::evaluate_solution`;
//! State-task algorithm grounded on `terminal_env.py::evaluate_terminal_task`.

use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::sandbox::{run_program, SandboxLimits, Workspace};
use crate::task::{Candidate, StateCheck, Task, TaskKind};

/// Per-test-case detail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestDetail {
    pub index: usize,
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
    pub error: String,
    pub timed_out: bool,
}

/// Result of evaluating a candidate against a task's full test sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResult {
    pub score: f64,
    pub passed: usize,
    pub total: usize,
    pub details: Vec<TestDetail>,
    pub elapsed_ms: f64,
    pub feedback: String,
    /// Commands executed against the workspace, for State-tasks only.
    pub commands_executed: Vec<String>,
}

impl EvalResult {
    /// "Perfect score": 1.0 across all test cases.
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.passed == self.total
    }
}

fn normalize(s: &str) -> String {
    s.replace("\r\n", "\n").trim().to_string()
}

/// Evaluates a candidate against a task. Dispatches on the task's kind.
pub async fn evaluate(task: &Task, candidate: &Candidate, limits: &SandboxLimits) -> EvalResult {
    let result = match &task.kind {
        TaskKind::Io(spec) => evaluate_io(candidate, &spec.test_cases, limits).await,
        TaskKind::State(spec) => evaluate_state(candidate, spec).await,
    };
    metrics::record_eval_score(result.score);
    result
}

async fn evaluate_io(
    candidate: &Candidate,
    test_cases: &[crate::task::TestCase],
    limits: &SandboxLimits,
) -> EvalResult {
    let code = match candidate {
        Candidate::Source { code, .. } => code.clone(),
        Candidate::Commands { .. } => {
            // Contract violation: IO-tasks are never matched against a
            // command-sequence candidate. Treat as a total failure rather
            // than panicking, since evaluation must never abort.
            return io_eval_for_all_failed(test_cases, "candidate is a command sequence, not source");
        }
    };

    let mut details = Vec::with_capacity(test_cases.len());
    let mut passed = 0usize;
    let mut total_elapsed = 0.0f64;

    for (i, tc) in test_cases.iter().enumerate() {
        let exec = run_program(code.as_bytes(), tc.input_data.as_bytes(), limits).await;
        let (actual, error, timed_out, elapsed_ms) = match exec {
            Ok(r) => (normalize(&r.stdout), r.stderr.clone(), r.timed_out, r.elapsed_ms),
            Err(e) => (String::new(), e.to_string(), false, 0.0),
        };
        total_elapsed += elapsed_ms;
        let expected = normalize(&tc.expected_output);
        let ok = actual == expected;
        if ok {
            passed += 1;
        }
        details.push(TestDetail {
            index: i + 1,
            description: tc.description.clone(),
            expected,
            actual,
            passed: ok,
            error,
            timed_out,
        });
    }

    let total = test_cases.len();
    let score = if total > 0 { passed as f64 / total as f64 } else { 0.0 };
    let feedback = io_feedback(score, total, passed, &details);

    EvalResult {
        score,
        passed,
        total,
        details,
        elapsed_ms: total_elapsed,
        feedback,
        commands_executed: Vec::new(),
    }
}

fn io_eval_for_all_failed(test_cases: &[crate::task::TestCase], reason: &str) -> EvalResult {
    let details: Vec<TestDetail> = test_cases
        .iter()
        .enumerate()
        .map(|(i, tc)| TestDetail {
            index: i + 1,
            description: tc.description.clone(),
            expected: normalize(&tc.expected_output),
            actual: String::new(),
            passed: false,
            error: reason.to_string(),
            timed_out: false,
        })
        .collect();
    EvalResult {
        score: 0.0,
        passed: 0,
        total: test_cases.len(),
        details,
        elapsed_ms: 0.0,
        feedback: reason.to_string(),
        commands_executed: Vec::new(),
    }
}

fn io_feedback(score: f64, total: usize, passed: usize, details: &[TestDetail]) -> String {
    if total == 0 {
        return "no test cases".to_string();
    }
    if score >= 1.0 {
        return format!("Perfect! All {} tests passed.", total);
    }
    let first_failed = details.iter().find(|d| !d.passed);
    match first_failed {
        Some(d) if d.timed_out => "time limit".to_string(),
        Some(d) if !d.error.is_empty() => format!("runtime error: {}", truncate(&d.error, 200)),
        Some(d) => format!(
            "{}/{} passed. expected '{}' got '{}'",
            passed, total, d.expected, d.actual
        ),
        None => format!("{}/{} passed.", passed, total),
    }
}

fn truncate(s: &str, n: usize) -> String {
    if s.len() > n {
        format!("{}...", &s[..n])
    } else {
        s.to_string()
    }
}

async fn evaluate_state(candidate: &Candidate, spec: &crate::task::StateSpec) -> EvalResult {
    let commands = match candidate {
        Candidate::Commands { commands, .. } => commands.clone(),
        Candidate::Source { .. } => {
            return state_eval_for_all_failed(spec, "candidate is source, not a command sequence")
        }
    };

    let Ok(mut workspace) = Workspace::open() else {
        return state_eval_for_all_failed(spec, "failed to allocate workspace");
    };

    workspace.setup(&spec.setup_commands).await;

    let per_command_timeout = Duration::from_secs(10);
    let step_cap = spec.max_steps as usize;
    let deadline = std::time::Instant::now() + spec.wall_clock_budget;

    for cmd in commands.iter().take(step_cap) {
        if std::time::Instant::now() >= deadline {
            break;
        }
        workspace.execute(cmd, per_command_timeout, true).await;
    }

    let mut details = Vec::with_capacity(spec.assertions.len());
    let mut passed = 0usize;

    for (i, assertion) in spec.assertions.iter().enumerate() {
        let (ok, actual) = check_assertion(&mut workspace, assertion).await;
        if ok {
            passed += 1;
        }
        details.push(TestDetail {
            index: i + 1,
            description: assertion.description.clone(),
            expected: truncate(&assertion.expected, 200),
            actual,
            passed: ok,
            error: String::new(),
            timed_out: false,
        });
    }

    let total = spec.assertions.len();
    let score = if total > 0 { passed as f64 / total as f64 } else { 0.0 };
    let feedback = state_feedback(score, total, passed, &details);
    let commands_executed = workspace.command_history.iter().map(|r| r.command.clone()).collect();
    let elapsed_ms = workspace.total_time_ms;

    EvalResult {
        score,
        passed,
        total,
        details,
        elapsed_ms,
        feedback,
        commands_executed,
    }
}

fn state_eval_for_all_failed(spec: &crate::task::StateSpec, reason: &str) -> EvalResult {
    let details: Vec<TestDetail> = spec
        .assertions
        .iter()
        .enumerate()
        .map(|(i, a)| TestDetail {
            index: i + 1,
            description: a.description.clone(),
            expected: a.expected.clone(),
            actual: String::new(),
            passed: false,
            error: reason.to_string(),
            timed_out: false,
        })
        .collect();
    EvalResult {
        score: 0.0,
        passed: 0,
        total: spec.assertions.len(),
        details,
        elapsed_ms: 0.0,
        feedback: reason.to_string(),
        commands_executed: Vec::new(),
    }
}

async fn check_assertion(
    workspace: &mut Workspace,
    assertion: &crate::task::StateAssertion,
) -> (bool, String) {
    let timeout = Duration::from_secs(5);
    match &assertion.check {
        StateCheck::FileExists => {
            let r = workspace
                .execute(&format!("test -f '{}' && echo YES || echo NO", assertion.target), timeout, false)
                .await;
            let ok = r.stdout.trim() == "YES";
            (ok, if ok { "exists".into() } else { "not found".into() })
        }
        StateCheck::FileNotExists => {
            let r = workspace
                .execute(&format!("test -e '{}' && echo YES || echo NO", assertion.target), timeout, false)
                .await;
            let ok = r.stdout.trim() == "NO";
            (ok, if ok { "not found".into() } else { "exists".into() })
        }
        StateCheck::DirExists => {
            let r = workspace
                .execute(&format!("test -d '{}' && echo YES || echo NO", assertion.target), timeout, false)
                .await;
            let ok = r.stdout.trim() == "YES";
            (ok, if ok { "directory exists".into() } else { "not a directory".into() })
        }
        StateCheck::FileContainsSubstring { case_sensitive } => {
            let content = workspace
                .read_file(&assertion.target)
                .map(|b| String::from_utf8_lossy(&b).to_string())
                .unwrap_or_default();
            let ok = if *case_sensitive {
                content.contains(&assertion.expected)
            } else {
                content.to_lowercase().contains(&assertion.expected.to_lowercase())
            };
            (ok, format!("{} '{}'", if ok { "contains" } else { "missing" }, truncate(&assertion.expected, 50)))
        }
        StateCheck::FileEquals { case_sensitive } => {
            let content = workspace
                .read_file(&assertion.target)
                .map(|b| normalize(&String::from_utf8_lossy(&b)))
                .unwrap_or_default();
            let expected = normalize(&assertion.expected);
            let ok = if *case_sensitive {
                content == expected
            } else {
                content.to_lowercase() == expected.to_lowercase()
            };
            (ok, if content.is_empty() { "(empty)".to_string() } else { truncate(&content, 200) })
        }
        StateCheck::CommandOutputEquals { case_sensitive } => {
            let r = workspace.execute(&assertion.target, Duration::from_secs(10), false).await;
            let actual = normalize(&r.stdout);
            let expected = normalize(&assertion.expected);
            let ok = if *case_sensitive {
                actual == expected
            } else {
                actual.to_lowercase() == expected.to_lowercase()
            };
            (ok, actual)
        }
        StateCheck::FilePermissionBits => {
            let r = workspace
                .execute(&format!("stat -c '%a' '{}'", assertion.target), timeout, false)
                .await;
            let actual = r.stdout.trim().to_string();
            (actual == assertion.expected.trim(), actual)
        }
        StateCheck::FileLineCount => {
            let content = workspace
                .read_file(&assertion.target)
                .map(|b| String::from_utf8_lossy(&b).to_string())
                .unwrap_or_default();
            let trimmed = content.trim();
            let count = if trimmed.is_empty() {
                0
            } else {
                trimmed.split('\n').count()
            };
            let actual = count.to_string();
            (actual == assertion.expected.trim(), actual)
        }
        StateCheck::FileMatchesRegex => {
            let content = workspace
                .read_file(&assertion.target)
                .map(|b| String::from_utf8_lossy(&b).to_string())
                .unwrap_or_default();
            let ok = Regex::new(&assertion.expected)
                .map(|re| re.is_match(&content))
                .unwrap_or(false);
            (ok, format!("{} /{}/", if ok { "matches" } else { "no match" }, truncate(&assertion.expected, 50)))
        }
    }
}

fn state_feedback(score: f64, total: usize, passed: usize, details: &[TestDetail]) -> String {
    if total == 0 {
        return "no assertions".to_string();
    }
    if score >= 1.0 {
        return format!("Perfect! All {} conditions satisfied.", total);
    }
    match details.iter().find(|d| !d.passed) {
        Some(d) => format!(
            "{}/{} satisfied. missed: {} — expected '{}' got '{}'",
            passed, total, d.description, d.expected, d.actual
        ),
        None => format!("{}/{} satisfied.", passed, total),
    }
}
