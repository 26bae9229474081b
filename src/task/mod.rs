//! The task data model: an immutable description of a programming
//! problem, either driven by stdin/stdout test cases or by
//! filesystem-state assertions over a shell workspace.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A single stdin/stdout test case for an IO-task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub input_data: String,
    pub expected_output: String,
    pub description: String,
}

impl TestCase {
    pub fn new(
        input_data: impl Into<String>,
        expected_output: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            input_data: input_data.into(),
            expected_output: expected_output.into(),
            description: description.into(),
        }
    }
}

/// The kind of filesystem-state check a `StateAssertion` performs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StateCheck {
    FileExists,
    FileNotExists,
    DirExists,
    FileContainsSubstring { case_sensitive: bool },
    FileEquals { case_sensitive: bool },
    FileMatchesRegex,
    FileLineCount,
    FilePermissionBits,
    CommandOutputEquals { case_sensitive: bool },
}

/// A single post-condition check against a State-task's workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateAssertion {
    pub description: String,
    pub check: StateCheck,
    /// File path (relative to the workspace root) or, for
    /// `CommandOutputEquals`, the command to run.
    pub target: String,
    pub expected: String,
}

impl StateAssertion {
    pub fn new(
        description: impl Into<String>,
        check: StateCheck,
        target: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            check,
            target: target.into(),
            expected: expected.into(),
        }
    }
}

/// The per-flavor payload of a `Task`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TaskKind {
    Io(IoSpec),
    State(StateSpec),
}

/// IO-task payload: stdin/stdout test cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IoSpec {
    pub test_cases: Vec<TestCase>,
}

/// State-task payload: filesystem/command assertions plus step and time
/// budgets and optional setup commands that run before the candidate's
/// commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSpec {
    pub assertions: Vec<StateAssertion>,
    pub max_steps: u32,
    #[serde(with = "duration_secs")]
    pub wall_clock_budget: Duration,
    pub setup_commands: Vec<String>,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs))
    }
}

/// An immutable description of a programming task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: u8,
    pub category: String,
    pub hints: Vec<String>,
    pub tags: Vec<String>,
    pub kind: TaskKind,
}

impl Task {
    /// Validates the invariants every task must hold: a non-empty test
    /// sequence, present difficulty/category.
    pub fn validate(&self) -> Result<(), CoreError> {
        let empty = match &self.kind {
            TaskKind::Io(spec) => spec.test_cases.is_empty(),
            TaskKind::State(spec) => spec.assertions.is_empty(),
        };
        if empty {
            return Err(CoreError::MalformedTask {
                task_id: self.id.clone(),
                reason: "test case list is empty".to_string(),
            });
        }
        if self.category.is_empty() {
            return Err(CoreError::MalformedTask {
                task_id: self.id.clone(),
                reason: "category is empty".to_string(),
            });
        }
        if !(1..=10).contains(&self.difficulty) {
            return Err(CoreError::MalformedTask {
                task_id: self.id.clone(),
                reason: format!("difficulty {} out of range 1..10", self.difficulty),
            });
        }
        Ok(())
    }

    pub fn is_state_task(&self) -> bool {
        matches!(self.kind, TaskKind::State(_))
    }
}

/// The originating tier of a `Candidate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    S0,
    S1,
    S2,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S0 => "s0",
            Tier::S1 => "s1",
            Tier::S2 => "s2",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A proposed solution artifact: source text for an IO-task, or a
/// command sequence for a State-task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Candidate {
    Source { code: String, tier: Tier },
    Commands { commands: Vec<String>, tier: Tier },
}

impl Candidate {
    pub fn tier(&self) -> Tier {
        match self {
            Candidate::Source { tier, .. } => *tier,
            Candidate::Commands { tier, .. } => *tier,
        }
    }

    /// The artifact's canonical text form, used for caching, promotion
    /// ring storage, and length-based tie-breaks.
    pub fn artifact_text(&self) -> String {
        match self {
            Candidate::Source { code, .. } => code.clone(),
            Candidate::Commands { commands, .. } => commands.join("\n"),
        }
    }

    pub fn from_artifact_text(text: &str, kind: &TaskKind, tier: Tier) -> Self {
        match kind {
            TaskKind::Io(_) => Candidate::Source {
                code: text.to_string(),
                tier,
            },
            TaskKind::State(_) => Candidate::Commands {
                commands: text.lines().map(|l| l.to_string()).collect(),
                tier,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_task(test_cases: Vec<TestCase>) -> Task {
        Task {
            id: "t1".to_string(),
            title: "title".to_string(),
            description: "desc".to_string(),
            difficulty: 3,
            category: "algorithms".to_string(),
            hints: vec![],
            tags: vec![],
            kind: TaskKind::Io(IoSpec { test_cases }),
        }
    }

    #[test]
    fn empty_test_cases_is_malformed() {
        let task = io_task(vec![]);
        assert!(task.validate().is_err());
    }

    #[test]
    fn non_empty_test_cases_validates() {
        let task = io_task(vec![TestCase::new("1", "1", "trivial")]);
        assert!(task.validate().is_ok());
    }

    #[test]
    fn difficulty_out_of_range_is_malformed() {
        let mut task = io_task(vec![TestCase::new("1", "1", "trivial")]);
        task.difficulty = 0;
        assert!(task.validate().is_err());
    }

    #[test]
    fn candidate_artifact_roundtrip_for_commands() {
        let candidate = Candidate::Commands {
            commands: vec!["echo hi".to_string(), "ls".to_string()],
            tier: Tier::S0,
        };
        assert_eq!(candidate.artifact_text(), "echo hi\nls");
    }
}
