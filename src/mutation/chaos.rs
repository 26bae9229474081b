//! Chaos monkey mutations: structured, minimal edits to correct source
//! that produce buggy source for self-correction training tasks.
//! Grounded line-for-line on `chaos_monkey.py`'s `_mutate_*` family.

use regex::Regex;

use crate::eval::evaluate;
use crate::sandbox::SandboxLimits;
use crate::task::{Candidate, Task, Tier};

/// One of the structured source-edit kinds a mutator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    OffByOne,
    WrongOperator,
    ComparisonFlip,
    OutputFormat,
    IndexError,
    WrongInit,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::OffByOne => "off_by_one",
            MutationKind::WrongOperator => "wrong_operator",
            MutationKind::ComparisonFlip => "comparison_flip",
            MutationKind::OutputFormat => "output_format",
            MutationKind::IndexError => "index_error",
            MutationKind::WrongInit => "wrong_init",
        }
    }
}

/// The result of a successful mutation attempt.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub broken_code: String,
    pub kind: MutationKind,
    pub description: String,
}

type Mutator = fn(&str) -> Option<Mutation>;

const MUTATORS: &[Mutator] = &[
    mutate_off_by_one,
    mutate_wrong_operator,
    mutate_comparison_flip,
    mutate_output_format,
    mutate_index_error,
    mutate_wrong_init,
];

/// Applies one random mutation from the kind set, trying mutators in a
/// shuffled order until one finds an applicable site.
pub fn mutate_solution(code: &str) -> Option<Mutation> {
    use rand::seq::SliceRandom;

    let mut order: Vec<Mutator> = MUTATORS.to_vec();
    order.shuffle(&mut rand::rng());
    order.into_iter().find_map(|mutator| mutator(code))
}

/// True if `pos` (a byte offset into `code`) falls inside a string
/// literal, per the quote-parity heuristic in `chaos_monkey.py::_in_string`.
/// A parser-based variant would be exact; this is a deliberate
/// approximation that trades precision for simplicity.
fn in_string(code: &str, pos: usize) -> bool {
    let line_start = code[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &code[line_start..pos];
    let singles = line.matches('\'').count();
    let doubles = line.matches('"').count();
    singles % 2 == 1 || doubles % 2 == 1
}

fn pick_random<'a, T>(items: &'a [T]) -> Option<&'a T> {
    use rand::seq::IndexedRandom;
    items.choose(&mut rand::rng())
}

fn mutate_off_by_one(code: &str) -> Option<Mutation> {
    let re = Regex::new(r"range\((\w+)\)").expect("static pattern");
    let matches: Vec<_> = re.captures_iter(code).collect();
    if matches.is_empty() {
        return None;
    }
    let cap = pick_random(&matches)?;
    let whole = cap.get(0).unwrap();
    let var = &cap[1];
    let plus = {
        use rand::RngExt;
        rand::rng().random_bool(0.5)
    };
    let (replacement, desc) = if plus {
        (format!("range({}+1)", var), format!("Off-by-one: range({}) -> range({}+1)", var, var))
    } else {
        (format!("range({}-1)", var), format!("Off-by-one: range({}) -> range({}-1)", var, var))
    };
    let mut broken = String::with_capacity(code.len());
    broken.push_str(&code[..whole.start()]);
    broken.push_str(&replacement);
    broken.push_str(&code[whole.end()..]);
    Some(Mutation { broken_code: broken, kind: MutationKind::OffByOne, description: desc })
}

/// Finds byte offsets of `needle` in `code` that are not adjacent to `=`
/// on either side (avoiding compound assignment like `+=`) and not inside
/// a string literal.
fn find_bare_operator_sites(code: &str, needle: char) -> Vec<usize> {
    code.char_indices()
        .filter(|&(_, c)| c == needle)
        .filter(|&(i, _)| {
            let prev = code[..i].chars().next_back();
            let next = code[i + needle.len_utf8()..].chars().next();
            prev != Some('=') && next != Some('=') && !in_string(code, i)
        })
        .map(|(i, _)| i)
        .collect()
}

fn apply_single_char_replacement(code: &str, pos: usize, ch_len: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(code.len());
    out.push_str(&code[..pos]);
    out.push_str(replacement);
    out.push_str(&code[pos + ch_len..]);
    out
}

fn mutate_wrong_operator(code: &str) -> Option<Mutation> {
    use rand::seq::SliceRandom;

    let mut swaps: Vec<(char, &str, &str)> = vec![
        ('+', "-", "Operator swap: + -> -"),
        ('-', "+", "Operator swap: - -> +"),
        ('*', "//", "Operator swap: * -> //"),
    ];
    swaps.shuffle(&mut rand::rng());

    for (needle, replacement, desc) in swaps {
        let sites: Vec<usize> = if needle == '*' {
            // Avoid `**` (power).
            find_bare_operator_sites(code, needle)
                .into_iter()
                .filter(|&i| code[i + 1..].chars().next() != Some('*'))
                .collect()
        } else {
            find_bare_operator_sites(code, needle)
        };
        if sites.is_empty() {
            continue;
        }
        let pos = *pick_random(&sites)?;
        let broken = apply_single_char_replacement(code, pos, needle.len_utf8(), replacement);
        if broken != code {
            return Some(Mutation { broken_code: broken, kind: MutationKind::WrongOperator, description: desc.to_string() });
        }
    }
    None
}

fn mutate_comparison_flip(code: &str) -> Option<Mutation> {
    use rand::seq::SliceRandom;

    let mut swaps: Vec<(&str, &str, &str)> = vec![
        ("<=", "<", "Comparison flip: <= -> <"),
        (">=", ">", "Comparison flip: >= -> >"),
    ];
    swaps.shuffle(&mut rand::rng());

    // First try the two-character operators (so a bare `<` scan below
    // does not also match the `<` inside an existing `<=`).
    for (needle, replacement, desc) in &swaps {
        if let Some(pos) = code.find(needle) {
            if !in_string(code, pos) {
                let broken = format!("{}{}{}", &code[..pos], replacement, &code[pos + needle.len()..]);
                if broken != code {
                    return Some(Mutation { broken_code: broken, kind: MutationKind::ComparisonFlip, description: desc.to_string() });
                }
            }
        }
    }

    let mut bare: Vec<(char, &str, &str)> = vec![
        ('<', "<=", "Comparison flip: < -> <="),
        ('>', ">=", "Comparison flip: > -> >="),
    ];
    bare.shuffle(&mut rand::rng());
    for (needle, replacement, desc) in bare {
        let sites: Vec<usize> = find_bare_operator_sites(code, needle)
            .into_iter()
            .filter(|&i| code[i + 1..].chars().next() != Some('='))
            .collect();
        if sites.is_empty() {
            continue;
        }
        let pos = *pick_random(&sites)?;
        let broken = apply_single_char_replacement(code, pos, needle.len_utf8(), replacement);
        if broken != code {
            return Some(Mutation { broken_code: broken, kind: MutationKind::ComparisonFlip, description: desc.to_string() });
        }
    }
    None
}

fn mutate_output_format(code: &str) -> Option<Mutation> {
    if let Some(pos) = code.find("' '.join") {
        let broken = format!("{}','.join{}", &code[..pos], &code[pos + "' '.join".len()..]);
        return Some(Mutation {
            broken_code: broken,
            kind: MutationKind::OutputFormat,
            description: "Output format: space-separated -> comma-separated".to_string(),
        });
    }
    if code.contains("print(") && !code.contains("\\n") {
        let broken = format!("{}\nprint()", code);
        return Some(Mutation {
            broken_code: broken,
            kind: MutationKind::OutputFormat,
            description: "Output format: extra empty line at end".to_string(),
        });
    }
    None
}

fn mutate_index_error(code: &str) -> Option<Mutation> {
    use rand::seq::SliceRandom;

    let mut patterns: Vec<(&str, &str, &str)> = vec![
        ("[0]", "[1]", "Index error: [0] -> [1]"),
        ("[-1]", "[-2]", "Index error: [-1] -> [-2]"),
    ];
    patterns.shuffle(&mut rand::rng());
    for (needle, replacement, desc) in patterns {
        let re = Regex::new(&regex::escape(needle)).expect("escaped literal is always valid");
        let matches: Vec<_> = re.find_iter(code).collect();
        if matches.is_empty() {
            continue;
        }
        let m = *pick_random(&matches)?;
        let broken = format!("{}{}{}", &code[..m.start()], replacement, &code[m.end()..]);
        return Some(Mutation { broken_code: broken, kind: MutationKind::IndexError, description: desc.to_string() });
    }
    None
}

fn mutate_wrong_init(code: &str) -> Option<Mutation> {
    if let Some(pos) = code.find("= 0\n") {
        let broken = format!("{}= 1\n{}", &code[..pos], &code[pos + "= 0\n".len()..]);
        return Some(Mutation { broken_code: broken, kind: MutationKind::WrongInit, description: "Wrong init: = 0 -> = 1".to_string() });
    }
    if let Some(pos) = code.find("float('inf')") {
        let broken = format!("{}0{}", &code[..pos], &code[pos + "float('inf')".len()..]);
        return Some(Mutation { broken_code: broken, kind: MutationKind::WrongInit, description: "Wrong init: float('inf') -> 0".to_string() });
    }
    if let Some(pos) = code.find("float('-inf')") {
        let broken = format!("{}0{}", &code[..pos], &code[pos + "float('-inf')".len()..]);
        return Some(Mutation { broken_code: broken, kind: MutationKind::WrongInit, description: "Wrong init: float('-inf') -> 0".to_string() });
    }
    None
}

/// A task wrapping a mutated solution: find and fix the bug.
#[derive(Debug, Clone)]
pub struct ChaosTask {
    pub original_task_id: String,
    pub correct_code: String,
    pub broken_code: String,
    pub mutation: Mutation,
    pub task: Task,
}

/// Mutates `correct_code`, verifies the mutation actually breaks at
/// least one test case, and wraps it as a new "find and fix the bug"
/// task. Retries up to `max_attempts` times if a mutation turns out to
/// be trivial (still scores 1.0), grounded on
/// `chaos_monkey.py::create_chaos_task`.
pub async fn create_chaos_task(task: &Task, correct_code: &str, limits: &SandboxLimits, max_attempts: u32) -> Option<ChaosTask> {
    for _ in 0..max_attempts {
        let mutation = mutate_solution(correct_code)?;
        let candidate = Candidate::Source { code: mutation.broken_code.clone(), tier: Tier::S0 };
        let result = evaluate(task, &candidate, limits).await;
        if result.score >= 1.0 {
            continue;
        }
        let wrapped = Task {
            id: format!("chaos-{}-{}", mutation.kind.as_str(), task.id),
            title: format!("Fix the bug: {}", task.title),
            description: format!(
                "The following code is supposed to solve: {}\n\nBut it contains a bug. Identify and fix it.\n\nBuggy code:\n{}\n\nSubmit the corrected code.",
                task.description, mutation.broken_code
            ),
            difficulty: (task.difficulty + 1).min(10),
            category: format!("chaos_{}", task.category),
            hints: vec![format!("The bug is of type: {}", mutation.kind.as_str().replace('_', " "))],
            tags: {
                let mut tags = vec!["chaos_monkey".to_string(), "debugging".to_string(), mutation.kind.as_str().to_string()];
                tags.extend(task.tags.clone());
                tags
            },
            kind: task.kind.clone(),
        };
        return Some(ChaosTask {
            original_task_id: task.id.clone(),
            correct_code: correct_code.to_string(),
            broken_code: mutation.broken_code.clone(),
            mutation,
            task: wrapped,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_string_detects_odd_quote_parity() {
        let code = "x = 'a + b'\ny = a + b\n";
        let plus_in_line1 = code.find("+ b'").unwrap();
        let plus_in_line2 = code.rfind("+ b\n").unwrap();
        assert!(in_string(code, plus_in_line1));
        assert!(!in_string(code, plus_in_line2));
    }

    #[test]
    fn comparison_flip_targets_tokens_outside_strings() {
        let code = "if a < b:\n    print('a < b')\n";
        let mutation = mutate_comparison_flip(code);
        if let Some(m) = mutation {
            assert!(m.broken_code.contains("a <= b:"));
            assert!(m.broken_code.contains("'a < b'"));
        }
    }

    #[test]
    fn off_by_one_rewrites_a_range_call() {
        let code = "for i in range(n):\n    print(i)\n";
        let mutation = mutate_off_by_one(code).unwrap();
        assert_ne!(mutation.broken_code, code);
        assert!(mutation.broken_code.contains("range(n+1)") || mutation.broken_code.contains("range(n-1)"));
    }

    #[test]
    fn wrong_init_rewrites_zero_initialization() {
        let code = "total = 0\nfor x in xs:\n    total = total + x\n";
        let mutation = mutate_wrong_init(code).unwrap();
        assert!(mutation.broken_code.contains("total = 1"));
    }

    #[test]
    fn no_applicable_site_returns_none() {
        let code = "print('hello world')\n";
        assert!(mutate_off_by_one(code).is_none());
        assert!(mutate_index_error(code).is_none());
    }
}
