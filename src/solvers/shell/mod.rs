//! State-task analogue of the Deterministic Solver Registry: an ordered
//! registry of shell-pattern matchers emitting command sequences instead
//! of source text. Grounded on
//! `terminal_solver.py::solve_deterministic`'s ordered dispatch loop.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::task::Task;

type Matcher = fn(&Task) -> Option<Vec<String>>;

const MATCHERS: &[Matcher] = &[
    solve_file_create,
    solve_move_rename,
    solve_copy_file,
    solve_count_matching_lines,
    solve_sort_lines,
    solve_git_init_commit,
    solve_csv_extract,
];

/// Tries each matcher in order; the first to produce a command sequence
/// wins. Mirrors `solvers::s0::solve_deterministic`'s panic-as-non-match
/// contract.
pub fn solve_deterministic(task: &Task) -> Option<Vec<String>> {
    for matcher in MATCHERS {
        if let Ok(Some(commands)) = catch_unwind(AssertUnwindSafe(|| matcher(task))) {
            return Some(commands);
        }
    }
    None
}

fn desc(task: &Task) -> String {
    format!("{} {}", task.title, task.description).to_lowercase()
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Extracts a bare filename token following one of `after` in `text`.
fn extract_filename<'a>(text: &'a str, after: &[&str]) -> Option<&'a str> {
    for marker in after {
        if let Some(pos) = text.find(marker) {
            let rest = text[pos + marker.len()..].trim_start();
            if let Some(tok) = rest.split_whitespace().next() {
                let trimmed = tok.trim_matches(|c: char| !c.is_alphanumeric() && c != '.' && c != '_' && c != '/' && c != '-');
                if !trimmed.is_empty() {
                    return Some(trimmed);
                }
            }
        }
    }
    None
}

fn solve_file_create(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !contains_any(&d, &["create a file", "create file"]) {
        return None;
    }
    let filename = extract_filename(&d, &["create a file named", "create a file called", "create file"])
        .unwrap_or("output.txt");

    if contains_any(&d, &["three lines", "3 lines"]) && d.contains("item") {
        return Some(vec![format!("printf 'item 1\\nitem 2\\nitem 3\\n' > {}", filename)]);
    }
    if let Some(pos) = d.find("with contents") {
        let contents = d[pos + "with contents".len()..].trim().trim_matches('\'').trim_matches('"');
        if !contents.is_empty() {
            return Some(vec![format!("printf '%s\\n' '{}' > {}", contents.replace('\'', "'\\''"), filename)]);
        }
    }
    Some(vec![format!("touch {}", filename)])
}

fn solve_move_rename(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !contains_any(&d, &["rename", "move the file"]) {
        return None;
    }
    let src = extract_filename(&d, &["rename"]).unwrap_or("source.txt");
    let dst = extract_filename(&d, &["to "]).unwrap_or("dest.txt");
    Some(vec![format!("mv {} {}", src, dst)])
}

fn solve_copy_file(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !d.contains("copy") {
        return None;
    }
    let src = extract_filename(&d, &["copy"]).unwrap_or("source.txt");
    let dst = extract_filename(&d, &["to "]).unwrap_or("dest.txt");
    Some(vec![format!("cp {} {}", src, dst)])
}

fn solve_count_matching_lines(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !contains_any(&d, &["count the lines matching", "count lines matching", "lines containing"]) {
        return None;
    }
    let file = extract_filename(&d, &["in ", "from "]).unwrap_or("input.txt");
    let pattern = extract_filename(&d, &["matching", "containing"]).unwrap_or("");
    Some(vec![format!("grep -c '{}' {} > count.txt", pattern, file)])
}

fn solve_sort_lines(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !contains_any(&d, &["sort the lines", "sort lines"]) {
        return None;
    }
    let file = extract_filename(&d, &["of ", "in "]).unwrap_or("input.txt");
    Some(vec![format!("sort {} -o {}", file, file)])
}

fn solve_git_init_commit(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !contains_any(&d, &["git init", "initialize a git repo", "init a git repository"]) {
        return None;
    }
    Some(vec![
        "git init -q".to_string(),
        "git config user.email test@example.com".to_string(),
        "git config user.name Test".to_string(),
        "touch README.md".to_string(),
        "git add README.md".to_string(),
        "git commit -q -m 'initial commit'".to_string(),
    ])
}

fn solve_csv_extract(task: &Task) -> Option<Vec<String>> {
    let d = desc(task);
    if !contains_any(&d, &["extract field", "extract column", "csv"]) {
        return None;
    }
    let file = extract_filename(&d, &["from "]).unwrap_or("data.csv");
    Some(vec![format!("cut -d, -f1 {} > extracted.txt", file)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{StateAssertion, StateCheck, StateSpec, TaskKind};
    use std::time::Duration;

    fn task(title: &str, description: &str) -> Task {
        Task {
            id: "t1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            difficulty: 2,
            category: "shell".to_string(),
            hints: vec![],
            tags: vec![],
            kind: TaskKind::State(StateSpec {
                assertions: vec![StateAssertion::new("exists", StateCheck::FileExists, "report.txt", "")],
                max_steps: 10,
                wall_clock_budget: Duration::from_secs(30),
                setup_commands: vec![],
            }),
        }
    }

    #[test]
    fn matches_create_and_count_scenario() {
        let t = task(
            "Create report",
            "create a file report.txt with three lines of the form 'item N'",
        );
        let commands = solve_deterministic(&t).unwrap();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].contains("item 1"));
    }

    #[test]
    fn matches_git_init_commit() {
        let t = task("Init repo", "initialize a git repo and commit");
        let commands = solve_deterministic(&t).unwrap();
        assert!(commands.iter().any(|c| c.starts_with("git init")));
    }

    #[test]
    fn unrecognized_pattern_is_none() {
        let t = task("Mystery", "perform an undefined ritual over the filesystem");
        assert!(solve_deterministic(&t).is_none());
    }
}
