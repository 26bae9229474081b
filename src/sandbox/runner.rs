//! `run_program`: executes a candidate's source against one test case's
//! stdin, under a timeout and capped output, via a temporary file and the
//! configured interpreter.

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::SandboxError;
use crate::metrics;

/// Default stdout cap: 5 KiB.
pub const DEFAULT_STDOUT_CAP: usize = 5 * 1024;
/// Default stderr cap: 2 KiB.
pub const DEFAULT_STDERR_CAP: usize = 2 * 1024;

/// Resource bounds and interpreter configuration for `run_program`.
#[derive(Debug, Clone)]
pub struct SandboxLimits {
    pub timeout: Duration,
    pub stdout_cap: usize,
    pub stderr_cap: usize,
    /// Interpreter executable, e.g. `python3`.
    pub interpreter: PathBuf,
    /// Arguments prepended before the source file path, e.g. `[]`.
    pub interpreter_args: Vec<String>,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            stdout_cap: DEFAULT_STDOUT_CAP,
            stderr_cap: DEFAULT_STDERR_CAP,
            interpreter: PathBuf::from("python3"),
            interpreter_args: Vec::new(),
        }
    }
}

/// Result of running a candidate program against one stdin payload.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub ok: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub elapsed_ms: f64,
    pub timed_out: bool,
}

/// Writes `code` to a temporary file, invokes the configured interpreter
/// with `stdin` piped in, and captures stdout/stderr (both capped).
/// The temporary file is removed on every exit path, including the
/// timeout path.
pub async fn run_program(
    code: &[u8],
    stdin: &[u8],
    limits: &SandboxLimits,
) -> Result<ExecutionResult, SandboxError> {
    let mut tmp = tempfile::Builder::new()
        .prefix("cascade-candidate-")
        .suffix(".src")
        .tempfile()
        .map_err(SandboxError::Io)?;
    tmp.write_all(code).map_err(SandboxError::Io)?;
    tmp.flush().map_err(SandboxError::Io)?;
    let tmp_path = tmp.path().to_path_buf();

    let start = Instant::now();
    let spawn_result = Command::new(&limits.interpreter)
        .args(&limits.interpreter_args)
        .arg(&tmp_path)
        .env("PYTHONDONTWRITEBYTECODE", "1")
        .env("PYTHONIOENCODING", "utf-8")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    // `tmp` (the NamedTempFile) is dropped at function return regardless of
    // branch taken below, which unlinks the file on every exit path.
    let mut child = match spawn_result {
        Ok(child) => child,
        Err(e) => {
            metrics::record_sandbox_outcome("runtime_error");
            return Err(SandboxError::Spawn(e.to_string()));
        }
    };

    if let Some(mut child_stdin) = child.stdin.take() {
        let _ = child_stdin.write_all(stdin).await;
    }

    let exec = tokio::time::timeout(limits.timeout, child.wait_with_output()).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match exec {
        Ok(Ok(output)) => {
            let stdout = truncate_utf8(&output.stdout, limits.stdout_cap);
            let stderr = truncate_utf8(&output.stderr, limits.stderr_cap);
            let exit_code = output.status.code().unwrap_or(-1);
            let ok = output.status.success();
            metrics::record_sandbox_outcome(if ok { "ok" } else { "runtime_error" });
            Ok(ExecutionResult {
                ok,
                stdout: stdout.trim().to_string(),
                stderr: stderr.trim().to_string(),
                exit_code,
                elapsed_ms,
                timed_out: false,
            })
        }
        Ok(Err(e)) => {
            metrics::record_sandbox_outcome("runtime_error");
            Err(SandboxError::Spawn(e.to_string()))
        }
        Err(_) => {
            metrics::record_sandbox_outcome("timeout");
            Ok(ExecutionResult {
                ok: false,
                stdout: String::new(),
                stderr: format!("timed out after {:.1}s", limits.timeout.as_secs_f64()),
                exit_code: -1,
                elapsed_ms,
                timed_out: true,
            })
        }
    }
}

fn truncate_utf8(bytes: &[u8], cap: usize) -> String {
    let slice = if bytes.len() > cap { &bytes[..cap] } else { bytes };
    String::from_utf8_lossy(slice).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_trivial_python_echo() {
        let limits = SandboxLimits::default();
        let code = b"import sys\nprint(sys.stdin.read().strip())\n";
        let result = run_program(code, b"hello\n", &limits).await.unwrap();
        if result.stderr.contains("No such file or directory") {
            // python3 not present in this environment; skip rather than fail.
            return;
        }
        assert!(result.ok);
        assert_eq!(result.stdout, "hello");
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn timeout_is_reported_without_panicking() {
        let mut limits = SandboxLimits::default();
        limits.timeout = Duration::from_millis(50);
        let code = b"import time\ntime.sleep(5)\n";
        let result = run_program(code, b"", &limits).await.unwrap();
        if result.stderr.contains("No such file or directory") {
            return;
        }
        assert!(result.timed_out);
        assert!(!result.ok);
    }
}
