//! Append-only promotions log, one line per promotion event: ISO-8601
//! timestamp + message. Grounded on
//! `promotion_pipeline.py::_log_promotion`, best-effort but logged via
//! `tracing::warn!` rather than Python's bare `except: pass`.

use std::io::Write as _;
use std::path::Path;

use chrono::Utc;
use tracing::warn;

pub fn append(path: &Path, message: &str) {
    let line = format!("[{}] {}\n", Utc::now().to_rfc3339(), message);

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            warn!(error = %e, "failed to create promotions log directory");
            return;
        }
    }

    let opened = std::fs::OpenOptions::new().create(true).append(true).open(path);
    match opened {
        Ok(mut f) => {
            if let Err(e) = f.write_all(line.as_bytes()) {
                warn!(error = %e, "failed to append to promotions log");
            }
        }
        Err(e) => warn!(error = %e, "failed to open promotions log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promotions.log");
        append(&path, "PROMOTED S2→S1: algorithms (sig=algorithms:deadbeef, 3 successes)");
        append(&path, "PROMOTED S1→S0: algorithms (sig=algorithms:deadbeef, 10 consecutive)");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("PROMOTED S2→S1"));
    }
}
