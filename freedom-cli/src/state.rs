use anyhow::{Context, Result};
use freedom_achievements::MemoryState;
use std::fs;
use std::path::{Path, PathBuf};

/// `$FREEDOM_HOME`, or `~/.freedom`.
pub fn freedom_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FREEDOM_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".freedom"))
}

pub fn ensure_freedom_home() -> Result<PathBuf> {
    let dir = freedom_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn activity_path() -> Result<PathBuf> {
    Ok(ensure_freedom_home()?.join("activity.json"))
}

/// Load check-ins, snapshots and unlocks. A missing file is an empty state.
pub fn load_state(path: &Path) -> Result<MemoryState> {
    if !path.exists() {
        return Ok(MemoryState::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Write via a sibling temp file so a crash never leaves half a file.
pub fn save_state(path: &Path, state: &MemoryState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
