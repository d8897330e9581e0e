use anyhow::{Context, Result};
use cadence_core::MemoryStore;
use std::fs;
use std::path::PathBuf;

pub fn cadence_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".cadence"))
}

pub fn ensure_cadence_home() -> Result<PathBuf> {
    let dir = cadence_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn state_path() -> Result<PathBuf> {
    Ok(ensure_cadence_home()?.join("state.json"))
}

pub fn load_store() -> Result<MemoryStore> {
    let p = state_path()?;
    if !p.exists() {
        return Ok(MemoryStore::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_store(store: &MemoryStore) -> Result<()> {
    let p = state_path()?;
    let json = serde_json::to_string_pretty(store)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
