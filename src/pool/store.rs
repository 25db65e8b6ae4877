//! JSON file store for the pool collection.
//!
//! The whole collection is read and written at once. Writes go to a temp
//! file in the same directory and are renamed over the target, so a crash
//! mid-write leaves the previous file intact.

use anyhow::{anyhow, Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::model::Pool;

#[derive(Debug, Clone)]
pub struct PoolStore {
    path: PathBuf,
}

impl PoolStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every pool. A missing file is an empty collection.
    pub fn load(&self) -> Result<Vec<Pool>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    /// Replaces the stored collection.
    pub fn save(&self, pools: &[Pool]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).context("Failed to create pools directory")?;

        let json = serde_json::to_string_pretty(pools).context("Failed to serialize pools")?;
        let mut temp = NamedTempFile::new_in(dir).context("Failed to create temp pools file")?;
        temp.write_all(json.as_bytes())
            .context("Failed to write pools")?;
        temp.persist(&self.path)
            .map_err(|e| anyhow!("Failed to replace {}: {}", self.path.display(), e))?;

        info!("Saved {} pool(s) to {}", pools.len(), self.path.display());
        Ok(())
    }

    /// Applies `update` to the pool with `id` and saves the collection.
    /// Returns the updated pool.
    pub fn update<F>(&self, id: &str, update: F) -> Result<Pool>
    where
        F: FnOnce(&Pool) -> Pool,
    {
        let mut pools = self.load()?;
        let slot = pools
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow!("No pool with id {}", id))?;

        *slot = update(slot);
        let updated = slot.clone();
        self.save(&pools)?;
        Ok(updated)
    }
}
