use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::batch::types::ProcessedMap;

#[cfg(test)]
mod tests;

/// Durable id → outcome mapping, persisted after every item transition.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Load the processed map. Absent or structurally invalid state yields
    /// an empty map with a warning; loading never fails a run.
    async fn load(&self) -> ProcessedMap;

    /// Persist the whole map. Failure here is fatal: silently losing
    /// progress tracking risks duplicate artifacts on the next run.
    async fn save(&self, records: &ProcessedMap) -> Result<()>;
}

/// The processed map as a single JSON document, replaced atomically
/// (write to a sibling temp file, then rename) on every save.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    async fn load(&self) -> ProcessedMap {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No state file at {}, starting empty", self.path.display());
                return ProcessedMap::new();
            }
            Err(e) => {
                warn!(
                    "Could not read state file {} ({}), starting empty",
                    self.path.display(),
                    e
                );
                return ProcessedMap::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(
                    "State file {} is not a valid processed map ({}), starting empty",
                    self.path.display(),
                    e
                );
                ProcessedMap::new()
            }
        }
    }

    async fn save(&self, records: &ProcessedMap) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));

        // write-then-rename so a crash never leaves a torn state file
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}
