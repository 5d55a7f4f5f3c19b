use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod local;

pub use local::LocalCatalog;

/// One source recording, as enumerated by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Opaque stable identifier, unique within the catalog.
    pub id: String,
    pub name: String,
    /// Byte count, advisory (logging/estimation only).
    pub size: u64,
    /// Creation time; items are processed oldest first.
    pub created_at: DateTime<Utc>,
}

/// Opaque handle to a resolved source or destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("folder '{0}' not found")]
    FolderNotFound(String),
}

/// Storage-provider boundary: folder lookup, item enumeration and transfer.
/// Lookup failures are fatal for a run; no items can be safely enumerated
/// without a resolved folder.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn resolve_source(&self, name: &str) -> Result<FolderRef>;

    /// Resolve the destination folder, creating it when missing.
    async fn resolve_destination(&self, name: &str) -> Result<FolderRef>;

    /// All candidate recordings in `folder`, sorted oldest first.
    async fn list_items(&self, folder: &FolderRef) -> Result<Vec<Item>>;

    /// Titles of artifacts already present in `folder`.
    async fn list_artifact_names(&self, folder: &FolderRef) -> Result<HashSet<String>>;

    /// Fetch the item's media to a local path.
    async fn download(&self, item: &Item, dest: &Path) -> Result<()>;

    /// Store a finished text artifact, returning its id.
    async fn publish(&self, title: &str, body: &str, folder: &FolderRef) -> Result<String>;
}
