use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::{Catalog, CatalogError, FolderRef, Item};

/// Recording formats we pick up from a source folder.
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "avi", "webm", "mkv", "wmv", "mpeg", "mpg", "wav", "mp3", "m4a", "flac", "ogg",
];

const ARTIFACT_EXTENSION: &str = "md";

/// Filesystem-backed catalog: folders are directories under a root,
/// artifacts are Markdown documents named after their title.
pub struct LocalCatalog {
    root: PathBuf,
}

impl LocalCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn folder_path(&self, folder: &FolderRef) -> PathBuf {
        PathBuf::from(&folder.id)
    }

    fn is_media(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| MEDIA_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Artifact titles double as file names; keep them path-safe.
    fn artifact_file_name(title: &str) -> String {
        let safe = title.replace(['/', '\\'], "-");
        format!("{}.{}", safe, ARTIFACT_EXTENSION)
    }
}

/// Modified time stands in for creation order: Drive-style backends report
/// createdTime, local filesystems only reliably report mtime.
fn entry_timestamp(meta: &std::fs::Metadata) -> DateTime<Utc> {
    let ts = meta
        .modified()
        .or_else(|_| meta.created())
        .unwrap_or(SystemTime::UNIX_EPOCH);
    DateTime::<Utc>::from(ts)
}

#[async_trait]
impl Catalog for LocalCatalog {
    async fn resolve_source(&self, name: &str) -> Result<FolderRef> {
        let path = self.root.join(name);
        if !path.is_dir() {
            return Err(CatalogError::FolderNotFound(name.to_string()).into());
        }
        info!("Source folder found: {} ({})", name, path.display());
        Ok(FolderRef {
            id: path.to_string_lossy().into_owned(),
            name: name.to_string(),
        })
    }

    async fn resolve_destination(&self, name: &str) -> Result<FolderRef> {
        let path = self.root.join(name);
        if !path.is_dir() {
            info!("Destination folder missing, creating: {}", path.display());
            tokio::fs::create_dir_all(&path).await?;
        }
        Ok(FolderRef {
            id: path.to_string_lossy().into_owned(),
            name: name.to_string(),
        })
    }

    async fn list_items(&self, folder: &FolderRef) -> Result<Vec<Item>> {
        let dir = self.folder_path(folder);
        let mut items = Vec::new();

        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() || !Self::is_media(&path) {
                continue;
            }
            let meta = entry.metadata().await?;
            let name = entry.file_name().to_string_lossy().into_owned();
            items.push(Item {
                id: path.to_string_lossy().into_owned(),
                name,
                size: meta.len(),
                created_at: entry_timestamp(&meta),
            });
        }

        // oldest first; name breaks timestamp ties deterministically
        items.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        info!("Found {} recording(s) in {}", items.len(), folder.name);
        Ok(items)
    }

    async fn list_artifact_names(&self, folder: &FolderRef) -> Result<HashSet<String>> {
        let dir = self.folder_path(folder);
        let mut names = HashSet::new();

        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_artifact = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(ARTIFACT_EXTENSION))
                .unwrap_or(false);
            if !is_artifact {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.insert(stem.to_string());
            }
        }
        Ok(names)
    }

    async fn download(&self, item: &Item, dest: &Path) -> Result<()> {
        tokio::fs::copy(&item.id, dest).await?;
        info!("Download complete: {}", dest.display());
        Ok(())
    }

    async fn publish(&self, title: &str, body: &str, folder: &FolderRef) -> Result<String> {
        let path = self.folder_path(folder).join(Self::artifact_file_name(title));
        tokio::fs::write(&path, body).await?;
        let id = path.to_string_lossy().into_owned();
        info!("Artifact published: {} ({})", title, id);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn touch_with_mtime(path: &Path, secs: u64) {
        fs::write(path, b"data").unwrap();
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[tokio::test]
    async fn lists_media_oldest_first() -> Result<()> {
        let root = tempfile::tempdir()?;
        let src = root.path().join("recordings");
        fs::create_dir(&src)?;

        touch_with_mtime(&src.join("standup.mp4"), 2_000);
        touch_with_mtime(&src.join("retro.mov"), 1_000);
        touch_with_mtime(&src.join("notes.txt"), 500); // not media

        let catalog = LocalCatalog::new(root.path());
        let folder = catalog.resolve_source("recordings").await?;
        let items = catalog.list_items(&folder).await?;

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["retro.mov", "standup.mp4"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_source_folder_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let catalog = LocalCatalog::new(root.path());
        let err = catalog.resolve_source("nope").await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn destination_is_created_when_missing() -> Result<()> {
        let root = tempfile::tempdir()?;
        let catalog = LocalCatalog::new(root.path());
        let folder = catalog.resolve_destination("minutes").await?;
        assert!(PathBuf::from(&folder.id).is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn publish_round_trips_through_artifact_names() -> Result<()> {
        let root = tempfile::tempdir()?;
        let catalog = LocalCatalog::new(root.path());
        let dest = catalog.resolve_destination("minutes").await?;

        catalog
            .publish("Meeting Notes - standup", "hello", &dest)
            .await?;

        let names = catalog.list_artifact_names(&dest).await?;
        assert!(names.contains("Meeting Notes - standup"));
        Ok(())
    }

    #[tokio::test]
    async fn download_copies_the_media() -> Result<()> {
        let root = tempfile::tempdir()?;
        let src = root.path().join("recordings");
        fs::create_dir(&src)?;
        fs::write(src.join("a.wav"), b"wav-bytes")?;

        let catalog = LocalCatalog::new(root.path());
        let folder = catalog.resolve_source("recordings").await?;
        let items = catalog.list_items(&folder).await?;

        let dest = root.path().join("copy.wav");
        catalog.download(&items[0], &dest).await?;
        assert_eq!(fs::read(&dest)?, b"wav-bytes");
        Ok(())
    }
}
