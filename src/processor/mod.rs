use async_trait::async_trait;
use thiserror::Error;

pub mod meeting;

pub use meeting::MeetingProcessor;

use crate::catalog::Item;
use crate::notes::RemoteError;

/// Reference to a published artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRef {
    pub id: String,
    pub title: String,
}

/// Stage-tagged failure for one item. Item failures are values the
/// orchestrator records and moves past; they never abort a run by
/// themselves.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("download failed: {0}")]
    Download(#[source] anyhow::Error),
    #[error("transcription failed: {0}")]
    Transcribe(#[source] anyhow::Error),
    #[error("minutes generation failed: {0}")]
    Notes(#[from] RemoteError),
    #[error("publish failed: {0}")]
    Publish(#[source] anyhow::Error),
}

/// One item through download -> transform -> transcribe -> publish.
#[async_trait]
pub trait ItemProcessor: Send + Sync {
    async fn process(&self, item: &Item) -> Result<ArtifactRef, ItemError>;
}
