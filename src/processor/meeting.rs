use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{ArtifactRef, ItemError, ItemProcessor};
use crate::asr::{AsrEngine, AsrParams};
use crate::audio;
use crate::batch::plan::doc_title;
use crate::catalog::{Catalog, FolderRef, Item};
use crate::notes::{self, NotesEngine};

/// Download a recording, extract/transcode its audio when possible,
/// transcribe it, optionally generate minutes, and publish the document.
pub struct MeetingProcessor {
    catalog: Arc<dyn Catalog>,
    asr: Arc<dyn AsrEngine>,
    notes: Option<Arc<dyn NotesEngine>>,
    destination: FolderRef,
    work_dir: PathBuf,
    language: Option<String>,
}

impl MeetingProcessor {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        asr: Arc<dyn AsrEngine>,
        notes: Option<Arc<dyn NotesEngine>>,
        destination: FolderRef,
        work_dir: PathBuf,
        language: Option<String>,
    ) -> Self {
        Self {
            catalog,
            asr,
            notes,
            destination,
            work_dir,
            language,
        }
    }
}

#[async_trait]
impl ItemProcessor for MeetingProcessor {
    async fn process(&self, item: &Item) -> Result<ArtifactRef, ItemError> {
        let title = doc_title(&item.name);

        // everything transient for this item lives in one directory,
        // removed when the guard drops on any exit path
        let scratch = tempfile::Builder::new()
            .prefix("minutes-")
            .tempdir_in(&self.work_dir)
            .map_err(|e| ItemError::Download(e.into()))?;

        let file_name = Path::new(&item.name)
            .file_name()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| "media".into());
        let media_path = scratch.path().join(file_name);

        info!("Downloading: {}", item.name);
        self.catalog
            .download(item, &media_path)
            .await
            .map_err(ItemError::Download)?;

        // best-effort transform; None means transcribe the original media
        let audio_path = match audio::extract_audio(&media_path) {
            Some(wav_path) => {
                // the original download can be large; drop it early
                if let Err(e) = std::fs::remove_file(&media_path) {
                    warn!("Could not remove downloaded media early: {}", e);
                }
                wav_path
            }
            None => media_path.clone(),
        };

        info!("Transcribing: {}", item.name);
        let samples = audio::load_audio(&audio_path).map_err(ItemError::Transcribe)?;
        let mut params = AsrParams::new();
        params.set_language(self.language.clone());
        let transcript = self
            .asr
            .transcribe(samples, params)
            .await
            .map_err(ItemError::Transcribe)?;

        let body = match &self.notes {
            Some(engine) => engine.generate(&transcript.full_text).await?,
            None => notes::render_transcript(&item.name, &transcript),
        };

        info!("Publishing: {}", title);
        let doc_id = self
            .catalog
            .publish(&title, &body, &self.destination)
            .await
            .map_err(ItemError::Publish)?;

        Ok(ArtifactRef { id: doc_id, title })
    }
}
