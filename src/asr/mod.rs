use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod whisper;

#[derive(Debug, Clone, Default)]
pub struct AsrParams {
    pub language: Option<String>,
    pub translate: bool,
}

impl AsrParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_language(&mut self, language: Option<String>) -> &Self {
        self.language = language;
        self
    }

    pub fn set_translate(&mut self, translate: bool) -> &Self {
        self.translate = translate;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeSegment {
    pub text: String,
    /// Segment bounds in seconds from the start of the recording.
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeResult {
    pub segments: Vec<TranscribeSegment>,
    pub full_text: String,
}

#[async_trait]
pub trait AsrEngine: Send + Sync {
    async fn transcribe(&self, audio: Vec<f32>, params: AsrParams) -> Result<TranscribeResult>;
}
