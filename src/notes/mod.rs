use async_trait::async_trait;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiNotes;

use crate::asr::TranscribeResult;
use crate::retry::Disposition;

/// Failure taxonomy for the minutes-generation backend. Vendor-specific
/// translation (status codes, message sniffing) stays inside the adapter;
/// the rest of the pipeline only sees these variants.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("rate limited by the remote service")]
    RateLimited,
    #[error("generation blocked: {reason}")]
    Blocked { reason: String },
    #[error("remote service returned status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Only rate limiting is worth another attempt.
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::RateLimited => Disposition::Retry,
            _ => Disposition::Fatal,
        }
    }
}

#[async_trait]
pub trait NotesEngine: Send + Sync {
    /// Turn a raw transcript into meeting minutes.
    async fn generate(&self, transcript: &str) -> Result<String, RemoteError>;
}

/// Render the timestamped transcript document. This is the published body
/// when no minutes engine is configured, and the input handed to one when
/// it is.
pub fn render_transcript(recording_name: &str, result: &TranscribeResult) -> String {
    let mut lines = vec![
        format!("# Meeting transcript: {}", recording_name),
        String::new(),
        "## Note".to_string(),
        "- Transcribed automatically by Whisper.".to_string(),
        "- Proper nouns and domain terms may be misrecognized.".to_string(),
        String::new(),
        "## Transcript".to_string(),
    ];

    if result.segments.is_empty() {
        lines.push("- (no speech detected)".to_string());
        return lines.join("\n");
    }

    for seg in &result.segments {
        let ts = format!("[{} - {}]", format_time(seg.start), format_time(seg.end));
        let text = if seg.text.trim().is_empty() {
            "(inaudible)"
        } else {
            seg.text.trim()
        };
        lines.push(format!("- {} {}", ts, text));
    }

    lines.join("\n")
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
