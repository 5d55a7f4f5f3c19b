use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{NotesEngine, RemoteError};
use crate::retry::RetryPolicy;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const MAX_OUTPUT_TOKENS: u32 = 8192;
const TEMPERATURE: f32 = 0.3;

const MEETING_NOTES_PROMPT: &str = "\
You are an expert meeting-minutes assistant. From the transcript below,
write detailed meeting minutes with the following structure:

### Meeting overview
- Topic (inferred from the content)
- Participants (when identifiable)
- Purpose of the meeting

### Agenda and discussion
For each topic: its title, the key points discussed, and the main
positions per speaker when identifiable.

### Decisions
- Items agreed or decided, as a bullet list.

### Action items
- Who does what, by when (when identifiable).

### Remarks
- Other important statements or context.

Rules: prioritize accuracy and never invent statements; keep domain terms
as spoken; mark unclear passages as (inaudible); follow the order of the
conversation.";

/// Minutes generation over the Generative Language REST API.
///
/// This adapter is the single place vendor errors are translated into the
/// internal taxonomy; callers retry on `RateLimited` and nothing else.
pub struct GeminiNotes {
    client: reqwest::Client,
    api_key: String,
    model: String,
    retry: RetryPolicy,
}

impl GeminiNotes {
    pub fn new(api_key: String, model: String, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            retry,
        }
    }

    async fn generate_once(&self, transcript: &str) -> Result<String, RemoteError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            API_BASE, self.model, self.api_key
        );
        let body = json!({
            "contents": [{
                "parts": [{
                    "text": format!("{}\n\n---\n\n{}", MEETING_NOTES_PROMPT, transcript)
                }]
            }],
            "generationConfig": {
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
                "temperature": TEMPERATURE,
            },
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // some gateways only report quota exhaustion in the body
            if text.contains("429") || text.to_lowercase().contains("too many requests") {
                return Err(RemoteError::RateLimited);
            }
            return Err(RemoteError::Status(status.as_u16()));
        }

        let payload: GenerateResponse = response.json().await?;
        extract_text(payload)
    }
}

#[async_trait]
impl NotesEngine for GeminiNotes {
    async fn generate(&self, transcript: &str) -> Result<String, RemoteError> {
        info!("Generating meeting minutes (model: {})", self.model);
        self.retry
            .run(|| self.generate_once(transcript), RemoteError::disposition)
            .await
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// A blocked or empty generation is an error, never an empty success.
fn extract_text(payload: GenerateResponse) -> Result<String, RemoteError> {
    if let Some(feedback) = &payload.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(RemoteError::Blocked {
                reason: reason.clone(),
            });
        }
    }

    let candidate = payload
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| RemoteError::Blocked {
            reason: "no candidates returned".to_string(),
        })?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(RemoteError::Blocked {
            reason: "candidate stopped for safety".to_string(),
        });
    }

    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(RemoteError::Blocked {
            reason: "empty response".to_string(),
        });
    }

    Ok(text)
}
