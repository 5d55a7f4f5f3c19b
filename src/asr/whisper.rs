use anyhow::Result;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::asr::{AsrEngine, AsrParams, TranscribeResult, TranscribeSegment};

/// Whisper-backed transcription engine.
///
/// Built once per run and shared by `Arc`; the context owns the model
/// weights and releases them when the handle is dropped.
pub struct WhisperAsr {
    whisper_ctx: WhisperContext,
}

impl WhisperAsr {
    pub fn new(model_path: String) -> Result<Self> {
        match WhisperContext::new_with_params(&model_path, WhisperContextParameters::default()) {
            Ok(whisper_ctx) => Ok(Self { whisper_ctx }),
            Err(e) => Err(anyhow::anyhow!("failed to open whisper model: {}", e)),
        }
    }

    fn build_params(&self, ap: &AsrParams) -> FullParams {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // deterministic output for meeting archives
        params.set_temperature(0.0);

        params.set_n_threads(8);

        params.set_translate(ap.translate);

        // long recordings need cross-segment context
        params.set_no_context(false);
        params.set_single_segment(false);

        params.set_print_progress(false);
        params.set_print_special(false);
        params.set_print_realtime(false);

        params.set_suppress_blank(true);
        params.set_suppress_non_speech_tokens(true);

        // 0 = transcribe the whole recording
        params.set_duration_ms(0);
        params.set_max_initial_ts(1.0);

        params
    }
}

#[async_trait::async_trait]
impl AsrEngine for WhisperAsr {
    async fn transcribe(&self, audio: Vec<f32>, user_params: AsrParams) -> Result<TranscribeResult> {
        let mut state = self.whisper_ctx.create_state()?;
        let language = user_params.language.clone();
        let mut params = self.build_params(&user_params);
        if let Some(lang) = language.as_deref() {
            params.set_language(Some(lang));
        }

        state.full(params, &audio)?;
        let num_segments = state.full_n_segments()?;

        let mut segments = Vec::new();
        let mut full_text = String::new();

        for i in 0..num_segments {
            let text = state.full_get_segment_text(i)?;
            // whisper reports timestamps in centiseconds
            let start = state.full_get_segment_t0(i)? as f64 / 100.0;
            let end = state.full_get_segment_t1(i)? as f64 / 100.0;

            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }

            segments.push(TranscribeSegment {
                text: trimmed.to_string(),
                start,
                end,
            });

            if !full_text.is_empty() {
                full_text.push('\n');
            }
            full_text.push_str(trimmed);
        }

        Ok(TranscribeResult {
            segments,
            full_text,
        })
    }
}
