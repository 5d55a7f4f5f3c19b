use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use hound::{SampleFormat, WavReader};
use rayon::prelude::*;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, WindowFunction};
use tracing::{info, warn};

pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

const MB: f64 = 1024.0 * 1024.0;

/// Best-effort audio extraction: transcode the recording to the 16 kHz
/// mono WAV Whisper wants, next to the input file.
///
/// Returns `None` when the input is already WAV, ffmpeg is unavailable, or
/// the conversion fails; the caller proceeds with the original media.
pub fn extract_audio(media_path: &Path) -> Option<PathBuf> {
    let already_wav = media_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if already_wav {
        return None;
    }

    let wav_path = media_path.with_extension("wav");
    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(media_path)
        .args(["-vn", "-acodec", "pcm_s16le"])
        .args(["-ar", "16000", "-ac", "1", "-y"])
        .arg(&wav_path)
        .output();

    match output {
        Ok(out) if out.status.success() => {
            let media_size = std::fs::metadata(media_path).map(|m| m.len()).unwrap_or(0);
            let wav_size = std::fs::metadata(&wav_path).map(|m| m.len()).unwrap_or(0);
            info!(
                "Audio extracted: {:.1}MB -> {:.1}MB",
                media_size as f64 / MB,
                wav_size as f64 / MB
            );
            Some(wav_path)
        }
        Ok(out) => {
            warn!(
                "Audio extraction failed, continuing with original media: {}",
                String::from_utf8_lossy(&out.stderr)
            );
            None
        }
        Err(e) => {
            warn!("ffmpeg not available ({}), continuing with original media", e);
            None
        }
    }
}

/// Decode a WAV file into the mono 16 kHz sample stream Whisper expects.
pub fn load_audio(path: &Path) -> Result<Vec<f32>> {
    let (samples, num_channels, sample_rate) = read_wav_file(path)?;
    let mono_samples = convert_to_mono(&samples, num_channels);
    let normalized_samples = normalize_audio(&mono_samples);

    if sample_rate != WHISPER_SAMPLE_RATE {
        resample_audio(&normalized_samples, sample_rate)
    } else {
        Ok(normalized_samples)
    }
}

fn read_wav_file(path: &Path) -> Result<(Vec<f32>, usize, u32)> {
    let mut reader =
        WavReader::open(path).map_err(|e| anyhow::anyhow!("Failed to read WAV file: {}", e))?;

    let num_channels = reader.spec().channels as usize;
    let sample_rate = reader.spec().sample_rate;

    if reader.spec().sample_format != SampleFormat::Int {
        return Err(anyhow::anyhow!(
            "Unsupported sample format: expected integer format"
        ));
    }

    if reader.spec().bits_per_sample != 16 {
        return Err(anyhow::anyhow!(
            "Unsupported bits per sample: expected 16 bits"
        ));
    }

    let samples: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.map(|val| val as f32))
        .collect::<std::result::Result<Vec<f32>, _>>()
        .map_err(|e| anyhow::anyhow!("Failed to read samples: {}", e))?;

    Ok((samples, num_channels, sample_rate))
}

fn convert_to_mono(samples: &[f32], num_channels: usize) -> Vec<f32> {
    if num_channels <= 1 {
        return samples.to_vec();
    }
    samples
        .par_chunks(num_channels)
        .map(|chunk| chunk.iter().sum::<f32>() / num_channels as f32)
        .collect()
}

fn normalize_audio(samples: &[f32]) -> Vec<f32> {
    let max_abs = samples
        .par_iter()
        .map(|&s| s.abs())
        .max_by(|a, b| a.partial_cmp(b).unwrap())
        .unwrap_or(1.0);
    if max_abs == 0.0 {
        return samples.to_vec();
    }
    samples.par_iter().map(|&s| s / max_abs).collect()
}

fn resample_audio(samples: &[f32], original_sample_rate: u32) -> Result<Vec<f32>> {
    info!(
        "Resampling from {} Hz to {} Hz",
        original_sample_rate, WHISPER_SAMPLE_RATE
    );

    let params = SincInterpolationParameters {
        sinc_len: 512,
        f_cutoff: 0.98,
        interpolation: rubato::SincInterpolationType::Cubic,
        oversampling_factor: 512,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        WHISPER_SAMPLE_RATE as f64 / original_sample_rate as f64,
        2.0,
        params,
        samples.len(),
        1,
    )?;

    let resampled = resampler.process(&[samples.to_vec()], None)?;
    Ok(resampled.into_iter().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn loads_mono_16k_without_resampling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        let samples: Vec<i16> = (0..WHISPER_SAMPLE_RATE).map(|i| (i % 100) as i16).collect();
        write_wav(&path, WHISPER_SAMPLE_RATE, 1, &samples);

        let audio = load_audio(&path).unwrap();
        assert_eq!(audio.len(), WHISPER_SAMPLE_RATE as usize);
        assert!(audio.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn stereo_is_mixed_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        // interleaved L/R pairs
        let samples: Vec<i16> = vec![100, -100, 200, -200, 300, -300];
        write_wav(&path, WHISPER_SAMPLE_RATE, 2, &samples);

        let audio = load_audio(&path).unwrap();
        assert_eq!(audio.len(), 3);
        assert!(audio.iter().all(|s| s.abs() < 1e-6));
    }

    #[test]
    fn extract_audio_skips_wav_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("already.wav");
        std::fs::write(&path, b"riff").unwrap();
        assert!(extract_audio(&path).is_none());
    }
}
