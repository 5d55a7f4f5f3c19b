use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::{STATE_PATH, WORK_DIR};

const DEFAULT_DRIVE_ROOT: &str = "./drive";
const DEFAULT_SOURCE_FOLDER: &str = "recordings";
const DEFAULT_DEST_FOLDER: &str = "minutes";
const DEFAULT_WHISPER_MODEL: &str = "./models/ggml-large-v3.bin";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_MAX_ITEMS: i64 = 0; // 0 = unlimited
const DEFAULT_PACING_SECS: i64 = 10;
const DEFAULT_MAX_RETRIES: i64 = 3;
const DEFAULT_INITIAL_RETRY_WAIT_SECS: i64 = 60;
const DEFAULT_MAX_CONSECUTIVE_FAILURES: i64 = 3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY must be set when MINUTES_SUMMARIZE is enabled")]
    MissingApiKey,
}

/// Runtime configuration, resolved from the environment (plus `.env`)
/// once at startup. Invalid numeric values fall back to defaults with a
/// warning; a missing credential for an enabled feature is fatal.
#[derive(Debug, Clone)]
pub struct Config {
    pub drive_root: PathBuf,
    pub source_folder: String,
    pub dest_folder: String,
    pub state_path: PathBuf,
    pub work_dir: PathBuf,

    pub max_items_per_run: usize,
    pub pacing: Duration,
    pub max_retries: u32,
    pub initial_retry_wait: Duration,
    pub max_consecutive_failures: u32,

    pub language: Option<String>,
    pub whisper_model: String,

    pub summarize: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let summarize = env_bool("MINUTES_SUMMARIZE", false);
        let gemini_api_key = env_opt("GEMINI_API_KEY");
        if summarize && gemini_api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        let max_items = non_negative(
            env_i64("MINUTES_MAX_ITEMS", DEFAULT_MAX_ITEMS),
            DEFAULT_MAX_ITEMS,
            "MINUTES_MAX_ITEMS",
        );
        let pacing_secs = non_negative(
            env_i64("MINUTES_PACING_SECS", DEFAULT_PACING_SECS),
            DEFAULT_PACING_SECS,
            "MINUTES_PACING_SECS",
        );
        let max_retries = non_negative(
            env_i64("MINUTES_MAX_RETRIES", DEFAULT_MAX_RETRIES),
            DEFAULT_MAX_RETRIES,
            "MINUTES_MAX_RETRIES",
        );
        let initial_wait = non_negative(
            env_i64(
                "MINUTES_INITIAL_RETRY_WAIT_SECS",
                DEFAULT_INITIAL_RETRY_WAIT_SECS,
            ),
            DEFAULT_INITIAL_RETRY_WAIT_SECS,
            "MINUTES_INITIAL_RETRY_WAIT_SECS",
        );
        let max_consecutive = non_negative(
            env_i64(
                "MINUTES_MAX_CONSECUTIVE_FAILURES",
                DEFAULT_MAX_CONSECUTIVE_FAILURES,
            ),
            DEFAULT_MAX_CONSECUTIVE_FAILURES,
            "MINUTES_MAX_CONSECUTIVE_FAILURES",
        );

        Ok(Self {
            drive_root: PathBuf::from(env_str("MINUTES_DRIVE_ROOT", DEFAULT_DRIVE_ROOT)),
            source_folder: env_str("MINUTES_SOURCE_FOLDER", DEFAULT_SOURCE_FOLDER),
            dest_folder: env_str("MINUTES_DEST_FOLDER", DEFAULT_DEST_FOLDER),
            state_path: PathBuf::from(STATE_PATH.as_str()),
            work_dir: PathBuf::from(WORK_DIR.as_str()),

            max_items_per_run: max_items as usize,
            pacing: Duration::from_secs(pacing_secs as u64),
            max_retries: max_retries as u32,
            initial_retry_wait: Duration::from_secs(initial_wait as u64),
            max_consecutive_failures: max_consecutive as u32,

            language: env_opt("MINUTES_LANGUAGE"),
            whisper_model: env_str("MINUTES_WHISPER_MODEL", DEFAULT_WHISPER_MODEL),

            summarize,
            gemini_api_key,
            gemini_model: env_str("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        })
    }
}

/// String getter: empty or unset falls back to the default.
fn env_str(name: &str, default: &str) -> String {
    match env::var(name) {
        Ok(value) => {
            let value = value.trim().to_string();
            if value.is_empty() {
                default.to_string()
            } else {
                value
            }
        }
        Err(_) => default.to_string(),
    }
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Integer getter: unparsable values fall back to the default with a warning.
fn env_i64(name: &str, default: i64) -> i64 {
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(_) => return default,
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return default;
    }
    match raw.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            warn!(
                "{} value '{}' is not an integer, using default {}",
                name, raw, default
            );
            default
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(raw) => matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

/// Settings that must not be negative fall back to the default with a warning.
fn non_negative(value: i64, default: i64, name: &str) -> i64 {
    if value < 0 {
        warn!(
            "{} value {} is negative, using default {}",
            name, value, default
        );
        return default;
    }
    value
}
