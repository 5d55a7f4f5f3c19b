use std::collections::HashMap;
use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Durable outcome map, keyed by item id. Written wholesale after every
/// item transition; entries are only ever added or replaced.
pub type ProcessedMap = HashMap<String, ProcessedRecord>;

/// Last-known outcome of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessedStatus {
    Success,
    AlreadyExists,
    Error(String),
}

impl ProcessedStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl Display for ProcessedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

impl From<&str> for ProcessedStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "already_exists" => Self::AlreadyExists,
            _ => {
                if let Some(rest) = raw.strip_prefix("error") {
                    Self::Error(rest.trim_start_matches(':').trim().to_string())
                } else {
                    // an unrecognized status keeps the item eligible for
                    // reprocessing instead of silently skipping it
                    Self::Error(format!("unrecognized status: {}", raw))
                }
            }
        }
    }
}

impl Serialize for ProcessedStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ProcessedStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.as_str().into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub name: String,
    pub doc_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub status: ProcessedStatus,
}

impl ProcessedRecord {
    pub fn success(name: &str, doc_title: &str, doc_id: &str) -> Self {
        Self {
            name: name.to_string(),
            doc_title: doc_title.to_string(),
            doc_id: Some(doc_id.to_string()),
            processed_at: Utc::now(),
            status: ProcessedStatus::Success,
        }
    }

    pub fn already_exists(name: &str, doc_title: &str) -> Self {
        Self {
            name: name.to_string(),
            doc_title: doc_title.to_string(),
            doc_id: None,
            processed_at: Utc::now(),
            status: ProcessedStatus::AlreadyExists,
        }
    }

    pub fn error(name: &str, doc_title: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            doc_title: doc_title.to_string(),
            doc_id: None,
            processed_at: Utc::now(),
            status: ProcessedStatus::Error(message.to_string()),
        }
    }
}

/// Outcome of one orchestrator invocation.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Items selected for processing this run (after the cap).
    pub planned: usize,
    /// Items pushed past the per-run cap to a later run.
    pub deferred: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when the consecutive-failure breaker stopped the run early.
    pub aborted: bool,
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded, self.failed)?;
        if self.aborted {
            write!(f, " (run aborted)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_strings_round_trip() {
        for status in [
            ProcessedStatus::Success,
            ProcessedStatus::AlreadyExists,
            ProcessedStatus::Error("quota exceeded".to_string()),
        ] {
            let wire = status.to_string();
            assert_eq!(ProcessedStatus::from(wire.as_str()), status);
        }
    }

    #[test]
    fn legacy_error_strings_parse() {
        assert_eq!(
            ProcessedStatus::from("error:boom"),
            ProcessedStatus::Error("boom".to_string())
        );
        assert!(ProcessedStatus::from("error").is_error());
    }

    #[test]
    fn unrecognized_status_is_treated_as_an_error() {
        let status = ProcessedStatus::from("pending");
        assert!(status.is_error());
    }

    #[test]
    fn record_serializes_with_wire_status() {
        let record = ProcessedRecord::error("standup.mp4", "Meeting Notes - standup", "boom");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "error: boom");
        assert!(json.get("doc_id").is_none());

        let back: ProcessedRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
