pub mod orchestrator;
pub mod plan;
pub mod types;

pub use orchestrator::{BatchConfig, BatchOrchestrator};
pub use types::{ProcessedMap, ProcessedRecord, ProcessedStatus, RunSummary};
