use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{error, info};
use uuid::Uuid;

use super::plan::{self, build_plan};
use super::types::{ProcessedRecord, RunSummary};
use crate::catalog::Catalog;
use crate::processor::ItemProcessor;
use crate::storage::state::StateStore;

const MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub source_folder: String,
    pub dest_folder: String,
    /// 0 = unlimited.
    pub max_items_per_run: usize,
    /// Pause between items, politeness toward rate-limited backends.
    pub pacing: Duration,
    pub max_consecutive_failures: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            source_folder: "recordings".to_string(),
            dest_folder: "minutes".to_string(),
            max_items_per_run: 0,
            pacing: Duration::from_secs(10),
            max_consecutive_failures: 3,
        }
    }
}

/// Drives one batch run: compute the work set, process items strictly in
/// order, persist the outcome map after every transition, and stop early
/// when failures become systemic.
pub struct BatchOrchestrator {
    catalog: Arc<dyn Catalog>,
    store: Arc<dyn StateStore>,
    /// Absent for dry-run wiring; a live run requires one.
    processor: Option<Arc<dyn ItemProcessor>>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn StateStore>, config: BatchConfig) -> Self {
        Self {
            catalog,
            store,
            processor: None,
            config,
        }
    }

    pub fn with_processor(mut self, processor: Arc<dyn ItemProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    pub async fn run(&self, dry_run: bool) -> Result<RunSummary> {
        let run_id = format!("run-{}", Uuid::new_v4());
        info!("[{}] Starting batch run (dry_run: {})", run_id, dry_run);

        // prior outcomes; an unreadable state file is never fatal
        let mut records = self.store.load().await;

        // catalog lookups are fatal: without them no item can be
        // enumerated safely
        let source = self
            .catalog
            .resolve_source(&self.config.source_folder)
            .await?;
        let dest = self
            .catalog
            .resolve_destination(&self.config.dest_folder)
            .await?;

        let items = self.catalog.list_items(&source).await?;
        if items.is_empty() {
            info!("No recordings found in '{}'", self.config.source_folder);
            return Ok(RunSummary::default());
        }
        let existing = self.catalog.list_artifact_names(&dest).await?;

        let plan = build_plan(
            items,
            &mut records,
            &existing,
            self.config.max_items_per_run,
        );

        if plan.work.is_empty() {
            info!("No new recordings, everything is processed.");
            if !dry_run && plan.newly_marked > 0 {
                self.store
                    .save(&records)
                    .await
                    .context("persisting processed state")?;
            }
            return Ok(RunSummary {
                deferred: plan.deferred,
                ..Default::default()
            });
        }

        if plan.deferred > 0 {
            info!(
                "Unprocessed recordings: {} (processing at most {} this run)",
                plan.work.len() + plan.deferred,
                plan.work.len()
            );
        } else {
            info!("Unprocessed recordings: {}", plan.work.len());
        }

        if dry_run {
            info!("=== Dry run: the following recordings would be processed ===");
            for item in &plan.work {
                info!("  - {} ({:.1} MB)", item.name, item.size as f64 / MB);
            }
            return Ok(RunSummary {
                planned: plan.work.len(),
                deferred: plan.deferred,
                ..Default::default()
            });
        }

        let processor = self
            .processor
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no item processor configured for a live run"))?;

        // duplicate-detection marks are part of this run's progress
        if plan.newly_marked > 0 {
            self.store
                .save(&records)
                .await
                .context("persisting processed state")?;
        }

        let total = plan.work.len();
        let mut summary = RunSummary {
            planned: total,
            deferred: plan.deferred,
            ..Default::default()
        };
        let mut consecutive_failures = 0u32;

        for (i, item) in plan.work.iter().enumerate() {
            info!(
                "[{}/{}] Processing: {} ({:.1} MB)",
                i + 1,
                total,
                item.name,
                item.size as f64 / MB
            );

            match processor.process(item).await {
                Ok(artifact) => {
                    records.insert(
                        item.id.clone(),
                        ProcessedRecord::success(&item.name, &artifact.title, &artifact.id),
                    );
                    summary.succeeded += 1;
                    consecutive_failures = 0;
                    info!("Done: {}", artifact.title);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", item.name, e);
                    records.insert(
                        item.id.clone(),
                        ProcessedRecord::error(
                            &item.name,
                            &plan::doc_title(&item.name),
                            &e.to_string(),
                        ),
                    );
                    summary.failed += 1;
                    consecutive_failures += 1;
                }
            }

            // progress must survive a crash during the next item; losing
            // it risks duplicate artifacts, so a save failure is fatal
            self.store
                .save(&records)
                .await
                .context("persisting processed state")?;

            if consecutive_failures >= self.config.max_consecutive_failures {
                error!(
                    "Aborting run after {} consecutive failures",
                    consecutive_failures
                );
                summary.aborted = true;
                break;
            }

            if i + 1 < total && !self.config.pacing.is_zero() {
                info!("Waiting {:?} before the next recording...", self.config.pacing);
                sleep(self.config.pacing).await;
            }
        }

        info!("[{}] Run complete: {}", run_id, summary);
        Ok(summary)
    }
}
