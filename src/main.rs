#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use minutes_rs::asr::whisper::WhisperAsr;
use minutes_rs::asr::AsrEngine;
use minutes_rs::batch::{BatchConfig, BatchOrchestrator};
use minutes_rs::catalog::{Catalog, LocalCatalog};
use minutes_rs::config::Config;
use minutes_rs::notes::{GeminiNotes, NotesEngine};
use minutes_rs::processor::MeetingProcessor;
use minutes_rs::retry::RetryPolicy;
use minutes_rs::storage::state::JsonStateStore;
use minutes_rs::utils::logger;

/// Batch-convert meeting recordings into transcript/minutes documents.
#[derive(Parser, Debug)]
#[command(name = "minutes", version)]
struct Cli {
    /// List the recordings that would be processed, without doing any work.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    minutes_rs::init_env();
    let _guard = logger::init("./logs".to_string())?;

    let cli = Cli::parse();

    // a missing credential or broken setting must fail before any work
    let config = Config::load()?;

    info!("Starting minutes batch run...");

    let catalog: Arc<dyn Catalog> = Arc::new(LocalCatalog::new(config.drive_root.clone()));
    let store = Arc::new(JsonStateStore::new(config.state_path.clone()));

    let batch_config = BatchConfig {
        source_folder: config.source_folder.clone(),
        dest_folder: config.dest_folder.clone(),
        max_items_per_run: config.max_items_per_run,
        pacing: config.pacing,
        max_consecutive_failures: config.max_consecutive_failures,
    };

    let mut orchestrator = BatchOrchestrator::new(catalog.clone(), store, batch_config);

    if !cli.dry_run {
        // the model handle lives for exactly this run; dry runs never load it
        info!("Loading Whisper model: {}", config.whisper_model);
        let asr: Arc<dyn AsrEngine> = Arc::new(WhisperAsr::new(config.whisper_model.clone())?);

        let notes: Option<Arc<dyn NotesEngine>> = match (config.summarize, &config.gemini_api_key) {
            (true, Some(api_key)) => {
                info!("Minutes generation enabled (model: {})", config.gemini_model);
                Some(Arc::new(GeminiNotes::new(
                    api_key.clone(),
                    config.gemini_model.clone(),
                    RetryPolicy::new(config.max_retries, config.initial_retry_wait),
                )))
            }
            _ => None,
        };

        let destination = catalog.resolve_destination(&config.dest_folder).await?;
        let processor = Arc::new(MeetingProcessor::new(
            catalog.clone(),
            asr,
            notes,
            destination,
            config.work_dir.clone(),
            config.language.clone(),
        ));
        orchestrator = orchestrator.with_processor(processor);
    }

    let summary = orchestrator.run(cli.dry_run).await?;

    if summary.aborted {
        error!("Run aborted after consecutive failures: {}", summary);
    } else {
        info!("Batch run finished: {}", summary);
    }

    Ok(())
}
