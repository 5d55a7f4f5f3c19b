use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use super::types::{ProcessedMap, ProcessedRecord};
use crate::catalog::Item;

/// Derive the output document title from a recording file name.
pub fn doc_title(item_name: &str) -> String {
    let stem = Path::new(item_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(item_name);
    format!("Meeting Notes - {}", stem)
}

/// The ordered, capped work set for one run.
#[derive(Debug)]
pub struct Plan {
    pub work: Vec<Item>,
    /// Items pushed past the per-run cap.
    pub deferred: usize,
    /// `already_exists` records added to the map during filtering.
    pub newly_marked: usize,
}

/// Filter candidates against prior outcomes and existing artifacts, then
/// cap the result preserving catalog order.
///
/// Items with an `error` record are always re-included; items whose
/// derived title already exists at the destination are marked
/// `already_exists` in `records` without ever being processed.
pub fn build_plan(
    items: Vec<Item>,
    records: &mut ProcessedMap,
    existing_artifacts: &HashSet<String>,
    max_items_per_run: usize,
) -> Plan {
    let mut work = Vec::new();
    let mut newly_marked = 0;

    for item in items {
        let title = doc_title(&item.name);

        if let Some(record) = records.get(&item.id) {
            if record.status.is_error() {
                info!("Reprocessing (previous error): {}", item.name);
                work.push(item);
            } else {
                info!("Skipping (already processed): {}", item.name);
            }
            continue;
        }

        if existing_artifacts.contains(&title) {
            info!("Skipping (document exists): {}", item.name);
            records.insert(
                item.id.clone(),
                ProcessedRecord::already_exists(&item.name, &title),
            );
            newly_marked += 1;
            continue;
        }

        work.push(item);
    }

    // 0 = unlimited
    let deferred = if max_items_per_run > 0 && work.len() > max_items_per_run {
        let deferred = work.len() - max_items_per_run;
        work.truncate(max_items_per_run);
        deferred
    } else {
        0
    };

    Plan {
        work,
        deferred,
        newly_marked,
    }
}
