//! Orchestrator: partition → fetch → write over a bounded parallel engine.
//!
//! The run owns the counter lifecycle, expands the request into partitions,
//! and drives them through the fetch and write stages concurrently with
//! `buffer_unordered` — bounded by the backend's per-credential worker
//! budget so the remote rate limit is honored. Partitions complete in no
//! particular order; each is independent.

use crate::config::Config;
use crate::error::Result;
use crate::fetch;
use crate::metrics::Counters;
use crate::partition::PartitionSet;
use crate::store::{ObjectStore, write_result};
use futures::StreamExt;
use std::sync::Arc;

/// Final accounting for one acquisition run
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct DownloadReport {
    /// Number of partitions the request expanded into
    pub partitions: usize,
    /// Partitions fetched and written
    pub succeeded: u64,
    /// Partitions whose retrieval failed (no artifact written)
    pub failed: u64,
    /// Remote requests observed entering the active state
    pub requests_active: u64,
    /// Remote requests observed completing
    pub requests_complete: u64,
}

/// Run one acquisition request to completion.
///
/// Expands the config's Cartesian fan-out, fetches every partition with at
/// most `num_workers_per_key` retrievals in flight, and persists successful
/// results to `store`. A failed retrieval is counted and skipped; it never
/// aborts the batch.
///
/// # Errors
///
/// Returns an error for configuration problems (surfaced before any
/// retrieval) and for store write failures.
pub async fn run(config: &Config, store: &dyn ObjectStore) -> Result<DownloadReport> {
    let counters = Counters::handle();
    let partitions = PartitionSet::new(config)?;
    let total = partitions.len();

    // One probe instance just for the admission-control metadata; each
    // fetch builds its own client scoped to the partition.
    let workers = config
        .parameters
        .client
        .build(&config.parameters)?
        .num_workers_per_key(&config.parameters.dataset)
        .max(1);

    tracing::info!(
        dataset = %config.parameters.dataset,
        client = %config.parameters.client,
        partitions = total,
        workers,
        "starting acquisition run"
    );

    let mut outcomes = futures::stream::iter(partitions.iter())
        .map(|partition| {
            let counters = Arc::clone(&counters);
            async move {
                let result = fetch::fetch_partition(&partition, &counters).await?;
                write_result(store, &result).await
            }
        })
        .buffer_unordered(workers);

    while let Some(outcome) = outcomes.next().await {
        outcome?;
    }
    drop(outcomes);

    let totals = counters.flush();
    Ok(DownloadReport {
        partitions: total,
        succeeded: totals.fetch_success,
        failed: totals.fetch_failure,
        requests_active: totals.requests_active,
        requests_complete: totals.requests_complete,
    })
}
