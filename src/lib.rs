//! # geodata-dl
//!
//! Partitioned bulk download library for rate-limited geophysical data
//! archives.
//!
//! Archival weather and climate services cap how many requests one
//! credential may have in flight, and a single logical request (a year of
//! reanalysis, say) is far too large to retrieve in one call anyway.
//! geodata-dl splits one request's selection domain into the Cartesian
//! product of single-valued sub-requests, retrieves each independently
//! under the backend's per-credential budget, and persists every successful
//! result to durable storage — one failed partition is logged and counted,
//! never fatal to the batch.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Pluggable backends** - Archive, hot-cache, and offline stub clients
//!   behind one trait
//! - **Failure isolation** - A partition fails alone; the batch keeps going
//! - **Observable** - Structured logs plus monotonic run counters
//!
//! ## Quick Start
//!
//! ```no_run
//! use geodata_dl::{Config, FsStore, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config: Config = serde_json::from_str(
//!         r#"{
//!             "parameters": {
//!                 "dataset": "reanalysis-era5-pressure-levels",
//!                 "client": "cache",
//!                 "partition_keys": ["year", "month"],
//!                 "target_template": "era5/{}/{}.nc"
//!             },
//!             "selection": {
//!                 "year": ["2020", "2021"],
//!                 "month": ["01", "02", "03"],
//!                 "variable": ["temperature"]
//!             }
//!         }"#,
//!     )?;
//!
//!     let store = FsStore::new("./downloads");
//!     let report = run(&config, &store).await?;
//!     println!("fetched {}/{} partitions", report.succeeded, report.partitions);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Retrieval backends and the client abstraction
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Fetch stage: isolated per-partition retrieval
pub mod fetch;
/// Run counters
pub mod metrics;
/// Cartesian fan-out of requests into partitions
pub mod partition;
/// Orchestration of the partition/fetch/write pipeline
pub mod pipeline;
/// Durable storage collaborator and the write stage
pub mod store;

// Re-export commonly used types
pub use client::{
    ACTIVE_MARKER, ArchiveClient, CacheClient, Client, ClientKind, DONE_MARKER, StubClient,
    Transcript,
};
pub use config::{Config, Parameters, Selection};
pub use error::{Error, Result};
pub use fetch::{RetrievalResult, fetch_partition};
pub use metrics::{Counter, CounterSnapshot, Counters};
pub use partition::{Partition, PartitionIter, PartitionSet};
pub use pipeline::{DownloadReport, run};
pub use store::{FsStore, ObjectStore, write_result};
