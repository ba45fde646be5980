//! Pluggable retrieval backends for archival services.
//!
//! Every backend implements the [`Client`] trait: one blocking retrieval at
//! a time plus static per-credential admission-control metadata. Dispatch is
//! by the explicit [`ClientKind`] backend identifier carried in the config,
//! not by inspecting the dataset.

mod api;
mod archive;
mod cache;
mod stub;
mod transcript;

pub use archive::ArchiveClient;
pub use cache::CacheClient;
pub use stub::StubClient;
pub use transcript::{ACTIVE_MARKER, DONE_MARKER, Transcript};

use crate::config::{Parameters, Selection};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Retrieval interface over heterogeneous archival backends
#[async_trait]
pub trait Client: Send + Sync {
    /// Perform one retrieval from the addressed service and write the full
    /// response body to `output`.
    ///
    /// The call blocks (awaits end to end) for the duration of the
    /// retrieval; there is no multiplexing of requests inside one call.
    /// Remote transcript lines are reported through `transcript`.
    ///
    /// # Errors
    ///
    /// Returns an error on any transport or remote-service failure. The
    /// caller decides how to recover; the fetch stage converts this into
    /// the failure sentinel.
    async fn retrieve(
        &self,
        dataset: &str,
        selection: &Selection,
        output: &Path,
        transcript: &Transcript,
    ) -> Result<()>;

    /// Maximum concurrent in-flight retrievals permitted per credential for
    /// `dataset`.
    ///
    /// This reflects a hard limit on the remote side; exceeding it makes the
    /// service reject or queue work. The value is advisory scheduling
    /// metadata — the client does not enforce it, the orchestrator does.
    /// Pure, deterministic, and always at least 1.
    fn num_workers_per_key(&self, dataset: &str) -> usize;
}

/// Backend identifier selecting which [`Client`] serves a dataset
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// Tape-backed archival service (retrievals serialized per credential)
    #[default]
    Archive,
    /// Hot-cache data store (higher concurrency for hosted datasets)
    Cache,
    /// Offline stub that records the request instead of downloading
    Stub,
}

impl ClientKind {
    /// Build the backend this identifier names, scoped to the dataset's
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if required credentials are missing
    /// after environment fallback, or the endpoint URL is invalid.
    pub fn build(self, parameters: &Parameters) -> Result<Box<dyn Client>> {
        match self {
            ClientKind::Archive => Ok(Box::new(ArchiveClient::new(parameters)?)),
            ClientKind::Cache => Ok(Box::new(CacheClient::new(parameters)?)),
            ClientKind::Stub => Ok(Box::new(StubClient)),
        }
    }
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ClientKind::Archive => "archive",
            ClientKind::Cache => "cache",
            ClientKind::Stub => "stub",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for ClientKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "archive" => Ok(ClientKind::Archive),
            "cache" => Ok(ClientKind::Cache),
            "stub" => Ok(ClientKind::Stub),
            other => Err(Error::config(
                format!("unknown client `{other}` (expected archive, cache, or stub)"),
                "client",
            )),
        }
    }
}

/// Resolve a credential: explicit config value first, then the backend
/// family's environment variable.
pub(crate) fn credential(explicit: Option<&String>, env_var: &str) -> Option<String> {
    explicit
        .cloned()
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()))
}
