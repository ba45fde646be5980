//! Hot-cache data store backend.

use crate::client::api::ApiSession;
use crate::client::transcript::Transcript;
use crate::client::{Client, credential};
use crate::config::{Parameters, Selection};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

/// Name prefixes of datasets hosted on the store's own fast storage.
///
/// Everything else is staged from the tape archive behind it and gets the
/// serialized budget.
const HOSTED_DATASET_PREFIXES: &[&str] = &["reanalysis-era"];

/// Per-credential budget the service grants for hosted datasets
const HOSTED_WORKERS: usize = 3;

/// Client for the hot-cache data store.
pub struct CacheClient {
    session: ApiSession,
}

impl CacheClient {
    /// Build a client from the config's credentials, falling back to the
    /// `CACHE_API_URL` / `CACHE_API_KEY` environment variables.
    pub fn new(parameters: &Parameters) -> Result<Self> {
        let url = credential(parameters.api_url.as_ref(), "CACHE_API_URL").ok_or_else(|| {
            Error::config("cache backend requires api_url (or CACHE_API_URL)", "api_url")
        })?;
        let key = credential(parameters.api_key.as_ref(), "CACHE_API_KEY").ok_or_else(|| {
            Error::config("cache backend requires api_key (or CACHE_API_KEY)", "api_key")
        })?;
        Ok(Self {
            session: ApiSession::new(&url, key, None)?,
        })
    }
}

#[async_trait]
impl Client for CacheClient {
    async fn retrieve(
        &self,
        dataset: &str,
        selection: &Selection,
        output: &Path,
        transcript: &Transcript,
    ) -> Result<()> {
        self.session
            .retrieve(dataset, selection, output, transcript)
            .await
    }

    fn num_workers_per_key(&self, dataset: &str) -> usize {
        if HOSTED_DATASET_PREFIXES
            .iter()
            .any(|prefix| dataset.starts_with(prefix))
        {
            HOSTED_WORKERS
        } else {
            1
        }
    }
}
