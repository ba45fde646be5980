//! Tape-backed archival service backend.

use crate::client::api::ApiSession;
use crate::client::transcript::Transcript;
use crate::client::{Client, credential};
use crate::config::{Parameters, Selection};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

/// Client for the tape-backed archive.
///
/// Requests are staged from physical tape, so the service serializes work
/// per credential: one in-flight retrieval per key, always.
pub struct ArchiveClient {
    session: ApiSession,
}

impl ArchiveClient {
    /// Build a client from the config's credentials, falling back to the
    /// `ARCHIVE_API_URL` / `ARCHIVE_API_KEY` / `ARCHIVE_API_EMAIL`
    /// environment variables.
    pub fn new(parameters: &Parameters) -> Result<Self> {
        let url = credential(parameters.api_url.as_ref(), "ARCHIVE_API_URL").ok_or_else(|| {
            Error::config(
                "archive backend requires api_url (or ARCHIVE_API_URL)",
                "api_url",
            )
        })?;
        let key = credential(parameters.api_key.as_ref(), "ARCHIVE_API_KEY").ok_or_else(|| {
            Error::config(
                "archive backend requires api_key (or ARCHIVE_API_KEY)",
                "api_key",
            )
        })?;
        let email = credential(parameters.api_email.as_ref(), "ARCHIVE_API_EMAIL");
        Ok(Self {
            session: ApiSession::new(&url, key, email)?,
        })
    }
}

#[async_trait]
impl Client for ArchiveClient {
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

    fn num_workers_per_key(&self, _dataset: &str) -> usize {
        // Tape staging is serialized on the remote side.
        1
    }
}
