//! Offline stub backend for dry runs and wiring tests.

use crate::client::Client;
use crate::client::transcript::Transcript;
use crate::config::Selection;
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Backend that records the request instead of retrieving it.
///
/// `retrieve` serializes the `(dataset, selection)` pair as JSON to the
/// output path, so the whole partition/fetch/write pipeline can be
/// exercised without network access or credentials.
pub struct StubClient;

#[async_trait]
impl Client for StubClient {
    async fn retrieve(
        &self,
        dataset: &str,
        selection: &Selection,
        output: &Path,
        _transcript: &Transcript,
    ) -> Result<()> {
        tracing::debug!(dataset, output = %output.display(), "recording stub request");

        let mut request = serde_json::Map::new();
        request.insert(dataset.to_string(), serde_json::to_value(selection)?);
        let body = serde_json::to_vec(&serde_json::Value::Object(request))?;

        tokio::fs::write(output, body).await?;
        Ok(())
    }

    fn num_workers_per_key(&self, _dataset: &str) -> usize {
        1
    }
}
