//! Task-queue HTTP session shared by the real archival backends.
//!
//! Both production services follow the same request lifecycle: submit a
//! selection for a dataset, poll the queued request until the service has
//! worked it, then download the staged result. The wire format itself is the
//! service's contract; this module only walks the lifecycle and relays the
//! service's transcript into the log sink.

use crate::client::transcript::{ACTIVE_MARKER, DONE_MARKER, Transcript};
use crate::config::Selection;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Delay between request status polls
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Authenticated session against one archival service endpoint
pub(crate) struct ApiSession {
    http: reqwest::Client,
    base: Url,
    key: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Submitted {
    request_id: String,
}

#[derive(Debug, Deserialize)]
struct RequestStatus {
    state: String,
    #[serde(default)]
    message: Option<String>,
}

impl ApiSession {
    /// Create a session for `base_url`, normalizing it so endpoint paths
    /// join underneath it.
    pub(crate) fn new(base_url: &str, key: String, email: Option<String>) -> Result<Self> {
        let mut base = Url::parse(base_url).map_err(|e| {
            Error::config(format!("invalid api_url `{base_url}`: {e}"), "api_url")
        })?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            key,
            email,
        })
    }

    /// Run one full retrieval: submit, wait for completion, download the
    /// result body to `output`.
    pub(crate) async fn retrieve(
        &self,
        dataset: &str,
        selection: &Selection,
        output: &Path,
        transcript: &Transcript,
    ) -> Result<()> {
        let request_id = self.submit(dataset, selection).await?;
        tracing::debug!(dataset, request_id, "request submitted");
        self.wait(&request_id, transcript).await?;
        self.download(&request_id, output).await?;
        transcript.line(DONE_MARKER);
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base.join(path).map_err(|e| {
            Error::config(format!("invalid endpoint path `{path}`: {e}"), "api_url")
        })
    }

    async fn submit(&self, dataset: &str, selection: &Selection) -> Result<String> {
        let url = self.endpoint(&format!("resources/{dataset}"))?;
        let mut request = self.http.post(url).bearer_auth(&self.key).json(selection);
        if let Some(email) = &self.email {
            request = request.header("x-api-email", email);
        }
        let response = check_status(request.send().await?).await?;
        let submitted: Submitted = response.json().await?;
        Ok(submitted.request_id)
    }

    /// Poll until the remote request completes, relaying transcript lines.
    ///
    /// The active marker is emitted once, when the request is first observed
    /// out of the queue.
    async fn wait(&self, request_id: &str, transcript: &Transcript) -> Result<()> {
        let url = self.endpoint(&format!("requests/{request_id}"))?;
        let mut seen_active = false;
        loop {
            let response =
                check_status(self.http.get(url.clone()).bearer_auth(&self.key).send().await?)
                    .await?;
            let status: RequestStatus = response.json().await?;

            if let Some(message) = &status.message {
                transcript.line(message);
            }

            match status.state.as_str() {
                "queued" => {}
                "active" => {
                    if !seen_active {
                        seen_active = true;
                        transcript.line(ACTIVE_MARKER);
                    }
                }
                "completed" => return Ok(()),
                "failed" => {
                    let reason = status.message.unwrap_or_else(|| "no reason given".to_string());
                    return Err(Error::Retrieval(format!(
                        "remote request {request_id} failed: {reason}"
                    )));
                }
                other => {
                    return Err(Error::Retrieval(format!(
                        "remote request {request_id} reported unknown state `{other}`"
                    )));
                }
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn download(&self, request_id: &str, output: &Path) -> Result<()> {
        let url = self.endpoint(&format!("requests/{request_id}/result"))?;
        let response =
            check_status(self.http.get(url).bearer_auth(&self.key).send().await?).await?;
        let body = response.bytes().await?;
        tokio::fs::write(output, &body).await?;
        Ok(())
    }
}

/// Map a non-success HTTP status into a retrieval error carrying the body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Retrieval(format!(
        "service returned {status}: {body}"
    )))
}
