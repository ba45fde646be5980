//! Fetch stage: retrieve one partition in isolation.
//!
//! The stage resolves the partition's target path, runs one retrieval into a
//! scratch file, and turns any retrieval failure into the failure sentinel
//! instead of letting it escape — one bad partition never aborts the batch.
//! Configuration problems (bad template arity, missing credentials) are the
//! caller's errors and do propagate.

use crate::client::{Client, Transcript};
use crate::error::{Error, Result};
use crate::metrics::Counters;
use crate::partition::Partition;
use std::path::Path;
use std::sync::Arc;

/// Outcome of one partition's retrieval: target path and full payload.
///
/// An empty-string target is the failure sentinel; it carries no payload and
/// is never written to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetrievalResult {
    /// Durable-store path the payload belongs at; empty on failure
    pub target: String,
    /// Full retrieved bytes; empty on failure
    pub payload: Vec<u8>,
}

impl RetrievalResult {
    /// A successful retrieval
    pub fn fetched(target: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            target: target.into(),
            payload,
        }
    }

    /// The failure sentinel: skip the write, keep the batch going
    pub fn failure() -> Self {
        Self {
            target: String::new(),
            payload: Vec::new(),
        }
    }

    /// Whether this result is the failure sentinel
    pub fn is_failure(&self) -> bool {
        self.target.is_empty()
    }
}

/// Fetch one partition.
///
/// Resolves the output target from the template, builds a client scoped to
/// the dataset's credentials, and retrieves into a scratch file that is
/// removed on every exit path. Retrieval failures are logged, counted, and
/// returned as the failure sentinel.
///
/// # Errors
///
/// Returns an error only for caller mistakes surfaced before the retrieval:
/// template arity mismatch, missing credentials, or a scratch file that
/// cannot be created. Retrieval failures never propagate.
pub async fn fetch_partition(
    partition: &Partition,
    counters: &Arc<Counters>,
) -> Result<RetrievalResult> {
    let parameters = partition.parameters.as_ref();
    let values = partition.key_values()?;
    let target = fill_template(&parameters.target_template, &values)?;
    let client = parameters.client.build(parameters)?;

    let scratch = tempfile::NamedTempFile::new()?;
    let result = fetch_with(client.as_ref(), partition, &target, scratch.path(), counters).await;
    // `scratch` drops here, deleting the file on success and failure alike.
    Ok(result)
}

/// Run one retrieval against an already-built client, isolating failure.
pub(crate) async fn fetch_with(
    client: &dyn Client,
    partition: &Partition,
    target: &str,
    scratch: &Path,
    counters: &Arc<Counters>,
) -> RetrievalResult {
    let transcript = Transcript::new(target, Arc::clone(counters));
    tracing::info!(path = target, "fetching partition");

    let outcome = async {
        client
            .retrieve(
                &partition.parameters.dataset,
                &partition.selection,
                scratch,
                &transcript,
            )
            .await?;
        let payload = tokio::fs::read(scratch).await?;
        Ok::<_, Error>(payload)
    }
    .await;

    match outcome {
        Ok(payload) => {
            counters.fetch_success.inc();
            RetrievalResult::fetched(target, payload)
        }
        Err(error) => {
            tracing::error!(path = target, %error, "unable to retrieve partition");
            counters.fetch_failure.inc();
            RetrievalResult::failure()
        }
    }
}

/// Fill a positional template: each `{}` takes the next value, in order.
///
/// `{{` and `}}` escape literal braces. A placeholder count that differs
/// from the value count in either direction is a configuration error — too
/// few placeholders would silently merge distinct partitions onto one
/// target.
pub(crate) fn fill_template(template: &str, values: &[&str]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + values.len() * 8);
    let mut remaining = values.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' if chars.peek() == Some(&'}') => {
                chars.next();
                let value = remaining.next().ok_or_else(|| {
                    Error::config(
                        format!(
                            "target_template has more `{{}}` placeholders than partition keys ({})",
                            values.len()
                        ),
                        "target_template",
                    )
                })?;
                out.push_str(value);
            }
            '{' => {
                return Err(Error::config(
                    "target_template contains a stray `{` (use `{{` for a literal brace)",
                    "target_template",
                ));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(Error::config(
                    "target_template contains a stray `}` (use `}}` for a literal brace)",
                    "target_template",
                ));
            }
            c => out.push(c),
        }
    }

    if remaining.next().is_some() {
        return Err(Error::config(
            format!(
                "target_template has fewer `{{}}` placeholders than partition keys ({})",
                values.len()
            ),
            "target_template",
        ));
    }
    Ok(out)
}
