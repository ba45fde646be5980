//! Retrieval transcript sink.
//!
//! Archival services narrate long-running requests (queue position, state
//! changes) through their transport layer. Instead of capturing a global
//! output stream, each retrieval gets an explicit [`Transcript`] value: the
//! transport reports lines to it, and the sink forwards them to the
//! structured log, tagged with the retrieval's prefix. Two sentinel lines
//! feed the run counters so operators can watch the remote queue state.

use crate::metrics::Counters;
use std::sync::Arc;

/// Transcript line emitted when the remote service starts working a request
pub const ACTIVE_MARKER: &str = "Request is active";

/// Transcript line emitted when a retrieval has fully completed
pub const DONE_MARKER: &str = "Done.";

/// Log sink for one retrieval's transport transcript
#[derive(Clone)]
pub struct Transcript {
    prefix: String,
    counters: Arc<Counters>,
}

impl Transcript {
    /// Create a sink that tags lines with `prefix` (typically the target
    /// path) and counts sentinel markers into `counters`.
    pub fn new(prefix: impl Into<String>, counters: Arc<Counters>) -> Self {
        Self {
            prefix: prefix.into(),
            counters,
        }
    }

    /// Report one transcript line.
    ///
    /// Blank lines are dropped. The active and done markers each increment
    /// their dedicated monotonic counter.
    pub fn line(&self, message: &str) {
        let message = message.trim_end();
        if message.trim().is_empty() {
            return;
        }

        if self.prefix.is_empty() {
            tracing::info!("{message}");
        } else {
            tracing::info!("{} - {}", self.prefix, message);
        }

        if message == ACTIVE_MARKER {
            self.counters.requests_active.inc();
        } else if message == DONE_MARKER {
            self.counters.requests_complete.inc();
        }
    }
}
