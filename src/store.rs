//! Durable storage collaborator and the write stage.
//!
//! [`ObjectStore`] is the seam to whatever holds the retrieved artifacts —
//! an object store in production, a local directory in tests. The write
//! stage is deliberately thin: skip sentinels, write everything else, and
//! let store failures surface to the caller's failure policy.

use crate::error::{Error, Result};
use crate::fetch::RetrievalResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Durable object-store write primitive
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `payload` in full at `target`, replacing any existing object.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write; the write stage
    /// propagates it unrecovered.
    async fn put(&self, target: &str, payload: &[u8]) -> Result<()>;
}

/// Local-filesystem store rooted at a directory.
///
/// Targets are interpreted relative to the root; parent directories are
/// created as needed.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, target: &str) -> PathBuf {
        self.root.join(target)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn put(&self, target: &str, payload: &[u8]) -> Result<()> {
        let path = self.resolve(target);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Store(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| Error::Store(format!("cannot write {}: {e}", path.display())))?;
        Ok(())
    }
}

/// Write stage: persist one retrieval result.
///
/// The failure sentinel returns immediately with zero I/O — a failed
/// partition leaves no artifact at its target path. Store errors propagate.
///
/// # Errors
///
/// Whatever the store's `put` returns.
pub async fn write_result(store: &dyn ObjectStore, result: &RetrievalResult) -> Result<()> {
    if result.is_failure() {
        return Ok(());
    }
    tracing::debug!(path = %result.target, bytes = result.payload.len(), "writing artifact");
    store.put(&result.target, &result.payload).await
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that records how often it is asked to write
    #[derive(Default)]
    struct CountingStore {
        puts: AtomicUsize,
    }

    #[async_trait]
    impl ObjectStore for CountingStore {
        async fn put(&self, _target: &str, _payload: &[u8]) -> Result<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Store that rejects every write
    struct FullStore;

    #[async_trait]
    impl ObjectStore for FullStore {
        async fn put(&self, target: &str, _payload: &[u8]) -> Result<()> {
            Err(Error::Store(format!("no space left for {target}")))
        }
    }

    #[tokio::test]
    async fn test_sentinel_performs_zero_store_operations() {
        let store = CountingStore::default();

        write_result(&store, &RetrievalResult::failure())
            .await
            .unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_result_is_written_once() {
        let store = CountingStore::default();
        let result = RetrievalResult::fetched("out/2020/01.nc", b"grib-bytes".to_vec());

        write_result(&store, &result).await.unwrap();

        assert_eq!(store.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_errors_propagate_unrecovered() {
        let result = RetrievalResult::fetched("out/2020/01.nc", b"grib-bytes".to_vec());

        match write_result(&FullStore, &result).await {
            Err(Error::Store(message)) => {
                assert!(message.contains("out/2020/01.nc"), "got: {message}")
            }
            other => panic!("expected Store error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fs_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.put("deep/nested/target.nc", b"payload").await.unwrap();

        let written = std::fs::read(dir.path().join("deep/nested/target.nc")).unwrap();
        assert_eq!(written, b"payload");
    }

    #[tokio::test]
    async fn test_fs_store_replaces_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.put("target.nc", b"old").await.unwrap();
        store.put("target.nc", b"new").await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("target.nc")).unwrap(), b"new");
    }
}
