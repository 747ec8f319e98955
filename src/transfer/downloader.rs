//! # Download Runners
//!
//! Materialize a fileset into a destination directory and hand back lazy
//! openers for each file.
//!
//! The local variant links files out of a base directory without copying
//! bytes; the remote variant stages a cart on the repository, waits for
//! readiness under a bounded polling policy, then bulk-fetches into the
//! `data` staging subdirectory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info};

use super::errors::{TransferError, TransferResult};
use super::opener::FileOpener;
use super::poll::PollPolicy;
use super::DATA_SUBDIR;
use crate::events::File;

/// One file named in a cart request, keyed the way the remote expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartEntry {
    pub id: Option<i64>,
    pub hashsum: Option<String>,
    pub hashtype: Option<String>,
    pub path: String,
}

impl CartEntry {
    /// Build an entry from a decoded `File` record. Fails when the record
    /// has no name to derive a path from.
    pub fn for_file(file: &File) -> TransferResult<Self> {
        Ok(Self {
            id: file.id,
            hashsum: file.hashsum.clone(),
            hashtype: file.hashtype.clone(),
            path: file.path()?.to_string_lossy().into_owned(),
        })
    }
}

/// Staging state reported by the remote for a cart.
#[derive(Debug, Clone, PartialEq)]
pub enum CartState {
    Staging,
    Ready,
    Failed { reason: String },
}

/// Wire client for the remote repository's download side. Implementations
/// own authentication and transport; the runner owns the protocol.
#[async_trait]
pub trait CartClient: Send + Sync {
    /// Stage a batch of files; returns the cart identifier.
    async fn setup_cart(&self, entries: &[CartEntry]) -> TransferResult<String>;

    /// Current staging state of a cart.
    async fn cart_state(&self, cart_id: &str) -> TransferResult<CartState>;

    /// Materialize a ready cart's files under `destination`.
    async fn fetch(&self, cart_id: &str, destination: &Path) -> TransferResult<()>;
}

/// Capability: place files into a destination directory and return one
/// opener per requested file.
#[async_trait]
pub trait DownloaderRunner: Send + Sync {
    async fn download(&self, destination: &Path, files: &[File])
        -> TransferResult<Vec<FileOpener>>;
}

/// Filesystem-backed runner for testing and offline use. Links files from
/// a base directory into the destination; never copies bytes.
#[derive(Debug, Clone)]
pub struct LocalDownloaderRunner {
    base_dir: PathBuf,
}

impl LocalDownloaderRunner {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl DownloaderRunner for LocalDownloaderRunner {
    async fn download(
        &self,
        destination: &Path,
        files: &[File],
    ) -> TransferResult<Vec<FileOpener>> {
        if self.base_dir != destination {
            for file in files {
                let relative = file.path()?;
                let target = destination.join(&relative);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                link_file(&self.base_dir.join(&relative), &target)?;
            }
        }
        debug!(
            count = files.len(),
            destination = %destination.display(),
            "local download linked files"
        );
        files
            .iter()
            .map(|file| Ok(FileOpener::new(destination, file.path()?)))
            .collect()
    }
}

#[cfg(unix)]
fn link_file(original: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(original, target)
}

#[cfg(windows)]
fn link_file(original: &Path, target: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(original, target)
}

/// Runner that stages a cart on the remote repository, waits for it, then
/// bulk-fetches into `destination/data`.
pub struct RemoteDownloaderRunner {
    client: Arc<dyn CartClient>,
    poll: PollPolicy,
}

impl RemoteDownloaderRunner {
    pub fn new(client: Arc<dyn CartClient>, poll: PollPolicy) -> Self {
        Self { client, poll }
    }

    /// Probe the cart until ready, bounded by the poll policy.
    async fn wait_for_cart(&self, cart_id: &str) -> TransferResult<()> {
        for attempt in 1..=self.poll.max_attempts {
            match self.client.cart_state(cart_id).await? {
                CartState::Ready => {
                    debug!(cart_id, attempt, "cart is ready");
                    return Ok(());
                }
                CartState::Failed { reason } => {
                    return Err(TransferError::cart_failed(cart_id, reason));
                }
                CartState::Staging => {
                    if attempt < self.poll.max_attempts {
                        sleep(self.poll.interval).await;
                    }
                }
            }
        }
        Err(TransferError::Timeout {
            operation: "cart readiness wait",
            attempts: self.poll.max_attempts,
        })
    }
}

#[async_trait]
impl DownloaderRunner for RemoteDownloaderRunner {
    async fn download(
        &self,
        destination: &Path,
        files: &[File],
    ) -> TransferResult<Vec<FileOpener>> {
        let entries = files
            .iter()
            .map(CartEntry::for_file)
            .collect::<TransferResult<Vec<_>>>()?;

        let cart_id = self.client.setup_cart(&entries).await?;
        info!(cart_id, count = entries.len(), "cart staged");

        self.wait_for_cart(&cart_id).await?;

        let data_dir = destination.join(DATA_SUBDIR);
        fs::create_dir_all(&data_dir)?;
        self.client.fetch(&cart_id, &data_dir).await?;
        info!(cart_id, destination = %data_dir.display(), "cart fetched");

        files
            .iter()
            .map(|file| Ok(FileOpener::new(&data_dir, file.path()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventError;
    use std::io::Read;
    use std::io::Write;

    fn file(name: &str, subdir: Option<&str>) -> File {
        File {
            name: Some(name.to_string()),
            subdir: subdir.map(str::to_string),
            ..File::default()
        }
    }

    #[tokio::test]
    async fn local_download_links_into_fresh_directory() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();

        fs::create_dir_all(source.path().join("filepath")).unwrap();
        fs::File::create(source.path().join("filepath/filename.ext"))
            .unwrap()
            .write_all(b"Hello, world!")
            .unwrap();

        let runner = LocalDownloaderRunner::new(source.path());
        let openers = runner
            .download(destination.path(), &[file("filename.ext", Some("filepath"))])
            .await
            .unwrap();

        assert_eq!(openers.len(), 1);
        let mut contents = String::new();
        openers[0]
            .open()
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "Hello, world!");
    }

    #[tokio::test]
    async fn local_download_same_directory_is_a_no_op() {
        let source = tempfile::tempdir().unwrap();
        fs::File::create(source.path().join("file.txt"))
            .unwrap()
            .write_all(b"in place")
            .unwrap();

        let runner = LocalDownloaderRunner::new(source.path());
        let openers = runner
            .download(source.path(), &[file("file.txt", None)])
            .await
            .unwrap();

        let mut contents = String::new();
        openers[0]
            .open()
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "in place");
    }

    #[tokio::test]
    async fn nameless_file_fails_cart_entry() {
        let error = CartEntry::for_file(&File::default()).unwrap_err();
        assert!(matches!(
            error,
            TransferError::Event(EventError::MissingField { field: "name" })
        ));
    }
}
