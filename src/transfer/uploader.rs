//! # Upload Runners
//!
//! Assemble a bundle (metadata rows + staged files) from a source
//! directory and ship it to the remote repository.
//!
//! The local variant only builds the bundle, for dry runs and tests. The
//! remote variant streams the bundle into a temporary file, submits it,
//! and polls the job status until the remote reports the exact success
//! triple: state `OK`, task `ingest metadata`, percent complete 100.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::errors::{TransferError, TransferResult};
use super::poll::PollPolicy;
use super::DATA_SUBDIR;
use crate::events::{EventError, Transaction, TransactionKeyValue};

/// Archive member carrying the metadata rows.
const METADATA_MEMBER: &str = "metadata.txt";

/// One metadata row shipped alongside the files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRow {
    #[serde(rename = "destinationTable")]
    pub destination_table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: Value,
}

/// One staged file: where it lives locally and how it is named in the
/// bundle. Logical names are always prefixed with the `data` subdirectory.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleFile {
    pub source: PathBuf,
    pub name: String,
    pub size: u64,
    pub mtime: SystemTime,
}

/// In-memory pairing of metadata rows and staged files, built fresh per
/// upload call and never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub metadata: Vec<MetadataRow>,
    pub files: Vec<BundleFile>,
}

impl Bundle {
    /// Assemble a bundle from a source directory plus derived metadata.
    ///
    /// A transaction whose identifier is already set is rejected: the
    /// remote assigns identifiers, so a pre-populated one is a duplicate
    /// attribute.
    pub fn assemble(
        source_dir: &Path,
        transaction: Option<&Transaction>,
        key_values: &[TransactionKeyValue],
    ) -> TransferResult<Self> {
        Ok(Self {
            metadata: assemble_metadata(transaction, key_values)?,
            files: walk_files(source_dir)?,
        })
    }

    /// Stream the bundle as a tar archive: the `metadata.txt` member
    /// first, then every staged file under its logical name.
    pub fn stream<W: Write>(&self, writer: W) -> TransferResult<()> {
        let mut builder = tar::Builder::new(writer);

        let metadata_json =
            serde_json::to_vec(&self.metadata).map_err(|e| TransferError::Serialization {
                reason: e.to_string(),
            })?;
        let mut header = tar::Header::new_gnu();
        header.set_size(metadata_json.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(unix_seconds(SystemTime::now()));
        header.set_cksum();
        builder.append_data(&mut header, METADATA_MEMBER, metadata_json.as_slice())?;

        for file in &self.files {
            let mut handle = fs::File::open(&file.source)?;
            let mut header = tar::Header::new_gnu();
            header.set_size(file.size);
            header.set_mode(0o644);
            header.set_mtime(unix_seconds(file.mtime));
            header.set_cksum();
            builder.append_data(&mut header, &file.name, &mut handle)?;
        }

        builder.into_inner()?.flush()?;
        Ok(())
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Metadata rows for the supplied transaction and key/values.
fn assemble_metadata(
    transaction: Option<&Transaction>,
    key_values: &[TransactionKeyValue],
) -> TransferResult<Vec<MetadataRow>> {
    let mut rows = Vec::new();

    if let Some(transaction) = transaction {
        if transaction.id.is_some() {
            return Err(EventError::duplicate_attribute("_id").into());
        }
        for (name, value) in transaction.set_fields() {
            rows.push(MetadataRow {
                destination_table: format!("Transactions.{name}"),
                key: None,
                value: value.clone(),
            });
        }
    }

    for key_value in key_values {
        rows.push(MetadataRow {
            destination_table: "TransactionKeyValue".to_string(),
            key: key_value.key.clone(),
            value: key_value.value.clone().unwrap_or(Value::Null),
        });
    }

    Ok(rows)
}

/// Recursively collect every regular file under `source_dir`, logical
/// names prefixed with `data/` and ordered by file name for a stable
/// bundle layout.
fn walk_files(source_dir: &Path) -> TransferResult<Vec<BundleFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| TransferError::Serialization {
                reason: format!("walk escaped source directory: {e}"),
            })?
            .to_path_buf();
        let metadata = entry.metadata().map_err(std::io::Error::from)?;
        files.push(BundleFile {
            source: entry.into_path(),
            name: format!("{DATA_SUBDIR}/{}", relative.display()),
            size: metadata.len(),
            mtime: metadata.modified()?,
        });
    }
    Ok(files)
}

/// Raw status payload of a remote ingest job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadStatus(pub serde_json::Map<String, Value>);

impl UploadStatus {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn require(&self, field: &'static str) -> TransferResult<&Value> {
        self.0
            .get(field)
            .ok_or(TransferError::MissingStatusField { field })
    }

    /// Whether the remote reports the exact success triple. A payload
    /// missing any of the three fields is a validation error; any other
    /// combination of values means "keep polling".
    pub fn is_complete(&self) -> TransferResult<bool> {
        let state = self.require("state")?;
        let task = self.require("task")?;
        let percent = self.require("task_percent")?;

        if state.as_str() != Some("OK") {
            return Ok(false);
        }
        if task.as_str() != Some("ingest metadata") {
            return Ok(false);
        }
        Ok(percent_value(percent)? == 100)
    }
}

/// Percent-complete arrives as a number or a numeric string; fractional
/// values truncate.
fn percent_value(value: &Value) -> TransferResult<i64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .map(|f| f as i64)
        .ok_or_else(|| TransferError::InvalidStatusField {
            field: "task_percent",
            value: value.to_string(),
        })
}

/// Wire client for the remote repository's upload side.
#[async_trait]
pub trait IngestClient: Send + Sync {
    /// Submit a serialized bundle; returns the ingest job id.
    async fn submit(&self, bundle_path: &Path, content_length: u64) -> TransferResult<i64>;

    /// Current status of an ingest job.
    async fn job_status(&self, job_id: i64) -> TransferResult<UploadStatus>;
}

/// Outcome of an upload call.
#[derive(Debug)]
pub struct UploadOutcome {
    pub bundle: Bundle,
    pub job_id: Option<i64>,
    pub status: UploadStatus,
}

/// Capability: ship a source directory plus derived metadata.
#[async_trait]
pub trait UploaderRunner: Send + Sync {
    async fn upload(
        &self,
        source_dir: &Path,
        transaction: Option<&Transaction>,
        key_values: &[TransactionKeyValue],
    ) -> TransferResult<UploadOutcome>;
}

/// Builds the bundle without transmitting it. Used for dry runs and
/// tests; nothing stays open since bundle entries carry paths, not
/// handles.
#[derive(Debug, Clone, Default)]
pub struct LocalUploaderRunner;

#[async_trait]
impl UploaderRunner for LocalUploaderRunner {
    async fn upload(
        &self,
        source_dir: &Path,
        transaction: Option<&Transaction>,
        key_values: &[TransactionKeyValue],
    ) -> TransferResult<UploadOutcome> {
        let bundle = Bundle::assemble(source_dir, transaction, key_values)?;
        debug!(files = bundle.files.len(), "assembled local bundle");
        Ok(UploadOutcome {
            bundle,
            job_id: None,
            status: UploadStatus::default(),
        })
    }
}

/// Streams the bundle to the remote and polls the job status until the
/// success triple appears or the poll budget runs out.
pub struct RemoteUploaderRunner {
    client: Arc<dyn IngestClient>,
    poll: PollPolicy,
}

impl RemoteUploaderRunner {
    pub fn new(client: Arc<dyn IngestClient>, poll: PollPolicy) -> Self {
        Self { client, poll }
    }

    async fn wait_for_job(&self, job_id: i64) -> TransferResult<UploadStatus> {
        for attempt in 1..=self.poll.max_attempts {
            let status = self.client.job_status(job_id).await?;
            if status.is_complete()? {
                debug!(job_id, attempt, "ingest job complete");
                return Ok(status);
            }
            if attempt < self.poll.max_attempts {
                sleep(self.poll.interval).await;
            }
        }
        Err(TransferError::Timeout {
            operation: "upload status wait",
            attempts: self.poll.max_attempts,
        })
    }
}

#[async_trait]
impl UploaderRunner for RemoteUploaderRunner {
    async fn upload(
        &self,
        source_dir: &Path,
        transaction: Option<&Transaction>,
        key_values: &[TransactionKeyValue],
    ) -> TransferResult<UploadOutcome> {
        let bundle = Bundle::assemble(source_dir, transaction, key_values)?;

        // The temp file is unlinked when `staged` drops, on every exit path.
        let staged = tempfile::NamedTempFile::new()?;
        bundle.stream(staged.as_file())?;
        let content_length = staged.as_file().metadata()?.len();

        let job_id = self.client.submit(staged.path(), content_length).await?;
        info!(job_id, content_length, "bundle submitted");

        let status = self.wait_for_job(job_id).await?;
        Ok(UploadOutcome {
            bundle,
            job_id: Some(job_id),
            status,
        })
    }
}
