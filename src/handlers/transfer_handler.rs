//! # Transfer Event Handler
//!
//! The principal handler: decodes the envelope's records, downloads the
//! named files into a scratch workspace, applies the configured
//! transform, and uploads the outputs together with derived metadata
//! (the transaction minus its identifier, key/values passed through).
//!
//! All collaborators are injected at construction; nothing is wired at
//! module load.

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use super::transform::FileTransform;
use super::EventHandler;
use crate::error::Result;
use crate::events::{Envelope, RecordDecoder};
use crate::transfer::{DownloaderRunner, UploaderRunner};

pub struct TransferEventHandler {
    decoder: RecordDecoder,
    downloader: Arc<dyn DownloaderRunner>,
    uploader: Arc<dyn UploaderRunner>,
    transform: Arc<dyn FileTransform>,
}

impl TransferEventHandler {
    pub fn new(
        decoder: RecordDecoder,
        downloader: Arc<dyn DownloaderRunner>,
        uploader: Arc<dyn UploaderRunner>,
        transform: Arc<dyn FileTransform>,
    ) -> Self {
        Self {
            decoder,
            downloader,
            uploader,
            transform,
        }
    }
}

#[async_trait]
impl EventHandler for TransferEventHandler {
    #[instrument(skip_all, fields(event_id = envelope.event_id.as_deref()))]
    async fn handle(&self, envelope: &Envelope) -> Result<()> {
        let files = self.decoder.files(envelope)?;
        let transaction = self.decoder.transaction(envelope)?;
        let key_values = self.decoder.key_values(envelope)?;

        // Scratch workspace, removed when the handler returns.
        let workspace = tempfile::tempdir()?;
        let input_dir = workspace.path().join("input");
        let output_dir = workspace.path().join("output");
        fs::create_dir_all(&input_dir)?;
        fs::create_dir_all(&output_dir)?;

        let openers = self.downloader.download(&input_dir, &files).await?;
        info!(files = openers.len(), "inputs materialized");

        self.transform.apply(&openers, &output_dir)?;

        let outcome = self
            .uploader
            .upload(&output_dir, Some(&transaction.without_id()), &key_values)
            .await?;
        info!(
            job_id = outcome.job_id,
            bundled = outcome.bundle.files.len(),
            "transfer complete"
        );
        Ok(())
    }
}
