//! Incremental sync of a local directory to a bucket
//!
//! Every local file is fingerprinted and compared against the bucket's
//! remote manifest. Only files whose fingerprint differs from the stored
//! ETag (or that are absent remotely) are uploaded, so re-running a sync
//! over an unchanged tree uploads nothing.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::fingerprint::{fingerprint_file, Fingerprint};
use crate::manifest::load_manifest;
use crate::storage::StorageClient;
use crate::transfer::MultipartUploadConfig;
use crate::walker::{LocalFile, SiteWalker};

/// Content type used when the extension gives no hint
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Chunking shared by fingerprinting and upload
    pub transfer: MultipartUploadConfig,
    /// Decide and report without uploading anything
    pub dry_run: bool,
}

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Remote fingerprint matched; nothing sent
    Skipped,
    /// File was uploaded
    Uploaded,
    /// File differs but the run is a dry run
    WouldUpload,
}

/// Per-file notification emitted during a run
#[derive(Debug, Clone)]
pub struct SyncEvent<'a> {
    pub key: &'a str,
    pub size: u64,
    pub action: SyncAction,
}

/// Summary of a sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Keys uploaded (or that would be, on a dry run), in walk order
    pub uploaded: Vec<String>,
    /// Keys whose remote copy already matched
    pub skipped: Vec<String>,
    pub bytes_uploaded: u64,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn total_files(&self) -> usize {
        self.uploaded.len() + self.skipped.len()
    }
}

/// Syncs local directories into buckets through a [`StorageClient`]
pub struct SyncEngine<'a, C: StorageClient + ?Sized> {
    client: &'a C,
    options: SyncOptions,
}

impl<'a, C: StorageClient + ?Sized> SyncEngine<'a, C> {
    pub fn new(client: &'a C, options: SyncOptions) -> Self {
        Self { client, options }
    }

    /// Sync `local_root` into `bucket`
    pub async fn sync(&self, local_root: &Path, bucket: &str) -> Result<SyncReport> {
        self.sync_with(local_root, bucket, |_| {}).await
    }

    /// Sync `local_root` into `bucket`, calling `on_event` after each file.
    ///
    /// The first error aborts the run. Files uploaded before the error stay
    /// in the bucket; running the sync again completes it.
    pub async fn sync_with<F>(
        &self,
        local_root: &Path,
        bucket: &str,
        mut on_event: F,
    ) -> Result<SyncReport>
    where
        F: FnMut(&SyncEvent<'_>),
    {
        let root = resolve_root(local_root)?;
        let manifest = load_manifest(self.client, bucket).await?;

        info!(
            root = %root.display(),
            bucket,
            remote_objects = manifest.len(),
            dry_run = self.options.dry_run,
            "Starting sync"
        );

        let mut report = SyncReport {
            dry_run: self.options.dry_run,
            ..SyncReport::default()
        };

        for file in SiteWalker::new(&root) {
            let file = file?;
            let size = std::fs::metadata(&file.path)?.len();
            let fingerprint = self.fingerprint(&file).await?;

            let action = if manifest.matches(&file.key, &fingerprint) {
                debug!(key = %file.key, %fingerprint, "Unchanged, skipping");
                report.skipped.push(file.key.clone());
                SyncAction::Skipped
            } else if self.options.dry_run {
                debug!(key = %file.key, "Would upload");
                report.uploaded.push(file.key.clone());
                report.bytes_uploaded += size;
                SyncAction::WouldUpload
            } else {
                let content_type = content_type_for(&file.key);
                debug!(key = %file.key, content_type = %content_type, size, "Uploading");
                self.client
                    .upload_file(
                        bucket,
                        &file.key,
                        &file.path,
                        &content_type,
                        &self.options.transfer,
                    )
                    .await?;
                report.uploaded.push(file.key.clone());
                report.bytes_uploaded += size;
                SyncAction::Uploaded
            };

            on_event(&SyncEvent {
                key: &file.key,
                size,
                action,
            });
        }

        info!(
            uploaded = report.uploaded.len(),
            skipped = report.skipped.len(),
            bytes = report.bytes_uploaded,
            "Sync complete"
        );
        Ok(report)
    }

    async fn fingerprint(&self, file: &LocalFile) -> Result<Fingerprint> {
        let path = file.path.clone();
        let chunk_size = self.options.transfer.chunk_size();
        let fingerprint =
            tokio::task::spawn_blocking(move || fingerprint_file(&path, chunk_size)).await??;
        Ok(fingerprint)
    }
}

/// Absolute, symlink-resolved sync root; must be a directory
fn resolve_root(local_root: &Path) -> Result<PathBuf> {
    let root = local_root.canonicalize()?;
    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Not a directory: {}",
            root.display()
        )));
    }
    Ok(root)
}

/// Content type for an object key, guessed from its extension
pub fn content_type_for(key: &str) -> String {
    mime_guess::from_path(key)
        .first()
        .map(|mime| mime.to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
