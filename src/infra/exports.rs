//! Filesystem-backed storage for generated export files.
//!
//! Each stored export gets a random identifier, lives on disk under the
//! configured root, and is tracked in an in-memory record table. Exports are
//! short-lived: the sweep job removes anything older than the configured
//! retention window, and a process restart forgets all records by design.

use std::path::PathBuf;

use bytes::Bytes;
use dashmap::DashMap;
use metrics::gauge;
use sha2::{Digest, Sha256};
use slug::slugify;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    domain::document::{DocumentTitle, ExportFormat},
    util::bytes::format_bytes,
};

const METRIC_EXPORT_STORE_ENTRIES: &str = "torchio_export_store_entries";

#[derive(Debug, Error)]
pub enum ExportStoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("export not found")]
    NotFound,
}

/// Metadata describing a stored export.
#[derive(Debug, Clone)]
pub struct ExportRecord {
    pub id: Uuid,
    pub filename: String,
    pub format: ExportFormat,
    pub size_bytes: u64,
    pub checksum: String,
    pub created_at: OffsetDateTime,
}

impl ExportRecord {
    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Result of a retention sweep.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub removed: usize,
    pub reclaimed_bytes: u64,
}

/// Stores export payloads on disk and tracks their metadata in memory.
#[derive(Debug)]
pub struct ExportStore {
    root: PathBuf,
    records: DashMap<Uuid, ExportRecord>,
}

impl ExportStore {
    /// Initialise storage rooted at the provided directory, creating it if
    /// necessary.
    ///
    /// Records are tracked in-process only, so files left behind by a
    /// previous run are unreachable and would dodge the sweep. They are
    /// removed here.
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;
        let mut stale = 0usize;
        for entry in std::fs::read_dir(&root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                std::fs::remove_file(entry.path())?;
                stale += 1;
            }
        }
        if stale > 0 {
            info!(
                target = "infra::exports",
                removed = stale,
                root = %root.display(),
                "Cleared stale exports from a previous run"
            );
        }
        Ok(Self {
            root,
            records: DashMap::new(),
        })
    }

    /// Persist an export payload and return the record describing it.
    pub async fn store(
        &self,
        title: &DocumentTitle,
        format: ExportFormat,
        data: Bytes,
    ) -> Result<ExportRecord, ExportStoreError> {
        let id = Uuid::new_v4();
        let disk_path = self.disk_path(id, format);

        fs::write(&disk_path, &data).await?;

        let record = ExportRecord {
            id,
            filename: download_filename(title, format),
            format,
            size_bytes: data.len() as u64,
            checksum: hash_bytes(&data),
            created_at: OffsetDateTime::now_utc(),
        };
        self.records.insert(id, record.clone());
        gauge!(METRIC_EXPORT_STORE_ENTRIES).set(self.records.len() as f64);

        info!(
            target = "infra::exports",
            op = "exports::store",
            export_id = %id,
            format = format.as_str(),
            size = %format_bytes(record.size_bytes),
            filename = %record.filename,
            "Export stored"
        );

        Ok(record)
    }

    /// Read a stored export back into memory along with its record.
    ///
    /// A record whose file has vanished from disk is evicted and reported as
    /// not found, so repeated requests converge on the same answer.
    pub async fn open(&self, id: Uuid) -> Result<(ExportRecord, Bytes), ExportStoreError> {
        let record = self
            .records
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(ExportStoreError::NotFound)?;

        let disk_path = self.disk_path(id, record.format);
        match fs::read(&disk_path).await {
            Ok(data) => Ok((record, Bytes::from(data))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    target = "infra::exports",
                    op = "exports::open",
                    export_id = %id,
                    "Export file missing on disk; evicting record"
                );
                self.records.remove(&id);
                gauge!(METRIC_EXPORT_STORE_ENTRIES).set(self.records.len() as f64);
                Err(ExportStoreError::NotFound)
            }
            Err(err) => Err(ExportStoreError::Io(err)),
        }
    }

    /// Remove a stored export. Missing files are treated as success.
    pub async fn remove(&self, id: Uuid) -> Result<(), ExportStoreError> {
        let Some((_, record)) = self.records.remove(&id) else {
            return Ok(());
        };
        gauge!(METRIC_EXPORT_STORE_ENTRIES).set(self.records.len() as f64);

        let disk_path = self.disk_path(id, record.format);
        match fs::remove_file(&disk_path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ExportStoreError::Io(err)),
        }
    }

    /// Remove every export created before `cutoff`, continuing past
    /// individual deletion failures.
    pub async fn sweep_older_than(&self, cutoff: OffsetDateTime) -> SweepOutcome {
        let expired: Vec<Uuid> = self
            .records
            .iter()
            .filter(|entry| entry.created_at < cutoff)
            .map(|entry| *entry.key())
            .collect();

        let mut outcome = SweepOutcome::default();
        for id in expired {
            let Some((_, record)) = self.records.remove(&id) else {
                continue;
            };
            let disk_path = self.disk_path(id, record.format);
            if let Err(err) = fs::remove_file(&disk_path).await
                && err.kind() != std::io::ErrorKind::NotFound
            {
                warn!(
                    target = "infra::exports",
                    op = "exports::sweep",
                    export_id = %id,
                    error = %err,
                    "Failed to delete expired export file"
                );
            }
            outcome.removed += 1;
            outcome.reclaimed_bytes += record.size_bytes;
        }

        gauge!(METRIC_EXPORT_STORE_ENTRIES).set(self.records.len() as f64);
        outcome
    }

    /// Confirm the storage root still exists and is a directory.
    pub async fn verify_root(&self) -> Result<(), std::io::Error> {
        let metadata = fs::metadata(&self.root).await?;
        if !metadata.is_dir() {
            return Err(std::io::Error::other("export root is not a directory"));
        }
        Ok(())
    }

    fn disk_path(&self, id: Uuid, format: ExportFormat) -> PathBuf {
        self.root.join(format!("{id}.{}", format.extension()))
    }
}

/// Filename offered to the browser in Content-Disposition.
fn download_filename(title: &DocumentTitle, format: ExportFormat) -> String {
    let mut base = slugify(title.as_str());
    if base.is_empty() {
        base = "document".to_string();
    }
    format!("{base}.{}", format.extension())
}

fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ExportStore {
        ExportStore::new(dir.path().to_path_buf()).expect("store init")
    }

    #[tokio::test]
    async fn stores_and_reopens_exports() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);

        let title = DocumentTitle::new("Launch Plan");
        let record = store
            .store(&title, ExportFormat::Docx, Bytes::from_static(b"PK\x03\x04data"))
            .await
            .expect("store succeeds");

        assert_eq!(record.filename, "launch-plan.docx");
        assert_eq!(record.size_bytes, 8);
        assert_eq!(
            record.media_type(),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );

        let (reopened, data) = store.open(record.id).await.expect("open succeeds");
        assert_eq!(reopened.checksum, record.checksum);
        assert_eq!(data.as_ref(), b"PK\x03\x04data");
    }

    #[tokio::test]
    async fn boot_clears_files_from_a_previous_run() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("11111111-2222-3333-4444-555555555555.pdf"), b"%PDF")
            .expect("plant stale file");

        let _store = store_in(&dir);

        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);

        let err = store.open(Uuid::new_v4()).await.expect_err("expected miss");
        assert!(matches!(err, ExportStoreError::NotFound));
    }

    #[tokio::test]
    async fn missing_files_evict_their_records() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);

        let record = store
            .store(
                &DocumentTitle::default(),
                ExportFormat::Pdf,
                Bytes::from_static(b"%PDF-1.4"),
            )
            .await
            .expect("store succeeds");

        std::fs::remove_file(dir.path().join(format!("{}.pdf", record.id)))
            .expect("delete backing file");

        let err = store.open(record.id).await.expect_err("expected miss");
        assert!(matches!(err, ExportStoreError::NotFound));
        let err = store.open(record.id).await.expect_err("still missing");
        assert!(matches!(err, ExportStoreError::NotFound));
    }

    #[tokio::test]
    async fn sweep_honours_the_cutoff() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);

        let title = DocumentTitle::new("Notes");
        store
            .store(&title, ExportFormat::Pdf, Bytes::from_static(b"%PDF-1.4 a"))
            .await
            .expect("store pdf");
        store
            .store(&title, ExportFormat::Docx, Bytes::from_static(b"PK\x03\x04"))
            .await
            .expect("store docx");

        let before_everything = OffsetDateTime::now_utc() - time::Duration::hours(1);
        let outcome = store.sweep_older_than(before_everything).await;
        assert_eq!(outcome.removed, 0);
        assert_eq!(outcome.reclaimed_bytes, 0);

        let after_everything = OffsetDateTime::now_utc() + time::Duration::seconds(1);
        let outcome = store.sweep_older_than(after_everything).await;
        assert_eq!(outcome.removed, 2);
        assert_eq!(outcome.reclaimed_bytes, 14);
        assert_eq!(std::fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[tokio::test]
    async fn remove_tolerates_missing_files() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);

        let record = store
            .store(
                &DocumentTitle::default(),
                ExportFormat::Html,
                Bytes::from_static(b"<html></html>"),
            )
            .await
            .expect("store succeeds");

        std::fs::remove_file(dir.path().join(format!("{}.html", record.id)))
            .expect("delete backing file");

        store.remove(record.id).await.expect("remove is tolerant");
        store.remove(record.id).await.expect("second remove too");
    }
}
