//! Source origin reading a CSV schedule file from the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;
use tokio::fs;
use tracing::{debug, info};

use bincal_core::ports::SourceError;
use bincal_core::source::{SourceBatch, SourceOrigin};

const ARCHIVE_STAMP: &str = "%Y%m%dT%H%M%S";

/// Schedule file deposited at a fixed path.
///
/// A missing file yields an empty batch. When an archive directory is set,
/// a consumed file is moved there under a timestamped name so the next
/// delivery starts from a clean slate.
#[derive(Debug, Clone)]
pub struct LocalCsvOrigin {
    path: PathBuf,
    archive_dir: Option<PathBuf>,
}

impl LocalCsvOrigin {
    /// Read batches from `path`, leaving the file in place after ingestion.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            archive_dir: None,
        }
    }

    /// Move the file into `dir` once its batch has been loaded.
    #[must_use]
    pub fn archive_to(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Location of the schedule file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn archive_path(&self, dir: &Path) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map_or_else(|| "schedule".into(), |name| name.to_string_lossy());
        let extension = self
            .path
            .extension()
            .map_or_else(|| "csv".into(), |ext| ext.to_string_lossy());
        let stamp = Local::now().format(ARCHIVE_STAMP);
        dir.join(format!("{stem}-{stamp}.{extension}"))
    }
}

#[async_trait]
impl SourceOrigin for LocalCsvOrigin {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<SourceBatch, SourceError> {
        match fs::read(&self.path).await {
            Ok(bytes) => SourceBatch::from_csv(bytes.as_slice()),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no schedule file deposited");
                Ok(SourceBatch::default())
            }
            Err(err) => Err(SourceError::Io(err)),
        }
    }

    async fn consumed(&self) -> Result<(), SourceError> {
        let Some(dir) = &self.archive_dir else {
            return Ok(());
        };
        fs::create_dir_all(dir).await?;
        let target = self.archive_path(dir);
        if fs::rename(&self.path, &target).await.is_err() {
            // Rename cannot cross filesystems.
            fs::copy(&self.path, &target).await?;
            fs::remove_file(&self.path).await?;
        }
        info!(from = %self.path.display(), to = %target.display(), "archived schedule file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs as std_fs;

    use bincal_core::ingest;
    use bincal_core::memory::MemoryStore;
    use bincal_core::model::SyncResult;

    use super::*;

    const SCHEDULE: &str = "id,collection_date,bin_type\n\
                            2023-01-23,2023-01-26,Recycling bin\n\
                            2023-01-30,2023-02-02,Food waste bin\n";

    #[tokio::test]
    async fn reads_deposited_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.csv");
        std_fs::write(&path, SCHEDULE).expect("write");

        let origin = LocalCsvOrigin::new(&path);
        assert_eq!(origin.path(), path);
        let batch = origin.fetch().await.expect("fetch");
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let origin = LocalCsvOrigin::new(dir.path().join("absent.csv"));
        let batch = origin.fetch().await.expect("fetch");
        assert!(batch.is_empty());

        let store = MemoryStore::new();
        let result = ingest::sync(&store, &batch).await.expect("sync");
        assert_eq!(result, SyncResult::NoOp);
    }

    #[tokio::test]
    async fn malformed_file_is_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.csv");
        std_fs::write(&path, "id,collection_date,bin_type\n2023-01-23\n").expect("write");

        let err = LocalCsvOrigin::new(&path).fetch().await.expect_err("ragged");
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn consumed_without_archive_leaves_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.csv");
        std_fs::write(&path, SCHEDULE).expect("write");

        LocalCsvOrigin::new(&path).consumed().await.expect("consumed");
        assert!(path.exists());
    }

    #[tokio::test]
    async fn consumed_moves_file_into_archive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("main.csv");
        let archive = dir.path().join("archive");
        std_fs::write(&path, SCHEDULE).expect("write");

        let origin = LocalCsvOrigin::new(&path).archive_to(&archive);
        origin.consumed().await.expect("consumed");

        assert!(!path.exists());
        let archived: Vec<_> = std_fs::read_dir(&archive)
            .expect("archive dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(archived.len(), 1);
        let name = archived.first().expect("one file");
        assert!(name.starts_with("main-") && name.ends_with(".csv"), "{name}");

        let batch = origin.fetch().await.expect("fetch after archive");
        assert!(batch.is_empty());
    }
}
