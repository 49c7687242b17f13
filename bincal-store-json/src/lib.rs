//! Schedule store persisted as one JSON document on the local filesystem.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::fs;
use tokio::sync::Mutex;
use tokio::task;
use tracing::debug;

use bincal_core::model::{ScheduleRow, WeekKey};
use bincal_core::ports::{ScheduleStore, StoreError};

/// Stored document: week key to row.
type Document = BTreeMap<String, ScheduleRow>;

#[derive(Debug)]
/// Store holding every week in a single JSON object keyed by ISO week start.
///
/// A missing file is an empty store. Each batch is merged into the current
/// document, written to a temporary file in the same directory and renamed
/// over the old one, so a failed write leaves the previous document intact.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (or lazily create) the store at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the JSON document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored rows keyed by week key.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the document cannot be read or decoded.
    pub async fn load(&self) -> Result<Document, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };
        serde_json::from_slice(&bytes).map_err(|err| StoreError::Corrupt(Box::new(err)))
    }

    fn directory(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

fn commit(directory: &Path, target: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let mut staged = NamedTempFile::new_in(directory)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(target).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

#[async_trait]
impl ScheduleStore for JsonFileStore {
    async fn get(&self, week: &WeekKey) -> Result<Option<ScheduleRow>, StoreError> {
        let mut document = self.load().await?;
        match document.remove(&week.as_key()) {
            Some(row) if row.week_key != *week => Err(StoreError::Corrupt(
                format!("entry {week} holds the row for week {}", row.week_key).into(),
            )),
            found => Ok(found),
        }
    }

    async fn batch_put(&self, rows: &[ScheduleRow]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        for row in rows {
            document.insert(row.week_key.as_key(), row.clone());
        }
        let contents = serde_json::to_vec_pretty(&document)
            .map_err(|err| StoreError::Corrupt(Box::new(err)))?;

        let directory = self.directory();
        fs::create_dir_all(&directory).await?;
        let target = self.path.clone();
        task::spawn_blocking(move || commit(&directory, &target, &contents))
            .await
            .map_err(|err| StoreError::Unavailable(format!("store writer panicked: {err}")))??;

        debug!(
            path = %self.path.display(),
            rows = rows.len(),
            total = document.len(),
            "committed batch"
        );
        Ok(())
    }
}
