//! High-level service facade combining the store, an optional source, and the resolver.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::ingest;
use crate::model::{CollectionInfo, SyncResult};
use crate::ports::{CalendarError, ScheduleStore};
use crate::resolve;
use crate::source::SourceOrigin;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a lookup preceded by best-effort ingestion.
pub struct NextCollection {
    /// The upcoming collection.
    pub info: CollectionInfo,
    /// Outcome of the ingestion pass, `None` if it was skipped or failed.
    pub sync: Option<SyncResult>,
}

/// Public entry point answering "which bin is collected next, and when?".
pub struct CalendarService {
    store: Arc<dyn ScheduleStore>,
    origin: Option<Arc<dyn SourceOrigin>>,
}

impl CalendarService {
    /// Create a service reading from `store` without any source to ingest.
    #[must_use]
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            store,
            origin: None,
        }
    }

    /// Ingest batches from `origin` before each lookup.
    #[must_use]
    pub fn with_origin(mut self, origin: Arc<dyn SourceOrigin>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Fetch the origin's batch and load it into the store.
    ///
    /// Returns `Ok(None)` when no origin is configured. After a successful
    /// load the origin is told the batch was consumed; a failure to archive
    /// it is logged and not returned.
    ///
    /// # Errors
    ///
    /// Returns a [`CalendarError`] if the batch cannot be fetched, is invalid,
    /// or the store fails.
    pub async fn sync_from_origin(&self) -> Result<Option<SyncResult>, CalendarError> {
        let Some(origin) = &self.origin else {
            return Ok(None);
        };
        debug!(origin = %origin.describe(), "fetching schedule batch");
        let batch = origin.fetch().await?;
        let result = ingest::sync(self.store.as_ref(), &batch).await?;
        if let SyncResult::Loaded(_) = result
            && let Err(err) = origin.consumed().await
        {
            warn!(origin = %origin.describe(), error = %err, "failed to mark batch consumed");
        }
        Ok(Some(result))
    }

    /// Look up the collection due on or after `reference_date`.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NotFound`] when nothing is scheduled, or
    /// [`CalendarError::Storage`] when the store fails.
    pub async fn resolve(
        &self,
        reference_date: NaiveDate,
    ) -> Result<CollectionInfo, CalendarError> {
        resolve::resolve(self.store.as_ref(), reference_date).await
    }

    /// Run ingestion best-effort, then look up the next collection.
    ///
    /// # Errors
    ///
    /// Only lookup failures are returned; ingestion failures are logged.
    pub async fn next_collection(
        &self,
        reference_date: NaiveDate,
    ) -> Result<NextCollection, CalendarError> {
        let sync = match self.sync_from_origin().await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "schedule ingestion failed, answering from stored data");
                None
            }
        };
        let info = self.resolve(reference_date).await?;
        Ok(NextCollection { info, sync })
    }
}
