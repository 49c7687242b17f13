//! Traits describing the durable store and the error types shared across adapters.

use std::error::Error as StdError;
use std::io::Error as IoError;

use async_trait::async_trait;
use chrono::{NaiveDate, ParseError as ChronoParseError};

use crate::model::{ScheduleRow, WeekKey};

/// Boxed error raised by an adapter's backend.
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Structural or semantic problems with a single source row.
pub enum ValidationError {
    /// A required column was missing or blank.
    #[error("missing field `{field}`")]
    MissingField {
        /// Column name.
        field: &'static str,
    },
    /// A date column could not be parsed as `YYYY-MM-DD`.
    #[error("field `{field}` is not a date: {value:?} ({source})")]
    InvalidDate {
        /// Column name.
        field: &'static str,
        /// Raw cell content.
        value: String,
        /// Parser failure.
        source: ChronoParseError,
    },
    /// The week key is not a Monday.
    #[error("week key {date} is not a Monday")]
    NotWeekStart {
        /// Offending date.
        date: NaiveDate,
    },
    /// The collection date lies outside the seven days of its week.
    #[error("collection date {collection_date} is outside week {week_key}")]
    OutsideWeek {
        /// Week the row claims.
        week_key: WeekKey,
        /// Offending collection date.
        collection_date: NaiveDate,
    },
    /// The same week appears twice in one batch.
    #[error("week {week_key} appears more than once")]
    DuplicateWeek {
        /// Repeated week.
        week_key: WeekKey,
    },
}

#[derive(thiserror::Error, Debug)]
/// Failures of the durable schedule store.
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Filesystem failure.
    #[error("store I/O error: {0}")]
    Io(#[from] IoError),
    /// The persisted data could not be decoded.
    #[error("store data is corrupt: {0}")]
    Corrupt(#[source] BoxError),
}

#[derive(thiserror::Error, Debug)]
/// Failures while obtaining a source batch.
pub enum SourceError {
    /// Reading a local source failed.
    #[error("source I/O error: {0}")]
    Io(#[from] IoError),
    /// Downloading a remote source failed.
    #[error("source fetch failed: {0}")]
    Fetch(#[source] BoxError),
    /// The payload is not a readable table.
    #[error("source is not a valid schedule table: {0}")]
    Decode(#[source] BoxError),
}

#[derive(thiserror::Error, Debug)]
/// Errors surfaced to callers of the ingestor, resolver, and service.
pub enum CalendarError {
    /// A source row failed validation; nothing was written.
    #[error("invalid schedule row {row}: {source}")]
    Validation {
        /// Zero-based position of the row in its batch.
        row: usize,
        /// What was wrong with it.
        source: ValidationError,
    },
    /// The store failed; its prior state is unchanged.
    #[error(transparent)]
    Storage(#[from] StoreError),
    /// The source batch could not be obtained.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// No schedule entry exists for the resolved week.
    #[error("no collection scheduled for week {week}")]
    NotFound {
        /// Week that was looked up last.
        week: WeekKey,
    },
}

impl CalendarError {
    /// Whether this is the normal "no data" outcome rather than a fault.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CalendarError::NotFound { .. })
    }
}

#[async_trait]
/// Durable key-value store mapping week keys to schedule rows.
pub trait ScheduleStore: Send + Sync {
    /// Fetch the row stored for `week`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend fails.
    async fn get(&self, week: &WeekKey) -> Result<Option<ScheduleRow>, StoreError>;

    /// Write all rows, or none of them.
    ///
    /// Writing a row that is already stored with identical content must be harmless.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the batch could not be committed.
    async fn batch_put(&self, rows: &[ScheduleRow]) -> Result<(), StoreError>;
}
