//! Domain data structures for weeks, schedule rows, and lookup results.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::ports::ValidationError;

/// Format used for week keys and dates in source batches and stored records.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "NaiveDate", into = "NaiveDate")]
/// Canonical Monday identifying a seven day schedule period.
pub struct WeekKey(NaiveDate);

impl WeekKey {
    /// Wrap a date that is already a Monday.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NotWeekStart`] for any other weekday.
    pub fn new(monday: NaiveDate) -> Result<Self, ValidationError> {
        if monday.weekday() == Weekday::Mon {
            Ok(Self(monday))
        } else {
            Err(ValidationError::NotWeekStart { date: monday })
        }
    }

    /// Monday of the Monday-to-Sunday week containing `date`.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        let offset = u64::from(date.weekday().num_days_from_monday());
        // Stepping back at most six days only fails at the very start of chrono's range.
        Self(date.checked_sub_days(Days::new(offset)).unwrap_or(date))
    }

    /// Key of the following week.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.checked_add_days(Days::new(7)).unwrap_or(self.0))
    }

    /// The Monday itself.
    #[must_use]
    pub fn as_date(self) -> NaiveDate {
        self.0
    }

    /// Whether `date` falls within `[monday, monday + 7 days)`.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.0 && date < self.next().0
    }

    /// Storage key, an ISO `YYYY-MM-DD` string.
    #[must_use]
    pub fn as_key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0.format(DATE_FORMAT))
    }
}

impl TryFrom<NaiveDate> for WeekKey {
    type Error = ValidationError;

    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date)
    }
}

impl From<WeekKey> for NaiveDate {
    fn from(week: WeekKey) -> Self {
        week.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One validated week of the collection schedule.
pub struct ScheduleRow {
    /// Week the collection belongs to.
    #[serde(rename = "id", alias = "week_key")]
    pub week_key: WeekKey,
    /// Day the bin is collected, always inside `week_key`'s week.
    pub collection_date: NaiveDate,
    /// Collection category, e.g. "Recycling bin".
    pub bin_type: String,
}

impl ScheduleRow {
    /// Build a row, checking that the collection falls within its week.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutsideWeek`] when it does not.
    pub fn new(
        week_key: WeekKey,
        collection_date: NaiveDate,
        bin_type: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if !week_key.contains(collection_date) {
            return Err(ValidationError::OutsideWeek {
                week_key,
                collection_date,
            });
        }
        Ok(Self {
            week_key,
            collection_date,
            bin_type: bin_type.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Answer to "which bin is collected next, and when?".
pub struct CollectionInfo {
    /// Collection category.
    pub bin_type: String,
    /// Day of the collection.
    pub collection_date: NaiveDate,
}

impl From<ScheduleRow> for CollectionInfo {
    fn from(row: ScheduleRow) -> Self {
        Self {
            bin_type: row.bin_type,
            collection_date: row.collection_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
/// Outcome of one ingestion pass.
pub enum SyncResult {
    /// The batch was empty.
    NoOp,
    /// The newest week of the batch was already stored; nothing was written.
    AlreadyLoaded,
    /// The given number of rows was written.
    Loaded(usize),
}

impl fmt::Display for SyncResult {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncResult::NoOp => write!(formatter, "source batch was empty"),
            SyncResult::AlreadyLoaded => write!(formatter, "schedule already loaded"),
            SyncResult::Loaded(count) => write!(formatter, "loaded {count} week(s)"),
        }
    }
}
