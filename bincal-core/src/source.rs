//! Tabular source batches and the trait for the places they come from.

use std::io::Read;

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

use crate::model::{DATE_FORMAT, ScheduleRow, WeekKey};
use crate::ports::{SourceError, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// One undecoded row of a source table.
pub struct RawRow {
    /// Week start as text. Sources name this column `id` or `week_key`.
    #[serde(default, alias = "week_key")]
    pub id: Option<String>,
    /// Collection day as text.
    #[serde(default)]
    pub collection_date: Option<String>,
    /// Collection category.
    #[serde(default)]
    pub bin_type: Option<String>,
}

impl RawRow {
    /// Convenience constructor for fully populated rows.
    #[must_use]
    pub fn new(week_key: &str, collection_date: &str, bin_type: &str) -> Self {
        Self {
            id: Some(week_key.to_owned()),
            collection_date: Some(collection_date.to_owned()),
            bin_type: Some(bin_type.to_owned()),
        }
    }

    /// Check the row and turn it into a [`ScheduleRow`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<ScheduleRow, ValidationError> {
        let week_key = WeekKey::new(parse_date("id", self.id.as_deref())?)?;
        let collection_date = parse_date("collection_date", self.collection_date.as_deref())?;
        let bin_type = required("bin_type", self.bin_type.as_deref())?;
        ScheduleRow::new(week_key, collection_date, bin_type)
    }
}

fn required<'row>(
    field: &'static str,
    value: Option<&'row str>,
) -> Result<&'row str, ValidationError> {
    value
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .ok_or(ValidationError::MissingField { field })
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<NaiveDate, ValidationError> {
    let text = required(field, value)?;
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|source| ValidationError::InvalidDate {
        field,
        value: text.to_owned(),
        source,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ordered rows delivered by a source, consumed by a single ingestion pass.
pub struct SourceBatch {
    rows: Vec<RawRow>,
}

impl SourceBatch {
    /// Wrap already decoded rows.
    #[must_use]
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }

    /// Decode a CSV table with a header line.
    ///
    /// Recognised columns are `id` (or `week_key`), `collection_date` and `bin_type`;
    /// other columns are ignored and blank cells count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Decode`] when the payload is not well-formed CSV.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, SourceError> {
        let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let rows = csv_reader
            .deserialize::<RawRow>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| SourceError::Decode(Box::new(err)))?;
        Ok(Self { rows })
    }

    /// Rows in delivery order.
    #[must_use]
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<RawRow>> for SourceBatch {
    fn from(rows: Vec<RawRow>) -> Self {
        Self::new(rows)
    }
}

#[async_trait]
/// A place schedule batches are delivered to, such as a local file or a bucket.
pub trait SourceOrigin: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Read the current batch.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the batch cannot be read or decoded.
    async fn fetch(&self) -> Result<SourceBatch, SourceError>;

    /// Signal that the fetched batch was loaded into the store.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the origin fails to archive the batch.
    async fn consumed(&self) -> Result<(), SourceError> {
        Ok(())
    }
}
