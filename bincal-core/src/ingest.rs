//! Idempotent loading of source batches into the schedule store.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::model::{ScheduleRow, SyncResult};
use crate::ports::{CalendarError, ScheduleStore, ValidationError};
use crate::source::SourceBatch;

/// Load `batch` into `store` unless its newest week is already present.
///
/// Every row is validated before the store is touched, so an invalid batch
/// leaves the store exactly as it was. Only the last row is probed to decide
/// whether the batch was ingested before.
///
/// # Errors
///
/// Returns [`CalendarError::Validation`] for the first malformed row and
/// [`CalendarError::Storage`] when the store fails to read or commit.
pub async fn sync<S>(store: &S, batch: &SourceBatch) -> Result<SyncResult, CalendarError>
where
    S: ScheduleStore + ?Sized,
{
    let rows = validate(batch)?;
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        debug!("source batch is empty");
        return Ok(SyncResult::NoOp);
    };

    if store.get(&last.week_key).await?.is_some() {
        debug!(week = %last.week_key, "newest week already stored, skipping batch");
        if rows.len() > 1 && store.get(&first.week_key).await?.is_none() {
            warn!(
                newest = %last.week_key,
                oldest = %first.week_key,
                "newest week is stored but oldest is not; earlier weeks may be missing"
            );
        }
        return Ok(SyncResult::AlreadyLoaded);
    }

    store.batch_put(&rows).await?;
    info!(
        rows = rows.len(),
        from = %first.week_key,
        to = %last.week_key,
        "loaded schedule batch"
    );
    Ok(SyncResult::Loaded(rows.len()))
}

fn validate(batch: &SourceBatch) -> Result<Vec<ScheduleRow>, CalendarError> {
    let mut seen = HashSet::with_capacity(batch.len());
    batch
        .rows()
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let row = raw.validate().map_err(|source| CalendarError::Validation {
                row: index,
                source,
            })?;
            if !seen.insert(row.week_key) {
                return Err(CalendarError::Validation {
                    row: index,
                    source: ValidationError::DuplicateWeek {
                        week_key: row.week_key,
                    },
                });
            }
            Ok(row)
        })
        .collect()
}
