//! Date-keyed lookup of the next collection with a single one-week rollover.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::model::{CollectionInfo, ScheduleRow, WeekKey};
use crate::ports::{CalendarError, ScheduleStore};

/// Find the collection that is due on or after `reference_date`.
///
/// Looks up the week containing `reference_date`; if that week's collection
/// has already passed, the following week is tried once. A collection on
/// `reference_date` itself still counts as upcoming. At most two store reads
/// are made.
///
/// # Errors
///
/// Returns [`CalendarError::NotFound`] when neither lookup yields an upcoming
/// collection and [`CalendarError::Storage`] when the store fails.
pub async fn resolve<S>(
    store: &S,
    reference_date: NaiveDate,
) -> Result<CollectionInfo, CalendarError>
where
    S: ScheduleStore + ?Sized,
{
    let week = WeekKey::containing(reference_date);
    let current = lookup(store, week).await?;
    if current.collection_date >= reference_date {
        debug!(%week, date = %current.collection_date, "collection due this week");
        return Ok(current.into());
    }

    let next_week = week.next();
    debug!(%week, %next_week, "collection already passed, rolling over");
    let next = lookup(store, next_week).await?;
    Ok(next.into())
}

async fn lookup<S>(store: &S, week: WeekKey) -> Result<ScheduleRow, CalendarError>
where
    S: ScheduleStore + ?Sized,
{
    let row = store
        .get(&week)
        .await?
        .ok_or(CalendarError::NotFound { week })?;
    // A row filed under the wrong key, or dated outside its week, is never an answer.
    if row.week_key != week || !week.contains(row.collection_date) {
        warn!(
            %week,
            stored = %row.week_key,
            date = %row.collection_date,
            "stored row does not belong to its week"
        );
        return Err(CalendarError::NotFound { week });
    }
    Ok(row)
}
