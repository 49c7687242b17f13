use bincal_core::model::{CollectionInfo, SyncResult, WeekKey};

const SPOKEN_DATE: &str = "%A, %Y-%m-%d";

pub(crate) fn announce(info: &CollectionInfo) -> String {
    format!(
        "{} will be collected on {}",
        info.bin_type,
        info.collection_date.format(SPOKEN_DATE)
    )
}

pub(crate) fn nothing_scheduled(week: WeekKey) -> String {
    format!("No bin collection is scheduled for the week of {week}")
}

pub(crate) fn synced(result: Option<SyncResult>) -> String {
    match result {
        Some(result) => format!("Schedule sync: {result}"),
        None => "Schedule sync: no source configured".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn announces_bin_and_weekday() {
        let info = CollectionInfo {
            bin_type: "Recycling bin".to_owned(),
            collection_date: NaiveDate::from_ymd_opt(2023, 1, 26).expect("date"),
        };
        assert_eq!(
            announce(&info),
            "Recycling bin will be collected on Thursday, 2023-01-26"
        );
    }

    #[test]
    fn describes_sync_outcomes() {
        assert_eq!(synced(Some(SyncResult::Loaded(3))), "Schedule sync: loaded 3 week(s)");
        assert_eq!(
            synced(Some(SyncResult::AlreadyLoaded)),
            "Schedule sync: schedule already loaded"
        );
        assert_eq!(synced(None), "Schedule sync: no source configured");
    }

    #[test]
    fn names_the_empty_week() {
        let week = WeekKey::containing(NaiveDate::from_ymd_opt(2023, 3, 1).expect("date"));
        assert_eq!(
            nothing_scheduled(week),
            "No bin collection is scheduled for the week of 2023-02-27"
        );
    }
}
