//! Time-window selection over loaded lead records.
//!
//! Windows anchor on the newest record in the dataset rather than on the
//! wall clock, so a stale extract still shows a populated trailing window.

use chrono::{DateTime, Utc};
use lens_core::models::{Granularity, LeadRecord, TimeWindow};

/// The slice of a dataset falling inside one time window.
#[derive(Debug)]
pub struct WindowSelection<'a> {
    /// The window that was applied.
    pub window: TimeWindow,
    /// Records inside the window, still sorted by `invited_at`.
    pub records: &'a [LeadRecord],
    /// The inclusive lower boundary, `None` for the all-time window.
    pub cutoff: Option<DateTime<Utc>>,
    /// Bucket granularity for this window.
    pub granularity: Granularity,
}

/// Select the records of `records` that fall inside `window`.
///
/// `records` must be sorted ascending by `invited_at` (the loader
/// guarantees this).  The boundary is inclusive: a record stamped exactly
/// at the cutoff is kept.  An empty input yields an empty selection.
pub fn select_window(records: &[LeadRecord], window: TimeWindow) -> WindowSelection<'_> {
    let granularity = window.granularity();

    let Some(max_ts) = records.last().map(|r| r.invited_at) else {
        return WindowSelection {
            window,
            records: &[],
            cutoff: None,
            granularity,
        };
    };

    let cutoff = window.cutoff_from(max_ts);

    let selected = match cutoff {
        Some(cutoff) => {
            // Records are sorted, so the window is a suffix of the slice.
            let start = records.partition_point(|r| r.invited_at < cutoff);
            &records[start..]
        }
        None => records,
    };

    WindowSelection {
        window,
        records: selected,
        cutoff,
        granularity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn lead(y: i32, mo: u32, d: u32) -> LeadRecord {
        LeadRecord {
            invited_at: Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap(),
            record_id: format!("{y}-{mo}-{d}"),
            campaign_title: None,
            source: None,
            assigned_manager: None,
            folder: None,
            completion_method: None,
            campaign_type: None,
            campaign_site: None,
            repeat_application: false,
        }
    }

    #[test]
    fn test_select_window_anchors_on_max_timestamp() {
        // Newest record is 2024-02-01, so the 30-day cutoff is 2024-01-02:
        // the January 1st record falls out, the other two stay.
        let records = vec![lead(2024, 1, 1), lead(2024, 1, 15), lead(2024, 2, 1)];

        let selection = select_window(&records, TimeWindow::Last30Days);

        assert_eq!(selection.records.len(), 2);
        assert_eq!(selection.records[0].record_id, "2024-1-15");
        assert_eq!(selection.granularity, Granularity::Daily);
        let cutoff = selection.cutoff.unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_select_window_boundary_is_inclusive() {
        // 2024-01-02 12:00 is exactly 30 days before the newest record.
        let records = vec![lead(2024, 1, 2), lead(2024, 2, 1)];

        let selection = select_window(&records, TimeWindow::Last30Days);

        assert_eq!(selection.records.len(), 2);
    }

    #[test]
    fn test_select_window_all_time_keeps_everything() {
        let records = vec![lead(2019, 6, 1), lead(2024, 2, 1)];

        let selection = select_window(&records, TimeWindow::AllTime);

        assert_eq!(selection.records.len(), 2);
        assert!(selection.cutoff.is_none());
        assert_eq!(selection.granularity, Granularity::Monthly);
    }

    #[test]
    fn test_select_window_empty_input() {
        let selection = select_window(&[], TimeWindow::Last12Weeks);

        assert!(selection.records.is_empty());
        assert!(selection.cutoff.is_none());
    }

    #[test]
    fn test_select_window_stale_extract_still_populated() {
        // All records are years old; the window anchors on the data, so it
        // still selects the newest 12 weeks of it.
        let records = vec![lead(2020, 1, 1), lead(2020, 5, 1), lead(2020, 5, 15)];

        let selection = select_window(&records, TimeWindow::Last12Weeks);

        assert_eq!(selection.records.len(), 2);
        assert_eq!(selection.granularity, Granularity::Weekly);
    }
}
