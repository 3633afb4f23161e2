//! Dashboard assembly.
//!
//! Builds the full view model for one time window: the lead trend, the
//! repeat-application trend and the categorical rankings.  Each chart is
//! computed in isolation so a panic in one leaves the others intact.

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use lens_core::models::{Bucket, Granularity, LeadRecord, RankEntry, RankField, TimeWindow};
use tracing::{debug, error};

use crate::aggregator::LeadAggregator;
use crate::window::select_window;

/// One categorical ranking chart.
#[derive(Debug, Clone)]
pub struct RankingChart {
    pub field: RankField,
    pub entries: Vec<RankEntry>,
}

/// The complete view model for one rendered dashboard.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// The window the dashboard was built for.
    pub window: TimeWindow,
    /// Bucket granularity of the trend charts.
    pub granularity: Granularity,
    /// Inclusive lower boundary applied, `None` for all-time.
    pub cutoff: Option<DateTime<Utc>>,
    /// Lead counts per period, trailing-truncated to the window's length.
    pub trend: Vec<Bucket>,
    /// Repeat-application counts per period, same periods as `trend`.
    pub repeat_trend: Vec<Bucket>,
    /// Top-K rankings in dashboard order.
    pub rankings: Vec<RankingChart>,
    /// Number of records inside the window.
    pub total_leads: u64,
    /// Charts that failed to build, as `"chart name: reason"` strings.
    pub errors: Vec<String>,
}

/// Build the dashboard for `records` under `window`.
///
/// `records` must be sorted ascending by `invited_at`.  A failure in one
/// chart is recorded in [`Dashboard::errors`] and leaves that chart empty
/// while the rest of the dashboard still renders.
pub fn build_dashboard(records: &[LeadRecord], window: TimeWindow) -> Dashboard {
    let selection = select_window(records, window);
    let selected = selection.records;
    let granularity = selection.granularity;

    let mut errors: Vec<String> = Vec::new();

    let trend = build_chart("lead trend", &mut errors, || {
        LeadAggregator::trailing(
            LeadAggregator::aggregate_by_period(selected, granularity),
            window.trailing_buckets(),
        )
    })
    .unwrap_or_default();

    let repeat_trend = build_chart("repeat applications", &mut errors, || {
        LeadAggregator::trailing(
            LeadAggregator::aggregate_filtered(selected, granularity, |r| r.repeat_application),
            window.trailing_buckets(),
        )
    })
    .unwrap_or_default();

    let mut rankings: Vec<RankingChart> = Vec::with_capacity(RankField::ALL.len());
    for field in RankField::ALL {
        let entries = build_chart(field.title(), &mut errors, || {
            LeadAggregator::rank_categorical(selected, field)
        })
        .unwrap_or_default();
        rankings.push(RankingChart { field, entries });
    }

    debug!(
        "Built {} dashboard: {} leads, {} trend buckets, {} chart errors",
        window.as_name(),
        selected.len(),
        trend.len(),
        errors.len(),
    );

    Dashboard {
        window,
        granularity,
        cutoff: selection.cutoff,
        trend,
        repeat_trend,
        rankings,
        total_leads: selected.len() as u64,
        errors,
    }
}

/// Run one chart computation, catching panics so a single bad chart cannot
/// take down the whole dashboard.
fn build_chart<T>(
    name: &str,
    errors: &mut Vec<String>,
    compute: impl FnOnce() -> T,
) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(compute)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Chart '{}' failed: {}", name, reason);
            errors.push(format!("{}: {}", name, reason));
            None
        }
    }
}
