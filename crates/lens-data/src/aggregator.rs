//! Count aggregation over time periods and categorical fields.

use std::collections::BTreeMap;

use lens_core::models::{Bucket, Granularity, LeadRecord, RankEntry, RankField};

/// Stateless helper that turns lead records into chartable counts.
pub struct LeadAggregator;

impl LeadAggregator {
    /// Count `records` per calendar period at the given granularity.
    ///
    /// Returns buckets sorted ascending by period key; every period key is
    /// zero-padded, so the `BTreeMap` string order is chronological order.
    /// Periods with no records simply don't appear.
    pub fn aggregate_by_period(records: &[LeadRecord], granularity: Granularity) -> Vec<Bucket> {
        Self::aggregate_filtered(records, granularity, |_| true)
    }

    /// Like [`aggregate_by_period`](Self::aggregate_by_period), but only
    /// counting records for which `keep` returns `true`.
    ///
    /// Used for the repeat-application trend, which counts the subset of
    /// leads flagged as repeats over the same periods.
    pub fn aggregate_filtered<F>(
        records: &[LeadRecord],
        granularity: Granularity,
        keep: F,
    ) -> Vec<Bucket>
    where
        F: Fn(&LeadRecord) -> bool,
    {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for record in records.iter().filter(|r| keep(r)) {
            *counts.entry(granularity.period_key(record.invited_at)).or_default() += 1;
        }

        counts
            .into_iter()
            .map(|(period, count)| Bucket { period, count })
            .collect()
    }

    /// Keep only the last `n` buckets, or all of them when there are fewer
    /// (or when `n` is `None`).
    pub fn trailing(mut buckets: Vec<Bucket>, n: Option<usize>) -> Vec<Bucket> {
        if let Some(n) = n {
            if buckets.len() > n {
                buckets.drain(..buckets.len() - n);
            }
        }
        buckets
    }

    /// Rank the values of `field` by record count, keeping the field's top K.
    ///
    /// Records without a value for the field are skipped.  Ordering is
    /// deterministic: count descending, then label ascending, so equal
    /// counts always render in the same order.
    pub fn rank_categorical(records: &[LeadRecord], field: RankField) -> Vec<RankEntry> {
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for record in records {
            if let Some(value) = field.value(record) {
                *counts.entry(value).or_default() += 1;
            }
        }

        let mut entries: Vec<RankEntry> = counts
            .into_iter()
            .map(|(label, count)| RankEntry {
                label: label.to_string(),
                count,
            })
            .collect();

        // BTreeMap already yields labels ascending, so a stable sort by
        // descending count preserves the label tiebreak.
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries.truncate(field.top_k());
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

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

    fn lead_with_source(y: i32, mo: u32, d: u32, source: &str) -> LeadRecord {
        LeadRecord {
            source: Some(source.to_string()),
            ..lead(y, mo, d)
        }
    }

    // ── aggregate_by_period ───────────────────────────────────────────────

    #[test]
    fn test_aggregate_daily_counts() {
        let records = vec![lead(2024, 1, 15), lead(2024, 1, 15), lead(2024, 1, 16)];

        let buckets = LeadAggregator::aggregate_by_period(&records, Granularity::Daily);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period, "2024-01-15");
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[1].period, "2024-01-16");
        assert_eq!(buckets[1].count, 1);
    }

    #[test]
    fn test_aggregate_monthly_counts() {
        let records = vec![lead(2023, 12, 31), lead(2024, 1, 1), lead(2024, 1, 20)];

        let buckets = LeadAggregator::aggregate_by_period(&records, Granularity::Monthly);

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].period, "2023-12");
        assert_eq!(buckets[1].period, "2024-01");
        assert_eq!(buckets[1].count, 2);
    }

    #[test]
    fn test_aggregate_conserves_counts() {
        let records: Vec<LeadRecord> = (1..=28).map(|d| lead(2024, 2, d)).collect();

        let buckets = LeadAggregator::aggregate_by_period(&records, Granularity::Weekly);

        let total: u64 = buckets.iter().map(|b| b.count).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn test_aggregate_empty_input() {
        let buckets = LeadAggregator::aggregate_by_period(&[], Granularity::Daily);
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = vec![lead(2024, 1, 15), lead(2024, 2, 1)];
        let a = LeadAggregator::aggregate_by_period(&records, Granularity::Monthly);
        let b = LeadAggregator::aggregate_by_period(&records, Granularity::Monthly);
        assert_eq!(a, b);
    }

    #[test]
    fn test_aggregate_filtered_subset() {
        let mut repeat = lead(2024, 1, 15);
        repeat.repeat_application = true;
        let records = vec![lead(2024, 1, 15), repeat, lead(2024, 1, 16)];

        let buckets = LeadAggregator::aggregate_filtered(&records, Granularity::Daily, |r| {
            r.repeat_application
        });

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].period, "2024-01-15");
        assert_eq!(buckets[0].count, 1);
    }

    // ── trailing ──────────────────────────────────────────────────────────

    #[test]
    fn test_trailing_truncates_to_last_n() {
        let buckets: Vec<Bucket> = (1..=5)
            .map(|d| Bucket {
                period: format!("2024-01-0{d}"),
                count: d as u64,
            })
            .collect();

        let kept = LeadAggregator::trailing(buckets, Some(3));

        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].period, "2024-01-03");
        assert_eq!(kept[2].period, "2024-01-05");
    }

    #[test]
    fn test_trailing_returns_all_when_fewer() {
        let buckets = vec![Bucket {
            period: "2024-01".to_string(),
            count: 7,
        }];

        let kept = LeadAggregator::trailing(buckets, Some(12));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_trailing_none_keeps_everything() {
        let buckets: Vec<Bucket> = (1..=40)
            .map(|i| Bucket {
                period: format!("2024-{i:02}"),
                count: 1,
            })
            .collect();

        let kept = LeadAggregator::trailing(buckets, None);
        assert_eq!(kept.len(), 40);
    }

    // ── rank_categorical ──────────────────────────────────────────────────

    #[test]
    fn test_rank_orders_by_count_descending() {
        let records = vec![
            lead_with_source(2024, 1, 1, "Facebook"),
            lead_with_source(2024, 1, 2, "Facebook"),
            lead_with_source(2024, 1, 3, "Referral"),
        ];

        let ranking = LeadAggregator::rank_categorical(&records, RankField::Source);

        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].label, "Facebook");
        assert_eq!(ranking[0].count, 2);
        assert_eq!(ranking[1].label, "Referral");
    }

    #[test]
    fn test_rank_ties_break_by_label_ascending() {
        let records = vec![
            lead_with_source(2024, 1, 1, "Zeta"),
            lead_with_source(2024, 1, 2, "Alpha"),
            lead_with_source(2024, 1, 3, "Mid"),
        ];

        let ranking = LeadAggregator::rank_categorical(&records, RankField::Source);

        let labels: Vec<&str> = ranking.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_rank_truncates_to_field_top_k() {
        // CampaignSite keeps 5.
        let records: Vec<LeadRecord> = (0..8)
            .map(|i| LeadRecord {
                campaign_site: Some(format!("site-{i}")),
                ..lead(2024, 1, 1 + i as u32)
            })
            .collect();

        let ranking = LeadAggregator::rank_categorical(&records, RankField::CampaignSite);
        assert_eq!(ranking.len(), 5);
    }

    #[test]
    fn test_rank_skips_missing_values() {
        let records = vec![lead(2024, 1, 1), lead_with_source(2024, 1, 2, "Referral")];

        let ranking = LeadAggregator::rank_categorical(&records, RankField::Source);

        assert_eq!(ranking.len(), 1);
        let total: u64 = ranking.iter().map(|e| e.count).sum();
        assert_eq!(total, 1);
    }
}
