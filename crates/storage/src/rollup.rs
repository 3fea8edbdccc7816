//! Rollup queries over stored balance rows
//!
//! Pure functions; the stores only decide which rows to hand in.

use std::collections::HashSet;

use chrono::{Datelike, Timelike};
use tally_core::{StoredBalanceRow, Timestamp};
use tally_ports::BucketSize;

/// Calendar key of the bucket a timestamp falls into (UTC)
pub type BucketKey = (i32, u32, u32, u32, u32);

pub fn bucket_key(time: &Timestamp, bucket: BucketSize) -> BucketKey {
    let minute_slot = match bucket {
        BucketSize::FiveMinutes => time.minute() / 5,
        BucketSize::OneHour => 0,
    };
    (time.year(), time.month(), time.day(), time.hour(), minute_slot)
}

/// Newest first; rows with equal timestamps keep insertion order
pub fn sort_newest_first(rows: &mut [StoredBalanceRow]) {
    rows.sort_by(|a, b| b.time.cmp(&a.time));
}

/// Rows with `time >= since`, newest first
pub fn window<'a, I>(rows: I, since: Timestamp) -> Vec<StoredBalanceRow>
where
    I: IntoIterator<Item = &'a StoredBalanceRow>,
{
    let mut selected: Vec<StoredBalanceRow> =
        rows.into_iter().filter(|r| r.time >= since).cloned().collect();
    sort_newest_first(&mut selected);
    selected
}

/// One row per bucket: the first one seen once sorted newest first
///
/// No averaging. Output stays newest first.
pub fn bucketed<'a, I>(rows: I, since: Timestamp, bucket: BucketSize) -> Vec<StoredBalanceRow>
where
    I: IntoIterator<Item = &'a StoredBalanceRow>,
{
    let mut seen = HashSet::new();
    window(rows, since)
        .into_iter()
        .filter(|r| seen.insert(bucket_key(&r.time, bucket)))
        .collect()
}

/// Every row carrying the single most recent timestamp
///
/// Total row first, then by currency. Empty input gives an empty vector.
pub fn latest_snapshot<'a, I>(rows: I) -> Vec<StoredBalanceRow>
where
    I: IntoIterator<Item = &'a StoredBalanceRow>,
{
    let mut latest: Vec<StoredBalanceRow> = Vec::new();
    for row in rows {
        match latest.first().map(|r| r.time) {
            Some(time) if row.time < time => {}
            Some(time) if row.time == time => latest.push(row.clone()),
            _ => {
                latest.clear();
                latest.push(row.clone());
            }
        }
    }
    latest.sort_by(|a, b| {
        b.is_total()
            .cmp(&a.is_total())
            .then_with(|| a.currency.cmp(&b.currency))
    });
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn row(currency: &str, time: Timestamp) -> StoredBalanceRow {
        StoredBalanceRow {
            exchange: "bittrex".to_string(),
            currency: currency.to_string(),
            amount: dec!(1),
            base_unit_amount: dec!(1),
            base_unit_rate: dec!(1),
            stable_unit_amount: dec!(1),
            time,
        }
    }

    fn noon() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_bucket_keys() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 12, 37, 59).unwrap();
        assert_eq!(bucket_key(&t, BucketSize::FiveMinutes), (2024, 6, 1, 12, 7));
        assert_eq!(bucket_key(&t, BucketSize::OneHour), (2024, 6, 1, 12, 0));
    }

    #[test]
    fn test_window_filters_and_sorts() {
        let rows = vec![
            row("BTC", noon() - Duration::hours(3)),
            row("BTC", noon()),
            row("BTC", noon() - Duration::hours(1)),
        ];

        let selected = window(&rows, noon() - Duration::hours(2));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].time, noon());
        assert_eq!(selected[1].time, noon() - Duration::hours(1));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let rows = vec![row("BTC", noon())];
        assert_eq!(window(&rows, noon()).len(), 1);
        assert!(window(&rows, noon() + Duration::seconds(1)).is_empty());
    }

    #[test]
    fn test_rows_in_same_five_minutes_collapse() {
        let rows = vec![row("BTC", noon()), row("BTC", noon() + Duration::seconds(61))];

        let collapsed = bucketed(&rows, noon() - Duration::days(7), BucketSize::FiveMinutes);
        assert_eq!(collapsed.len(), 1);
        // The newest row represents the bucket
        assert_eq!(collapsed[0].time, noon() + Duration::seconds(61));
    }

    #[test]
    fn test_separate_buckets_never_collapse() {
        let first = Utc.with_ymd_and_hms(2024, 6, 1, 12, 4, 30).unwrap();
        let rows = vec![row("BTC", first), row("BTC", first + Duration::seconds(61))];

        let kept = bucketed(&rows, first - Duration::days(7), BucketSize::FiveMinutes);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].time > kept[1].time);
    }

    #[test]
    fn test_hourly_buckets() {
        let rows = vec![
            row("BTC", noon()),
            row("BTC", noon() + Duration::minutes(30)),
            row("BTC", noon() + Duration::minutes(59)),
            row("BTC", noon() + Duration::minutes(60)),
        ];

        let kept = bucketed(&rows, noon() - Duration::days(30), BucketSize::OneHour);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].time, noon() + Duration::hours(1));
        assert_eq!(kept[1].time, noon() + Duration::minutes(59));
    }

    #[test]
    fn test_latest_snapshot() {
        let older = noon() - Duration::minutes(5);
        let rows = vec![
            row("BTC", older),
            row("total", older),
            row("CUR1", noon()),
            row("BTC", noon()),
            row("total", noon()),
        ];

        let latest = latest_snapshot(&rows);
        let currencies: Vec<&str> = latest.iter().map(|r| r.currency.as_str()).collect();
        assert_eq!(currencies, vec!["total", "BTC", "CUR1"]);
        assert!(latest.iter().all(|r| r.time == noon()));
    }

    #[test]
    fn test_empty_inputs() {
        let rows: Vec<StoredBalanceRow> = Vec::new();
        assert!(window(&rows, noon()).is_empty());
        assert!(bucketed(&rows, noon(), BucketSize::OneHour).is_empty());
        assert!(latest_snapshot(&rows).is_empty());
    }
}
