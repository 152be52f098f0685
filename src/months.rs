use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::models::MonthlyBucket;

pub const WINDOW_MONTHS: u32 = 6;

pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// The six calendar months ending with `now`'s month, oldest first, as `(key, label)`.
pub fn trailing_months(now: DateTime<Utc>) -> Vec<(String, String)> {
    let current = now.year() * 12 + now.month0() as i32;

    (0..WINDOW_MONTHS as i32)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        })
        .map(|first| {
            (
                first.format("%Y-%m").to_string(),
                first.format("%b %Y").to_string(),
            )
        })
        .collect()
}

/// Adds `weight` to the month of each timestamp. Missing timestamps count toward `now`.
pub fn count_by_month<I>(items: I, now: DateTime<Utc>) -> HashMap<String, i64>
where
    I: IntoIterator<Item = (Option<DateTime<Utc>>, i64)>,
{
    let mut counts = HashMap::new();
    for (at, weight) in items {
        *counts.entry(month_key(at.unwrap_or(now))).or_insert(0) += weight;
    }
    counts
}

pub fn window(counts: &HashMap<String, i64>, now: DateTime<Utc>) -> Vec<MonthlyBucket> {
    trailing_months(now)
        .into_iter()
        .map(|(key, month)| MonthlyBucket {
            count: counts.get(&key).copied().unwrap_or(0),
            month,
        })
        .collect()
}

/// One record per timestamp, bucketed into the trailing window.
pub fn bucket_timestamps<I>(timestamps: I, now: DateTime<Utc>) -> Vec<MonthlyBucket>
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    let counts = count_by_month(timestamps.into_iter().map(|at| (at, 1)), now);
    window(&counts, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn window_spans_year_boundary() {
        let months = trailing_months(at(2026, 2, 10));
        let keys: Vec<&str> = months.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["2025-09", "2025-10", "2025-11", "2025-12", "2026-01", "2026-02"]
        );
        assert_eq!(months[0].1, "Sep 2025");
        assert_eq!(months[5].1, "Feb 2026");
    }

    #[test]
    fn empty_input_still_has_six_zero_buckets() {
        let buckets = bucket_timestamps(Vec::new(), at(2026, 10, 17));
        assert_eq!(buckets.len(), 6);
        assert!(buckets.iter().all(|bucket| bucket.count == 0));
        assert_eq!(buckets[5].month, "Oct 2026");
    }

    #[test]
    fn counts_land_in_their_month_and_old_records_fall_out() {
        let now = at(2026, 10, 17);
        let buckets = bucket_timestamps(
            vec![
                Some(at(2026, 10, 1)),
                Some(at(2026, 10, 30)),
                Some(at(2026, 5, 3)),
                Some(at(2026, 4, 30)),
                None,
            ],
            now,
        );
        let counts: Vec<i64> = buckets.iter().map(|bucket| bucket.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 0, 0, 3]);
    }

    #[test]
    fn weighted_counts_accumulate() {
        let now = at(2026, 10, 17);
        let counts = count_by_month(vec![(Some(at(2026, 9, 2)), 4), (Some(at(2026, 9, 20)), 3)], now);
        assert_eq!(counts.get("2026-09"), Some(&7));
    }
}
