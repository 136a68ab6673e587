//! Streak and bucket aggregation for charts
//!
//! Partitions a result collection into fixed sub-buckets of the window
//! containing a reference instant: 24 hourly buckets for a day, 7
//! weekday buckets for a week, one bucket per day for a month. Bucket
//! values are counts (bar charts) or average percents (trend lines),
//! with empty buckets at 0.
//!
//! Calendar math uses the device's local calendar. The weekday bucket
//! order is fixed to Monday-first regardless of the locale's first
//! weekday, so chart ordering is deterministic everywhere.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Timelike, Utc};

use crate::models::{MemoryAttempt, QuizResult};

/// Aggregation window granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 24 hourly buckets of the reference day
    Day,
    /// 7 weekday buckets, Monday first, of the reference week
    Week,
    /// One bucket per day of the reference month
    Month,
}

/// One aggregation bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Number of records in the bucket
    pub count: u32,
    /// Mean percent of the bucket's records, 0 when empty
    pub average_percent: f64,
}

impl Bucket {
    const EMPTY: Bucket = Bucket {
        count: 0,
        average_percent: 0.0,
    };
}

/// A dated data point feeding the aggregator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub date: DateTime<Utc>,
    pub percent: f64,
}

impl Sample {
    /// A scored sample (quiz trend lines)
    pub fn scored(date: DateTime<Utc>, percent: f64) -> Self {
        Self { date, percent }
    }

    /// An unscored sample (attempt counts)
    pub fn at(date: DateTime<Utc>) -> Self {
        Self { date, percent: 0.0 }
    }
}

impl From<&QuizResult> for Sample {
    fn from(result: &QuizResult) -> Self {
        Self::scored(result.date, result.percent())
    }
}

impl From<&MemoryAttempt> for Sample {
    fn from(attempt: &MemoryAttempt) -> Self {
        Self::at(attempt.date)
    }
}

/// Partition samples into the buckets of the window containing `now`
///
/// Samples outside the window are ignored. The bucket vector always has
/// the full fixed length for the granularity.
pub fn bucketize(granularity: Granularity, now: DateTime<Local>, samples: &[Sample]) -> Vec<Bucket> {
    let bucket_count = match granularity {
        Granularity::Day => 24,
        Granularity::Week => 7,
        Granularity::Month => days_in_month(now.year(), now.month()) as usize,
    };

    let mut counts = vec![0u32; bucket_count];
    let mut percent_sums = vec![0.0f64; bucket_count];

    for sample in samples {
        let local = sample.date.with_timezone(&Local);
        let Some(index) = bucket_index(granularity, now, &local) else {
            continue;
        };
        counts[index] += 1;
        percent_sums[index] += sample.percent;
    }

    counts
        .into_iter()
        .zip(percent_sums)
        .map(|(count, sum)| {
            if count == 0 {
                Bucket::EMPTY
            } else {
                Bucket {
                    count,
                    average_percent: sum / f64::from(count),
                }
            }
        })
        .collect()
}

/// Bucket index of a local instant within the reference window, `None`
/// when it falls outside
fn bucket_index(
    granularity: Granularity,
    now: DateTime<Local>,
    local: &DateTime<Local>,
) -> Option<usize> {
    match granularity {
        Granularity::Day => {
            (local.date_naive() == now.date_naive()).then(|| local.hour() as usize)
        }
        Granularity::Week => {
            let monday = week_monday(now.date_naive());
            let date = local.date_naive();
            (date >= monday && date < monday + Duration::days(7))
                .then(|| local.weekday().num_days_from_monday() as usize)
        }
        Granularity::Month => (local.year() == now.year() && local.month() == now.month())
            .then(|| local.day() as usize - 1),
    }
}

/// Monday of the week containing `date`
fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is a valid date");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of next month is a valid date");
    (next - first).num_days() as u32
}

/// Consecutive active local days ending at `today`
///
/// A day is active when at least one sample falls on it. The streak
/// survives an idle today by counting back from yesterday; otherwise
/// it is 0.
pub fn streak_days<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let active: HashSet<NaiveDate> = dates
        .into_iter()
        .map(|d| d.with_timezone(&Local).date_naive())
        .collect();

    let mut cursor = if active.contains(&today) {
        today
    } else if active.contains(&(today - Duration::days(1))) {
        today - Duration::days(1)
    } else {
        return 0;
    };

    let mut streak = 0;
    while active.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}
