//! Per-user statistics
//!
//! Attempts are counted per calendar day (UTC) by each question's
//! `last_attempt`, so a question revised twice on one day counts once.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::Serialize;

/// Number of days covered by the attempts histogram
pub const TRAILING_DAYS: u64 = 7;

/// One calendar day with inclusive UTC bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn new(date: NaiveDate) -> Self {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + TimeDelta::days(1) - TimeDelta::nanoseconds(1);
        Self { date, start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }

    /// `YYYY-MM-DD` key used in the histogram
    pub fn key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Consecutive days ending today, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsWindow {
    days: Vec<DayWindow>,
}

impl StatsWindow {
    /// The `count` days ending with `today` (inclusive).
    pub fn trailing_days(today: NaiveDate, count: u64) -> Self {
        let days = (0..count)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(back)))
            .map(DayWindow::new)
            .collect();
        Self { days }
    }

    /// The default seven-day window ending on the current UTC date.
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        Self::trailing_days(now.date_naive(), TRAILING_DAYS)
    }

    pub fn days(&self) -> &[DayWindow] {
        &self.days
    }

    /// Start of the oldest day
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.days.first().map(|d| d.start)
    }

    /// End of the newest day
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.days.last().map(|d| d.end)
    }
}

/// Count attempt timestamps per day. Every day of the window gets a key,
/// zero when nothing fell on it; timestamps outside the window are ignored.
pub fn attempts_per_day<I>(window: &StatsWindow, last_attempts: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts: BTreeMap<String, i64> =
        window.days().iter().map(|d| (d.key(), 0)).collect();

    for at in last_attempts {
        if let Some(day) = window.days().iter().find(|d| d.contains(at)) {
            *counts.entry(day.key()).or_insert(0) += 1;
        }
    }

    counts
}

/// Histogram of topic -> number of occurrences across all topic lists.
pub fn topic_distribution<I, L>(topic_lists: I) -> BTreeMap<String, i64>
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = String>,
{
    let mut dist = BTreeMap::new();
    for topics in topic_lists {
        for topic in topics {
            *dist.entry(topic).or_insert(0) += 1;
        }
    }
    dist
}

/// Aggregate statistics for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_questions: i64,
    pub attempts_per_day: BTreeMap<String, i64>,
    pub topic_distribution: BTreeMap<String, i64>,
}

impl Stats {
    pub fn compute<A, T, L>(
        total_questions: i64,
        window: &StatsWindow,
        last_attempts: A,
        topic_lists: T,
    ) -> Self
    where
        A: IntoIterator<Item = DateTime<Utc>>,
        T: IntoIterator<Item = L>,
        L: IntoIterator<Item = String>,
    {
        Self {
            total_questions,
            attempts_per_day: attempts_per_day(window, last_attempts),
            topic_distribution: topic_distribution(topic_lists),
        }
    }
}
