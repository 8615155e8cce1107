//! Analytics aggregator.
//!
//! Takes the complaint set plus a multi-field filter spec and produces four
//! independent views: counts by category, status, and urgency, and a
//! time-bucketed timeline. Filters compose as AND; keys with zero
//! occurrences are absent, not zero-valued. Aggregation is pure and
//! idempotent: same inputs, same views.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{Complaint, Status, Urgency};

// ---------------------------------------------------------------------------
// Filter spec
// ---------------------------------------------------------------------------

/// Time window measured back from "now". A complaint with no submission
/// date sits at epoch 0 and is excluded by everything narrower than `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Days7,
    #[default]
    Days30,
    Days90,
    Year1,
    All,
}

impl TimeRange {
    fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = match self {
            TimeRange::Days7 => 7,
            TimeRange::Days30 => 30,
            TimeRange::Days90 => 90,
            TimeRange::Year1 => 365,
            TimeRange::All => return None,
        };
        Some(now - Duration::days(days))
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(TimeRange::Days7),
            "30d" => Ok(TimeRange::Days30),
            "90d" => Ok(TimeRange::Days90),
            "1y" => Ok(TimeRange::Year1),
            "all" => Ok(TimeRange::All),
            other => Err(format!("unknown time range: {other}")),
        }
    }
}

/// Multi-field filter. Absent dimensions mean no filtering; present ones
/// are exact matches on the raw field value.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub time_range: TimeRange,
    pub category: Option<String>,
    pub status: Option<Status>,
    pub urgency: Option<Urgency>,
}

impl FilterSpec {
    fn matches(&self, complaint: &Complaint, now: DateTime<Utc>) -> bool {
        if let Some(cutoff) = self.time_range.cutoff(now)
            && complaint.effective_date() < cutoff
        {
            return false;
        }
        if let Some(ref category) = self.category
            && complaint.category.as_deref() != Some(category.as_str())
        {
            return false;
        }
        if let Some(status) = self.status
            && complaint.status != Some(status)
        {
            return false;
        }
        if let Some(urgency) = self.urgency
            && complaint.urgency != Some(urgency)
        {
            return false;
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Timeline granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            "yearly" => Ok(Granularity::Yearly),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        };
        write!(f, "{s}")
    }
}

/// One named timeline bucket with its count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineBucket {
    pub label: String,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// The four aggregation views plus the filtered set they were built from.
/// The filtered set is retained so a granularity change can re-bucket the
/// timeline without re-fetching, and so CSV export can project it directly.
#[derive(Debug, Clone)]
pub struct AnalyticsReport {
    pub filtered: Vec<Complaint>,
    pub by_category: BTreeMap<String, u64>,
    pub by_status: BTreeMap<String, u64>,
    pub by_urgency: BTreeMap<String, u64>,
    pub by_timeline: Vec<TimelineBucket>,
    pub granularity: Granularity,
}

impl AnalyticsReport {
    /// Size of the filtered complaint set. Each categorical view's counts
    /// sum to exactly this.
    pub fn total(&self) -> usize {
        self.filtered.len()
    }

    /// Recompute only the timeline view at a new granularity. The three
    /// categorical views and the filtered set are untouched.
    pub fn rebucket(&mut self, granularity: Granularity) {
        self.granularity = granularity;
        self.by_timeline = bucket_timeline(&self.filtered, granularity);
    }
}

/// Aggregate against the current wall clock.
pub fn aggregate(
    complaints: &[Complaint],
    filters: &FilterSpec,
    granularity: Granularity,
) -> AnalyticsReport {
    aggregate_at(complaints, filters, granularity, Utc::now())
}

/// Aggregate with an explicit "now" for the time-range cutoff.
pub fn aggregate_at(
    complaints: &[Complaint],
    filters: &FilterSpec,
    granularity: Granularity,
    now: DateTime<Utc>,
) -> AnalyticsReport {
    let filtered: Vec<Complaint> = complaints
        .iter()
        .filter(|c| filters.matches(c, now))
        .cloned()
        .collect();

    let mut by_category = BTreeMap::new();
    let mut by_status = BTreeMap::new();
    let mut by_urgency = BTreeMap::new();

    for complaint in &filtered {
        let category = complaint
            .category
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *by_category.entry(category).or_insert(0) += 1;

        let status = complaint
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "Pending".to_string());
        *by_status.entry(status).or_insert(0) += 1;

        let urgency = complaint
            .urgency
            .map(|u| u.to_string())
            .unwrap_or_else(|| "Medium".to_string());
        *by_urgency.entry(urgency).or_insert(0) += 1;
    }

    let by_timeline = bucket_timeline(&filtered, granularity);

    AnalyticsReport {
        filtered,
        by_category,
        by_status,
        by_urgency,
        by_timeline,
        granularity,
    }
}

/// Bucket complaints by calendar period, sorted by the period's start date
/// (never by label string).
fn bucket_timeline(complaints: &[Complaint], granularity: Granularity) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<NaiveDate, TimelineBucket> = BTreeMap::new();

    for complaint in complaints {
        let date = complaint.effective_date().date_naive();
        let (start, label) = period_of(date, granularity);
        buckets
            .entry(start)
            .or_insert_with(|| TimelineBucket { label, count: 0 })
            .count += 1;
    }

    buckets.into_values().collect()
}

/// The period start (sort key) and display label containing `date`.
fn period_of(date: NaiveDate, granularity: Granularity) -> (NaiveDate, String) {
    match granularity {
        Granularity::Daily => (date, date.format("%b %-d, %Y").to_string()),
        Granularity::Weekly => {
            let start = week_start(date);
            let end = start + Duration::days(6);
            let label = format!(
                "{} - {}",
                start.format("%b %-d"),
                end.format("%b %-d, %Y")
            );
            (start, label)
        }
        Granularity::Monthly => {
            let start = date.with_day(1).unwrap_or(date);
            (start, start.format("%b %Y").to_string())
        }
        Granularity::Yearly => {
            let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
            (start, format!("{}", date.year()))
        }
    }
}

/// Sunday-anchored start of the 7-day window containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}
