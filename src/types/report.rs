//! Report types for normalized cost data

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The canonical cost-data schema consumed by every downstream view.
///
/// `data` is ascending by date by convention, but the normalizer does not
/// guarantee it; sort before relying on order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedReport {
    /// When the normalization ran, not when the provider generated the data
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
    pub data: Vec<DayRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ReportMetadata>,
}

impl NormalizedReport {
    /// Earliest and latest dates present in the report, if any.
    /// Scans rather than trusting input order.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.data.iter().map(|d| d.date).min()?;
        let max = self.data.iter().map(|d| d.date).max()?;
        Some((min, max))
    }
}

/// One calendar day's per-service cost breakdown.
///
/// Invariant: every entry has cost > 0; empty-service days are dropped at
/// normalization time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub services: BTreeMap<String, f64>,
}

impl DayRecord {
    /// Sum of all service costs for this day
    pub fn total(&self) -> f64 {
        self.services.values().sum()
    }

    /// Cost of a single service on this day; absent services cost 0
    pub fn cost_for(&self, service: &str) -> f64 {
        self.services.get(service).copied().unwrap_or(0.0)
    }
}

/// Transform provenance, carried only when the provider response had
/// `ResponseMetadata`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// Timestamp of the transform, not of the provider request
    pub timestamp: DateTime<Utc>,
}

/// A Sunday-to-Saturday aggregation of DayRecords. Derived and ephemeral:
/// recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekRecord {
    /// Sunday of the week
    pub start_date: NaiveDate,
    /// Saturday of the same week (start + 6), regardless of data coverage
    pub end_date: NaiveDate,
    pub services: BTreeMap<String, f64>,
}

impl WeekRecord {
    /// Sum of this week's own service costs
    pub fn total(&self) -> f64 {
        self.services.values().sum()
    }
}

/// Inclusive calendar-date range driving the filtered views
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
