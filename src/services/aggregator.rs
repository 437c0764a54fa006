//! Aggregation engine deriving views from a normalized report
//!
//! Every output here is a pure derivation: recomputed whenever the source
//! data or active range changes, never mutated in place.

use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeSet;

use crate::types::{CostboardError, DateRange, DayRecord, Result, WeekRecord};

/// Aggregator for deriving filtered, weekly, and service views
pub struct Aggregator;

impl Aggregator {
    /// Sorted distinct service names across the given days.
    /// Idempotent and order-stable for unchanged input.
    pub fn services(days: &[DayRecord]) -> Vec<String> {
        let set: BTreeSet<&str> = days
            .iter()
            .flat_map(|day| day.services.keys().map(String::as_str))
            .collect();
        set.into_iter().map(String::from).collect()
    }

    /// Days with `start <= date <= end`, input order preserved.
    /// No matches (including an inverted range) is expected, not an error.
    pub fn filter_by_range(days: &[DayRecord], range: DateRange) -> Vec<DayRecord> {
        days.iter()
            .filter(|day| range.contains(day.date))
            .cloned()
            .collect()
    }

    /// Like `filter_by_range`, but reports an empty result as `EmptyData`.
    /// Callers decide whether that is fatal; the bundled frontends downgrade
    /// it to a warning and render empty views.
    pub fn filter_nonempty(days: &[DayRecord], range: DateRange) -> Result<Vec<DayRecord>> {
        let filtered = Self::filter_by_range(days, range);
        if filtered.is_empty() {
            return Err(CostboardError::EmptyData);
        }
        Ok(filtered)
    }

    /// Group an ordered day sequence into Sunday-start weeks.
    ///
    /// A new week opens whenever a day's computed week start differs from the
    /// current week's; weeks with no days are never synthesized. Each record
    /// spans exactly `[week_start, week_start + 6]` whether or not data covers
    /// the full span. Expects days in date order; out-of-order input can open
    /// the same week twice.
    pub fn group_by_week(days: &[DayRecord]) -> Vec<WeekRecord> {
        let mut weeks: Vec<WeekRecord> = Vec::new();
        let mut current: Option<WeekRecord> = None;

        for day in days {
            let start = Self::week_start(day.date);

            if current.as_ref().map(|w| w.start_date) != Some(start) {
                if let Some(done) = current.take() {
                    weeks.push(done);
                }
                current = Some(WeekRecord {
                    start_date: start,
                    end_date: start.checked_add_days(Days::new(6)).unwrap_or(start),
                    services: Default::default(),
                });
            }

            if let Some(week) = current.as_mut() {
                for (service, cost) in &day.services {
                    *week.services.entry(service.clone()).or_insert(0.0) += cost;
                }
            }
        }

        if let Some(done) = current {
            weeks.push(done);
        }

        weeks
    }

    /// The Sunday on or before the given date
    pub fn week_start(date: NaiveDate) -> NaiveDate {
        let back = date.weekday().num_days_from_sunday() as u64;
        date.checked_sub_days(Days::new(back)).unwrap_or(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, services: &[(&str, f64)]) -> DayRecord {
        DayRecord {
            date: date.parse().unwrap(),
            services: services
                .iter()
                .map(|(name, cost)| (name.to_string(), *cost))
                .collect(),
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(start.parse().unwrap(), end.parse().unwrap())
    }

    // ========== services() tests ==========

    #[test]
    fn test_services_empty() {
        assert!(Aggregator::services(&[]).is_empty());
    }

    #[test]
    fn test_services_sorted_distinct() {
        let days = vec![
            day("2024-01-15", &[("Amazon S3", 1.0), ("Amazon EC2", 2.0)]),
            day("2024-01-16", &[("Amazon EC2", 3.0), ("AWS Lambda", 0.5)]),
        ];
        let services = Aggregator::services(&days);
        assert_eq!(services, vec!["AWS Lambda", "Amazon EC2", "Amazon S3"]);
    }

    #[test]
    fn test_services_idempotent() {
        let days = vec![day("2024-01-15", &[("Amazon S3", 1.0), ("Amazon EC2", 2.0)])];
        assert_eq!(Aggregator::services(&days), Aggregator::services(&days));
    }

    // ========== filter_by_range() tests ==========

    #[test]
    fn test_filter_inclusive_boundaries() {
        let days = vec![
            day("2023-12-31", &[("EC2", 1.0)]),
            day("2024-01-01", &[("EC2", 1.0)]),
            day("2024-01-15", &[("EC2", 1.0)]),
            day("2024-01-31", &[("EC2", 1.0)]),
            day("2024-02-01", &[("EC2", 1.0)]),
        ];
        let filtered = Aggregator::filter_by_range(&days, range("2024-01-01", "2024-01-31"));
        let dates: Vec<String> = filtered.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-15", "2024-01-31"]);
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let days = vec![
            day("2024-01-20", &[("EC2", 1.0)]),
            day("2024-01-10", &[("EC2", 1.0)]),
        ];
        let filtered = Aggregator::filter_by_range(&days, range("2024-01-01", "2024-01-31"));
        assert_eq!(filtered[0].date.to_string(), "2024-01-20");
        assert_eq!(filtered[1].date.to_string(), "2024-01-10");
    }

    #[test]
    fn test_filter_no_match_is_empty() {
        let days = vec![day("2024-01-15", &[("EC2", 1.0)])];
        assert!(Aggregator::filter_by_range(&days, range("2024-03-01", "2024-03-31")).is_empty());
    }

    #[test]
    fn test_filter_inverted_range_is_empty() {
        let days = vec![day("2024-01-15", &[("EC2", 1.0)])];
        assert!(Aggregator::filter_by_range(&days, range("2024-01-31", "2024-01-01")).is_empty());
    }

    #[test]
    fn test_filter_nonempty_reports_empty_data() {
        let days = vec![day("2024-01-15", &[("EC2", 1.0)])];
        let err = Aggregator::filter_nonempty(&days, range("2024-03-01", "2024-03-31")).unwrap_err();
        assert!(matches!(err, CostboardError::EmptyData));

        let filtered =
            Aggregator::filter_nonempty(&days, range("2024-01-01", "2024-01-31")).unwrap();
        assert_eq!(filtered.len(), 1);
    }

    // ========== week_start() tests ==========

    #[test]
    fn test_week_start_sunday_identity() {
        // 2024-01-14 is a Sunday
        let sunday: NaiveDate = "2024-01-14".parse().unwrap();
        assert_eq!(Aggregator::week_start(sunday), sunday);
    }

    #[test]
    fn test_week_start_midweek() {
        // 2024-01-17 is a Wednesday; its week starts Sunday 2024-01-14
        let wed: NaiveDate = "2024-01-17".parse().unwrap();
        assert_eq!(Aggregator::week_start(wed).to_string(), "2024-01-14");
    }

    #[test]
    fn test_week_start_saturday() {
        // 2024-01-20 is a Saturday, last day of the week of 2024-01-14
        let sat: NaiveDate = "2024-01-20".parse().unwrap();
        assert_eq!(Aggregator::week_start(sat).to_string(), "2024-01-14");
    }

    // ========== group_by_week() tests ==========

    #[test]
    fn test_group_by_week_empty() {
        assert!(Aggregator::group_by_week(&[]).is_empty());
    }

    #[test]
    fn test_ten_day_midweek_span_two_weeks() {
        // Wed 2024-01-17 through Fri 2024-01-26: weeks of Jan 14 and Jan 21
        let days: Vec<DayRecord> = (17..=26)
            .map(|d| day(&format!("2024-01-{d:02}"), &[("EC2", 1.0)]))
            .collect();
        let weeks = Aggregator::group_by_week(&days);

        assert_eq!(weeks.len(), 2);
        for week in &weeks {
            assert_eq!(
                week.end_date,
                week.start_date.checked_add_days(Days::new(6)).unwrap()
            );
        }
        assert_eq!(weeks[0].start_date.to_string(), "2024-01-14");
        assert_eq!(weeks[1].start_date.to_string(), "2024-01-21");
        // 4 days (Wed-Sat) in week 1, 6 days (Sun-Fri) in week 2
        assert!((weeks[0].services["EC2"] - 4.0).abs() < f64::EPSILON);
        assert!((weeks[1].services["EC2"] - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_week_sums_per_service() {
        let days = vec![
            day("2024-01-15", &[("EC2", 10.0), ("S3", 1.25)]),
            day("2024-01-16", &[("EC2", 5.0)]),
        ];
        let weeks = Aggregator::group_by_week(&days);
        assert_eq!(weeks.len(), 1);
        assert!((weeks[0].services["EC2"] - 15.0).abs() < f64::EPSILON);
        assert!((weeks[0].services["S3"] - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gap_weeks_not_synthesized() {
        // Days two weeks apart: no empty week in between
        let days = vec![
            day("2024-01-15", &[("EC2", 1.0)]),
            day("2024-01-29", &[("EC2", 1.0)]),
        ];
        let weeks = Aggregator::group_by_week(&days);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].start_date.to_string(), "2024-01-14");
        assert_eq!(weeks[1].start_date.to_string(), "2024-01-28");
    }

    #[test]
    fn test_full_span_even_with_partial_data() {
        // A single Saturday still yields a full Sunday-to-Saturday record
        let days = vec![day("2024-01-20", &[("EC2", 1.0)])];
        let weeks = Aggregator::group_by_week(&days);
        assert_eq!(weeks[0].start_date.to_string(), "2024-01-14");
        assert_eq!(weeks[0].end_date.to_string(), "2024-01-20");
    }

    #[test]
    fn test_unordered_input_reopens_week() {
        // The scan only compares against the current week; out-of-order input
        // produces a second record for the same week rather than merging
        let days = vec![
            day("2024-01-15", &[("EC2", 1.0)]),
            day("2024-01-22", &[("EC2", 1.0)]),
            day("2024-01-16", &[("EC2", 1.0)]),
        ];
        let weeks = Aggregator::group_by_week(&days);
        assert_eq!(weeks.len(), 3);
        assert_eq!(weeks[0].start_date, weeks[2].start_date);
    }
}
