//! CSV and JSON export of derived views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::types::{DateRange, DayRecord, NormalizedReport, Result, WeekRecord};

/// JSON export payload: the filtered view plus its provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportPayload {
    #[serde(rename = "lastUpdated")]
    pub last_updated: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "dateRange")]
    pub date_range: DateRange,
    pub data: Vec<DayRecord>,
}

impl ExportPayload {
    pub fn new(report: &NormalizedReport, range: DateRange, filtered: &[DayRecord]) -> Self {
        Self {
            last_updated: report.last_updated,
            date_range: range,
            data: filtered.to_vec(),
        }
    }
}

/// Write the weekly rollup as CSV.
///
/// Header: `Week Start,Week End,<service...>,Total` over the full service
/// list; costs fixed to 2 decimals; a service absent from a week prints 0.00.
/// The row total sums the week's own services, not just the listed columns.
pub fn write_weekly_csv<W: Write>(
    writer: W,
    weeks: &[WeekRecord],
    services: &[String],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Week Start".to_string(), "Week End".to_string()];
    header.extend(services.iter().cloned());
    header.push("Total".to_string());
    csv_writer.write_record(&header)?;

    for week in weeks {
        let mut row = vec![week.start_date.to_string(), week.end_date.to_string()];
        for service in services {
            let cost = week.services.get(service).copied().unwrap_or(0.0);
            row.push(format!("{cost:.2}"));
        }
        row.push(format!("{:.2}", week.total()));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the JSON payload, pretty-printed.
pub fn write_json<W: Write>(mut writer: W, payload: &ExportPayload) -> Result<()> {
    let json = serde_json::to_string_pretty(payload)?;
    writer.write_all(json.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Default CSV filename for the given day, e.g. `weekly-costs-2024-01-15.csv`
pub fn csv_filename(today: NaiveDate) -> String {
    format!("weekly-costs-{today}.csv")
}

/// Default JSON filename for the given day, e.g. `cost-data-2024-01-15.json`
pub fn json_filename(today: NaiveDate) -> String {
    format!("cost-data-{today}.json")
}
