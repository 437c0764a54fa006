//! Report format detection and normalization
//!
//! A fetched report arrives in one of two shapes: the internal normalized
//! schema, or a raw Cost Explorer `GetCostAndUsage` response. The shape is
//! resolved exactly once at ingestion into the `RawReport` tagged union;
//! nothing downstream re-checks it.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::types::{CostboardError, DayRecord, NormalizedReport, ReportMetadata, Result};

/// A fetched report document, shape resolved at deserialization time.
///
/// Variant order encodes the detection order: an input with a `data` array is
/// already normalized; otherwise one with `ResultsByTime` is a Cost Explorer
/// response; anything else is rejected.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawReport {
    Normalized(NormalizedReport),
    CostExplorer(CostExplorerResponse),
}

/// Cost Explorer `GetCostAndUsage` response (the fields we consume)
#[derive(Debug, Deserialize)]
pub struct CostExplorerResponse {
    #[serde(rename = "ResultsByTime")]
    results_by_time: Vec<ResultByTime>,
    #[serde(rename = "ResponseMetadata")]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResultByTime {
    #[serde(rename = "TimePeriod")]
    time_period: TimePeriod,
    #[serde(rename = "Groups", default)]
    groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct TimePeriod {
    #[serde(rename = "Start")]
    start: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct Group {
    #[serde(rename = "Keys")]
    keys: Vec<String>,
    #[serde(rename = "Metrics")]
    metrics: Metrics,
}

#[derive(Debug, Deserialize)]
struct Metrics {
    #[serde(rename = "UnblendedCost")]
    unblended_cost: MetricValue,
}

#[derive(Debug, Deserialize)]
struct MetricValue {
    #[serde(rename = "Amount")]
    amount: String,
}

/// Parse raw report bytes into a shape-resolved `RawReport`.
/// simd-json mutates the buffer in place.
pub fn parse_document(bytes: &mut [u8]) -> Result<RawReport> {
    simd_json::from_slice(bytes).map_err(|_| {
        CostboardError::InvalidFormat(
            "input matches neither the normalized nor the Cost Explorer schema".into(),
        )
    })
}

/// Convert a shape-resolved report into the normalized schema.
///
/// Already-normalized input passes through unchanged, including its own
/// `last_updated`. Cost Explorer input is transformed; its `last_updated`
/// is the transform time, not anything the provider reported.
pub fn normalize(raw: RawReport) -> Result<NormalizedReport> {
    match raw {
        RawReport::Normalized(report) => Ok(report),
        RawReport::CostExplorer(resp) => transform(resp),
    }
}

/// Parse and normalize in one step, rejecting reports with no cost data.
/// This is the single ingestion point for fetched documents.
pub fn normalize_document(bytes: &mut [u8]) -> Result<NormalizedReport> {
    let report = normalize(parse_document(bytes)?)?;
    if report.data.is_empty() {
        return Err(CostboardError::InvalidFormat(
            "report contains no cost data".into(),
        ));
    }
    Ok(report)
}

fn transform(resp: CostExplorerResponse) -> Result<NormalizedReport> {
    let now = Utc::now();
    let mut data = Vec::with_capacity(resp.results_by_time.len());

    for period in resp.results_by_time {
        // The period's start date identifies the day (End is exclusive)
        let mut day = DayRecord {
            date: period.time_period.start,
            services: Default::default(),
        };

        for group in period.groups {
            let service = group.keys.first().ok_or_else(|| {
                CostboardError::InvalidFormat(format!(
                    "group with no service key on {}",
                    period.time_period.start
                ))
            })?;

            let cost: f64 = group.metrics.unblended_cost.amount.parse().map_err(|_| {
                CostboardError::InvalidFormat(format!(
                    "unparseable cost amount '{}' for {}",
                    group.metrics.unblended_cost.amount, service
                ))
            })?;

            // Zero-cost entries are dropped, and negatives (credits and
            // refunds) with them
            if cost > 0.0 {
                day.services.insert(service.clone(), cost);
            }
        }

        if !day.services.is_empty() {
            data.push(day);
        }
    }

    let metadata = resp.response_metadata.map(|meta| ReportMetadata {
        request_id: meta.request_id,
        timestamp: now,
    });

    Ok(NormalizedReport {
        last_updated: now,
        data,
        metadata,
    })
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(rename = "RequestId")]
    request_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<RawReport> {
        let mut bytes = json.as_bytes().to_vec();
        parse_document(&mut bytes)
    }

    fn normalize_str(json: &str) -> Result<NormalizedReport> {
        normalize(parse(json)?)
    }

    const COST_EXPLORER_SAMPLE: &str = r#"{
        "ResultsByTime": [
            {
                "TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"},
                "Groups": [
                    {"Keys": ["Amazon EC2"], "Metrics": {"UnblendedCost": {"Amount": "10.50", "Unit": "USD"}}},
                    {"Keys": ["Amazon S3"], "Metrics": {"UnblendedCost": {"Amount": "0", "Unit": "USD"}}}
                ]
            }
        ],
        "ResponseMetadata": {"RequestId": "abc-123"}
    }"#;

    // ========== Format detection tests ==========

    #[test]
    fn test_detect_normalized_passthrough() {
        let json = r#"{
            "lastUpdated": "2024-01-20T08:00:00Z",
            "data": [{"date": "2024-01-15", "services": {"Amazon EC2": 10.5}}]
        }"#;
        let report = normalize_str(json).unwrap();
        // Pass-through keeps the input's own freshness stamp
        assert_eq!(report.last_updated.to_rfc3339(), "2024-01-20T08:00:00+00:00");
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].date.to_string(), "2024-01-15");
    }

    #[test]
    fn test_detect_cost_explorer() {
        assert!(matches!(
            parse(COST_EXPLORER_SAMPLE).unwrap(),
            RawReport::CostExplorer(_)
        ));
    }

    #[test]
    fn test_unrecognized_shape_rejected() {
        let err = parse(r#"{"rows": [1, 2, 3]}"#).unwrap_err();
        assert!(matches!(err, CostboardError::InvalidFormat(_)));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(parse("not json at all").is_err());
    }

    // ========== Transform tests ==========

    #[test]
    fn test_transform_uses_period_start_date() {
        let report = normalize_str(COST_EXPLORER_SAMPLE).unwrap();
        assert_eq!(report.data[0].date.to_string(), "2024-01-15");
    }

    #[test]
    fn test_zero_cost_service_dropped() {
        let report = normalize_str(COST_EXPLORER_SAMPLE).unwrap();
        let services = &report.data[0].services;
        assert_eq!(services.len(), 1);
        assert!((services["Amazon EC2"] - 10.50).abs() < f64::EPSILON);
        assert!(!services.contains_key("Amazon S3"));
    }

    #[test]
    fn test_negative_cost_dropped() {
        // Credits and refunds fall out of the cost > 0 filter
        let json = r#"{
            "ResultsByTime": [{
                "TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"},
                "Groups": [
                    {"Keys": ["Credit"], "Metrics": {"UnblendedCost": {"Amount": "-4.20"}}},
                    {"Keys": ["Amazon EC2"], "Metrics": {"UnblendedCost": {"Amount": "1.00"}}}
                ]
            }]
        }"#;
        let report = normalize_str(json).unwrap();
        assert_eq!(report.data[0].services.len(), 1);
        assert!(!report.data[0].services.contains_key("Credit"));
    }

    #[test]
    fn test_empty_day_dropped() {
        let json = r#"{
            "ResultsByTime": [
                {
                    "TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"},
                    "Groups": [{"Keys": ["Amazon S3"], "Metrics": {"UnblendedCost": {"Amount": "0"}}}]
                },
                {
                    "TimePeriod": {"Start": "2024-01-16", "End": "2024-01-17"},
                    "Groups": [{"Keys": ["Amazon EC2"], "Metrics": {"UnblendedCost": {"Amount": "2.50"}}}]
                }
            ]
        }"#;
        let report = normalize_str(json).unwrap();
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.data[0].date.to_string(), "2024-01-16");
    }

    #[test]
    fn test_day_with_no_groups_dropped() {
        let json = r#"{
            "ResultsByTime": [{"TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"}}]
        }"#;
        let report = normalize_str(json).unwrap();
        assert!(report.data.is_empty());
    }

    #[test]
    fn test_metadata_propagated_with_fresh_timestamp() {
        let before = Utc::now();
        let report = normalize_str(COST_EXPLORER_SAMPLE).unwrap();
        let meta = report.metadata.unwrap();
        assert_eq!(meta.request_id, "abc-123");
        assert!(meta.timestamp >= before);
    }

    #[test]
    fn test_metadata_omitted_when_absent() {
        let json = r#"{
            "ResultsByTime": [{
                "TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"},
                "Groups": [{"Keys": ["Amazon EC2"], "Metrics": {"UnblendedCost": {"Amount": "1.00"}}}]
            }]
        }"#;
        let report = normalize_str(json).unwrap();
        assert!(report.metadata.is_none());
    }

    #[test]
    fn test_last_updated_is_transform_time() {
        let before = Utc::now();
        let report = normalize_str(COST_EXPLORER_SAMPLE).unwrap();
        assert!(report.last_updated >= before);
        assert!(report.last_updated <= Utc::now());
    }

    #[test]
    fn test_unparseable_amount_rejected() {
        let json = r#"{
            "ResultsByTime": [{
                "TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"},
                "Groups": [{"Keys": ["Amazon EC2"], "Metrics": {"UnblendedCost": {"Amount": "ten dollars"}}}]
            }]
        }"#;
        let err = normalize_str(json).unwrap_err();
        assert!(err.to_string().contains("unparseable cost amount"));
    }

    #[test]
    fn test_group_without_keys_rejected() {
        let json = r#"{
            "ResultsByTime": [{
                "TimePeriod": {"Start": "2024-01-15", "End": "2024-01-16"},
                "Groups": [{"Keys": [], "Metrics": {"UnblendedCost": {"Amount": "1.00"}}}]
            }]
        }"#;
        let err = normalize_str(json).unwrap_err();
        assert!(err.to_string().contains("no service key"));
    }

    // ========== normalize_document tests ==========

    #[test]
    fn test_normalize_document_rejects_empty_report() {
        let mut bytes = br#"{"ResultsByTime": []}"#.to_vec();
        let err = normalize_document(&mut bytes).unwrap_err();
        assert!(err.to_string().contains("no cost data"));
    }

    #[test]
    fn test_normalize_document_full_pipeline() {
        let mut bytes = COST_EXPLORER_SAMPLE.as_bytes().to_vec();
        let report = normalize_document(&mut bytes).unwrap();
        assert_eq!(report.data.len(), 1);
    }
}
