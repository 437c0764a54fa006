//! Report fetch service
//!
//! One blocking GET per run. There is no retry or refresh; a failed fetch is
//! terminal for the session.

use std::time::Duration;

use crate::types::{CostboardError, NormalizedReport, Result};

use super::normalizer;

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Fetch the report at `url` and normalize it.
pub fn fetch_report(url: &str) -> Result<NormalizedReport> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?;

    let response = client.get(url).send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(CostboardError::Network(format!(
            "report fetch returned {status}"
        )));
    }

    let mut bytes = response.bytes()?.to_vec();
    normalizer::normalize_document(&mut bytes)
}
