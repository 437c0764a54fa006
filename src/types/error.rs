use thiserror::Error;

/// costboard error types
#[derive(Error, Debug)]
pub enum CostboardError {
    /// Report fetch failed or returned a non-success status
    #[error("network error: {0}")]
    Network(String),

    /// Input matched neither the normalized nor the Cost Explorer schema,
    /// or a recognized report carried no usable cost data
    #[error("invalid report format: {0}")]
    InvalidFormat(String),

    /// Valid report, but no days qualified after filtering
    #[error("no cost data in the selected range")]
    EmptyData,

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CostboardError {
    fn from(err: reqwest::Error) -> Self {
        CostboardError::Network(err.to_string())
    }
}

/// Result type alias for costboard
pub type Result<T> = std::result::Result<T, CostboardError>;
