//! Errors raised while fetching or rendering a report.

use reqwest::StatusCode;
use thiserror::Error;

use crate::model::ReportKind;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse response from {url}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response is missing a value for `{0}`")]
    MissingField(&'static str),

    #[error("Requested {requested} periods but the forecast only has {available}")]
    NotEnoughPeriods { requested: usize, available: usize },

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("No observation stations found near {0}")]
    NoStation(String),

    #[error("The {0} report is not implemented")]
    Unsupported(ReportKind),
}

impl ForecastError {
    /// Whether the failure came from the network or the upstream service
    /// rather than from the data it returned.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}
