use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::systems::SystemId;

/// Convenient result alias for the evepath library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Static dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Static dataset exists but is not a valid systems table.
    #[error("failed to parse dataset at {path}: {source}")]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Raised when a request carries a missing or non-positive system id.
    #[error("invalid {field} system id: {value}")]
    InvalidSystemId { field: &'static str, value: SystemId },

    /// Raised when a system name could not be found in the dataset.
    #[error("unknown system name: {name}{}", format_suggestions(.suggestions))]
    UnknownSystem {
        name: String,
        suggestions: Vec<String>,
    },

    /// The solver reached the goal but could not walk the predecessor chain
    /// back to the start. Indicates a bug in merging or solving.
    #[error("route from {start} to {goal} is broken: no predecessor recorded for {at}")]
    BrokenRoute {
        start: SystemId,
        goal: SystemId,
        at: SystemId,
    },

    /// Upstream answered with a non-success HTTP status.
    #[error("{source_name} responded with status {status}")]
    UpstreamStatus {
        source_name: &'static str,
        status: reqwest::StatusCode,
    },

    /// Upstream answered but refused access to the connection data.
    #[error("{source_name} denied access to connection data")]
    UpstreamAccessDenied { source_name: &'static str },

    /// Upstream did not answer within the configured bound.
    #[error("{source_name} did not respond within {timeout:?}")]
    UpstreamTimeout {
        source_name: &'static str,
        timeout: Duration,
    },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// `true` for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidSystemId { .. } | Error::UnknownSystem { .. }
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
