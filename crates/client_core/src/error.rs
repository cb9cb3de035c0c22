use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned HTTP {status}: {message}")]
    Status {
        path: String,
        status: u16,
        message: String,
    },
    #[error("could not decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} did not respond within {after_ms}ms")]
    Timeout { path: String, after_ms: u64 },
    #[error("invalid service url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl FetchError {
    pub fn timeout(path: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            path: path.into(),
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport { source, .. } if source.is_timeout() => FetchErrorKind::Timeout,
            FetchError::Transport { .. } => FetchErrorKind::Unreachable,
            FetchError::Status { .. } => FetchErrorKind::Server,
            FetchError::Decode { .. } => FetchErrorKind::Decode,
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::InvalidUrl { .. } => FetchErrorKind::Configuration,
        }
    }
}

/// Coarse failure class used to pick the remediation hint shown with a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Unreachable,
    Timeout,
    Server,
    Decode,
    Configuration,
}

impl FetchErrorKind {
    pub fn hint(self, origin: &str) -> String {
        match self {
            FetchErrorKind::Unreachable => {
                format!("Check that the recommendation service is reachable at {origin}.")
            }
            FetchErrorKind::Timeout => {
                format!("The service at {origin} did not answer in time; press refresh to retry.")
            }
            FetchErrorKind::Server => {
                format!("The service at {origin} reported an error; check its logs and retry.")
            }
            FetchErrorKind::Decode => format!(
                "The service at {origin} returned an unexpected payload; check the backend version."
            ),
            FetchErrorKind::Configuration => {
                "Fix the configured API base URL and restart the dashboard.".to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
