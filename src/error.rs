//! Error types for the cable modem to InfluxDB2 forwarder.
//!
//! Each stage of the scrape pipeline has its own error enum so callers can
//! decide which failures are page-scoped, which zero a single field and which
//! abort the event half of a poll.

use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type that encompasses all application errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// Modem communication errors
    #[error("modem error")]
    Modem(#[from] ModemError),

    /// Metric collection errors
    #[error("collector error")]
    Collector(#[from] CollectorError),

    /// InfluxDB storage errors
    #[error("storage error")]
    Storage(#[from] StorageError),

    /// Event log file errors
    #[error("event log error")]
    Sink(#[from] SinkError),

    /// Generic errors that don't fit other categories
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Transport-level failures talking to the modem's management pages.
///
/// These are always scoped to a single page fetch: they are counted and
/// logged, and the page contributes zero records to the snapshot.
#[derive(Error, Debug)]
pub enum ModemError {
    /// HTTP request failed (connection refused, reset, body read error)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication failed (401)
    #[error("authentication failed: invalid credentials")]
    AuthFailed,

    /// Server returned an error status
    #[error("server error (status {status}): {message}")]
    ServerError { status: u16, message: String },

    /// Network timeout
    #[error("request timed out after {0} seconds")]
    Timeout(u64),
}

/// Markup and value parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Table or element not present in the response body
    #[error("markup not found: {selector}")]
    MarkupNotFound { selector: String },

    /// Invalid CSS selector
    #[error("invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// Cell content does not match the expected numeric pattern
    #[error("failed to parse number from '{text}': {message}")]
    NumberParse { text: String, message: String },

    /// Event timestamp is neither a datetime nor the sentinel
    #[error("failed to parse date/time from '{text}': {message}")]
    DateTimeParse { text: String, message: String },

    /// Embedded XML fragment does not match its fixed schema
    #[error("failed to parse <{tag}> fragment: {message}")]
    Schema { tag: String, message: String },
}

/// Metric collection errors.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// The poll task panicked or was cancelled by the runtime
    #[error("poll of '{endpoint}' did not complete: {message}")]
    PollAborted { endpoint: String, message: String },
}

/// InfluxDB storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// InfluxDB client error
    #[error("InfluxDB error: {0}")]
    Client(#[from] influxdb2::RequestError),

    /// Invalid data point
    #[error("invalid data point: {0}")]
    InvalidDataPoint(String),
}

/// Event log file errors.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Opening, writing or syncing the log file failed
    #[error("failed to append to event log {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl std::fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ModemError {
    /// Creates a server error from HTTP status and response body.
    pub fn server_error(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            Self::AuthFailed
        } else {
            Self::ServerError {
                status: status.as_u16(),
                message: body,
            }
        }
    }
}

impl ParseError {
    /// Creates a markup not found error.
    pub fn markup_not_found(selector: impl Into<String>) -> Self {
        Self::MarkupNotFound {
            selector: selector.into(),
        }
    }

    /// Creates an invalid selector error.
    pub fn invalid_selector(selector: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: err.to_string(),
        }
    }

    /// Creates a number parse error.
    pub fn number_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::NumberParse {
            text: text.into(),
            message: err.to_string(),
        }
    }

    /// Creates a datetime parse error.
    pub fn datetime_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DateTimeParse {
            text: text.into(),
            message: err.to_string(),
        }
    }

    /// Creates a schema parse error for an embedded fragment.
    pub fn schema(tag: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Schema {
            tag: tag.into(),
            message: err.to_string(),
        }
    }
}

impl CollectorError {
    /// Creates a poll aborted error.
    pub fn poll_aborted(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::PollAborted {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }
}

impl SinkError {
    /// Wraps an I/O error with the path of the log file.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
