//! Typed error hierarchy for the ws1-sheet-sync crate.
//!
//! `SyncError` maps one variant to each external boundary the pipeline
//! crosses: the token endpoint, the MDM device API, the destination sheet,
//! and the configuration file. Every variant carries enough context for the
//! operator to see which stage aborted the run and why.
//!
//! - `Auth` covers the OAuth client-credentials exchange. It aborts the run
//!   before the destination is touched.
//! - `Api` covers non-success responses from the MDM REST API and keeps the
//!   raw response body, which is where Workspace ONE puts its error codes.
//! - `Sheet` covers the destination (Google Sheets API or any other
//!   `RowDestination`).
//! - `Parse` and `Network` wrap `serde_json` and `reqwest` failures that do
//!   not belong to a more specific boundary.
//!
//! Records whose `LastSeen` cannot be parsed are not errors. The filter
//! excludes and counts them instead.

use reqwest::StatusCode;

/// Unified error type for all ws1-sheet-sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Authentication failure at the OAuth token endpoint.
    ///
    /// This covers:
    /// - Non-2xx responses from the token endpoint (bad client id/secret,
    ///   disabled OAuth client). The message includes the status and body.
    /// - Network failures reaching the token endpoint.
    /// - A 2xx response that has no usable `access_token`.
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description, including HTTP status and body when
        /// available.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The MDM API returned a non-success HTTP status code.
    #[error("API error {status}: {body}")]
    Api {
        /// The HTTP status code returned by the MDM API.
        status: StatusCode,
        /// The raw response body text, or an empty string if unreadable.
        body: String,
    },

    /// The destination sheet rejected a read, clear, or write.
    #[error("sheet error: {message}")]
    Sheet {
        /// What the writer was doing and what the destination answered.
        message: String,
        /// HTTP status when the destination is reached over HTTP.
        status: Option<StatusCode>,
    },

    /// The configuration file is missing, unreadable, or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON deserialization failed when parsing an API response body.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A network-level failure (DNS, TCP, TLS, request timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SyncError {
    /// Shorthand for an `Auth` error without an underlying cause.
    pub fn auth(message: impl Into<String>) -> Self {
        SyncError::Auth {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a `Sheet` error.
    pub fn sheet(message: impl Into<String>, status: Option<StatusCode>) -> Self {
        SyncError::Sheet {
            message: message.into(),
            status,
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, SyncError>;
