//! Error types for outbound lead delivery.
//!
//! Three failure kinds matter to callers: the lead API answered with an
//! error status, the lead API could not be reached at all, and anything
//! that breaks after the lead was accepted (sheet setup or append). The
//! `Display` impls double as the messages surfaced in the HTTP error
//! envelope, so their wording is part of the wire contract.

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Failure modes of the two outbound sinks.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// The lead API responded with a non-2xx status.
    #[error("TrackDrive API Error: {status} - {status_text}")]
    UpstreamHttp {
        /// HTTP status code returned by the lead API.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// Raw response body, surfaced verbatim to the caller.
        body: String,
    },

    /// No response from the lead API (connect failure or timeout).
    #[error("Network Error: Unable to reach TrackDrive API")]
    UpstreamUnreachable {
        /// Underlying transport error, kept for logs only.
        message: String,
    },

    /// Minting or exchanging the spreadsheet access token failed.
    #[error("sheets authentication failed: {message}")]
    SheetsAuth {
        /// Description of the auth failure.
        message: String,
    },

    /// A spreadsheet operation failed after authentication.
    #[error("sheets operation failed: {message}")]
    Sheets {
        /// Description of the failed operation.
        message: String,
    },

    /// Invalid client configuration.
    #[error("invalid delivery configuration: {message}")]
    Configuration {
        /// Configuration error message.
        message: String,
    },
}

impl DeliveryError {
    /// Creates an upstream HTTP error from a lead API response.
    pub fn upstream_http(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self::UpstreamHttp { status, status_text: status_text.into(), body: body.into() }
    }

    /// Creates an unreachable-upstream error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::UpstreamUnreachable { message: message.into() }
    }

    /// Creates a sheets authentication error.
    pub fn sheets_auth(message: impl Into<String>) -> Self {
        Self::SheetsAuth { message: message.into() }
    }

    /// Creates a sheets operation error.
    pub fn sheets(message: impl Into<String>) -> Self {
        Self::Sheets { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// The upstream HTTP status to propagate, when there is one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}
