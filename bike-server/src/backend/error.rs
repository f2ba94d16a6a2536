//! Backend client error types.

use std::fmt;

/// Errors from the bike-share backend HTTP client.
#[derive(Debug)]
pub enum BackendError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Backend answered with an error status or an `{"error": ...}` body
    Api { status: u16, message: String },

    /// Rate limited by the backend
    RateLimited,

    /// Backend refused the request
    Unauthorized,

    /// The request could not be built (bad URL, bad parameters)
    InvalidRequest(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "HTTP error: {e}"),
            BackendError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            BackendError::Api { status, message } => {
                write!(f, "API error {status}: {message}")
            }
            BackendError::RateLimited => write!(f, "rate limited by backend"),
            BackendError::Unauthorized => write!(f, "unauthorized by backend"),
            BackendError::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Http(err)
    }
}
