//! Error taxonomy for the Fresh Basket client.
//!
//! Every failure surfaces as a single user-visible message; nothing is
//! retried automatically. The variants mirror how each failure should be
//! presented: a `UserError` is a missing selection, `NotFound` is a catalog
//! lookup miss that keeps the user on the current screen, and `Timeout`
//! means the bounded request window elapsed.

use thiserror::Error;

/// Errors that can occur when talking to the Fresh Basket backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The bounded request timeout elapsed.
    #[error("request timeout - server may not be reachable")]
    Timeout,

    /// JSON parsing of a success body failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found (catalog lookup miss, unknown id).
    #[error("not found: {0}")]
    NotFound(String),

    /// A required user selection is missing; no network call was made.
    #[error("{0}")]
    UserError(String),

    /// Wallet balance does not cover the requested deduction.
    #[error("insufficient wallet balance: {0}")]
    InsufficientBalance(String),

    /// Not logged in, or the backend rejected the session token.
    #[error("not logged in")]
    Unauthenticated,

    /// Non-2xx response; message extracted from the JSON body's
    /// `error`/`message` field, falling back to raw text.
    #[error("backend error ({status}): {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the response body.
        message: String,
    },
}

impl ApiError {
    /// The message to show the user in an alert.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) | Self::Parse(_) => {
                "Something went wrong. Please check your connection and try again.".to_owned()
            }
            Self::Backend { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
