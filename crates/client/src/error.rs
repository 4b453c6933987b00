//! Request error taxonomy
//!
//! Every failure a backend call can produce is one `RequestError`. The
//! transport notifies the user at the point of detection and then returns the
//! error so the caller can react, e.g. the session controller tearing down the
//! credential on [`RequestError::Unauthenticated`].
//!
//! Messages never contain the bearer token or the password digest.

use std::fmt;

/// Text shown for an HTTP 401 or an envelope carrying code 401
pub const MSG_UNAUTHENTICATED: &str = "Unauthorized, please log in again";
pub const MSG_FORBIDDEN: &str = "Access denied";
pub const MSG_NOT_FOUND: &str = "Request error, resource not found";
pub const MSG_SERVER_ERROR: &str = "Internal server error";

/// Coarse classification of a [`RequestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkError,
    HttpError,
    ApplicationError,
    Unauthenticated,
    ValidationError,
    DecodeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NetworkError => "network",
            Self::HttpError => "http",
            Self::ApplicationError => "application",
            Self::Unauthenticated => "unauthenticated",
            Self::ValidationError => "validation",
            Self::DecodeError => "decode",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// No response was received (connect failure, timeout, reset)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Non-2xx status other than 401
    #[error("{message}")]
    Http { status: u16, message: String },

    /// 2xx status but the envelope code is not a success sentinel
    #[error("{message}")]
    Application { code: i64, message: String },

    /// HTTP 401, or a 2xx envelope carrying code 401. `message` is the
    /// server's reason when the envelope gave one.
    #[error("{}", .message.as_deref().unwrap_or(MSG_UNAUTHENTICATED))]
    Unauthenticated { message: Option<String> },

    /// Client-side input check failed before anything was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// 2xx body that is not the expected envelope or lacks a required payload
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RequestError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkError,
            Self::Http { .. } => ErrorKind::HttpError,
            Self::Application { .. } => ErrorKind::ApplicationError,
            Self::Unauthenticated { .. } => ErrorKind::Unauthenticated,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Decode(_) => ErrorKind::DecodeError,
        }
    }

    /// HTTP status when the failure came from a non-2xx reply
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Unauthenticated { .. } => Some(401),
            _ => None,
        }
    }

    /// Text suitable for a transient user notification
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Rejected credential reported inside a 2xx envelope
    pub fn from_envelope_unauthenticated(message: &str) -> Self {
        let message = message.trim();
        Self::Unauthenticated {
            message: (!message.is_empty()).then(|| message.to_string()),
        }
    }

    /// Build the error for a non-2xx HTTP status.
    ///
    /// Known statuses use the fixed table; others fall back to the
    /// server-supplied message, then to a generic transport text.
    pub fn from_status(status: u16, server_message: Option<&str>) -> Self {
        let message = match status {
            401 => return Self::Unauthenticated { message: None },
            403 => MSG_FORBIDDEN.to_string(),
            404 => MSG_NOT_FOUND.to_string(),
            500 => MSG_SERVER_ERROR.to_string(),
            _ => server_message
                .filter(|m| !m.trim().is_empty())
                .map_or_else(
                    || format!("Request failed with status code {status}"),
                    ToString::to_string,
                ),
        };
        Self::Http { status, message }
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
