//! Error types for the Janus gateway.
//!
//! No error in the interception pipeline is fatal at the process level:
//! every variant here maps to a well-formed HTTP response. A misconfigured
//! introspection endpoint shows up as persistent 503s, not a crash.

use thiserror::Error;

/// Gateway-wide errors.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// The introspection authority could not be reached or answered with
    /// something unusable.
    #[error("Auth service unreachable: {message}")]
    AuthUnreachable {
        /// Error message.
        message: String,
    },

    /// Upstream application error during request forwarding.
    #[error("Upstream error: {message}")]
    Upstream {
        /// Error message.
        message: String,
        /// Optional HTTP status code from upstream.
        status: Option<u16>,
    },

    /// Server startup error.
    #[error("Server error: {message}")]
    Server {
        /// Error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] http::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GateError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an auth-unreachable error.
    pub fn auth_unreachable(message: impl Into<String>) -> Self {
        Self::AuthUnreachable {
            message: message.into(),
        }
    }

    /// Create an upstream error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            status: None,
        }
    }

    /// Create an upstream error with status code.
    pub fn upstream_with_status(message: impl Into<String>, status: u16) -> Self {
        Self::Upstream {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Create a server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config { .. } | Self::Server { .. } | Self::Io(_) => 500,
            Self::AuthUnreachable { .. } => 503,
            Self::Upstream { status, .. } => status.unwrap_or(502),
            Self::Http(_) | Self::Json(_) => 400,
        }
    }

    /// Get the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::AuthUnreachable { .. } => "auth",
            Self::Upstream { .. } => "upstream",
            Self::Server { .. } => "server",
            Self::Io(_) => "io",
            Self::Http(_) => "http",
            Self::Json(_) => "json",
        }
    }
}

/// Result type for gateway operations.
pub type GateResult<T> = Result<T, GateError>;

/// JSON body for short-circuit responses.
///
/// Every rejection the gate produces carries this shape, e.g.
/// `{"detail": "Session expired"}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    /// Human-readable detail message.
    pub detail: String,
}

impl ErrorBody {
    /// Create a new error body.
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.detail)
    }
}
