use reqwest::StatusCode;
use thiserror::Error;

pub use sq_keys::KeyError;

/// Error types for authentication and session handling
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: StatusCode,
        body_snippet: String,
    },

    #[error("Token rejected: {body_snippet}")]
    Unauthorized { body_snippet: String },

    #[error("No session record found")]
    SessionNotFound,

    #[error("Session record is corrupt: {reason}")]
    SessionCorrupt { reason: String },

    #[error("Identity record is corrupt: {reason}")]
    IdentityCorrupt { reason: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Could not determine a config directory")]
    ConfigDirUnavailable,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, AuthError>;
