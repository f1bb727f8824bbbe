use reqwest::StatusCode;
use thiserror::Error;

pub use sq_auth::AuthError;

/// Error types for discovery and SQL calls
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error {status}: {body_snippet}")]
    Http {
        status: StatusCode,
        body_snippet: String,
    },

    #[error("Token rejected: {body_snippet}")]
    Unauthorized { body_snippet: String },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
