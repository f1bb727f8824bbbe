use thiserror::Error;

/// Errors from decoding key material or signing.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("message to sign must not be empty")]
    EmptyMessage,

    #[error("key material is not valid base64: {0}")]
    InvalidKeyEncoding(#[from] base64::DecodeError),

    #[error("expected a 32-byte ed25519 key, got {actual} bytes")]
    InvalidKeyLength { actual: usize },

    #[error("signature encoded to {actual} hex characters, expected 128")]
    MalformedSignature { actual: usize },
}

pub type Result<T> = std::result::Result<T, KeyError>;
