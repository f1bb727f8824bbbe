//! Discovery and SQL endpoint client for the sqlway data platform.
//!
//! Thin wrappers over the platform's `discover/*` and `sql/*` endpoints.
//! The interesting machinery lives in `sq-auth`: this crate only consumes
//! the session it persists, presenting the stored access token as a bearer
//! credential on every call. Mutating SQL calls additionally pass through
//! a caller-supplied Biscuit capability token the SDK never interprets.
//!
//! Responses come back as raw [`serde_json::Value`]s. The platform's
//! result schemas are not modeled here.

pub mod client;
pub mod errors;
pub mod models;
pub mod validate;

pub use client::PlatformClient;
pub use errors::{ClientError, Result};
pub use models::{DqlRequest, SqlRequest};
