//! Authentication and session lifecycle for the sqlway data platform.
//!
//! The platform issues short-lived bearer tokens in exchange for a signed,
//! single-use auth code. This crate implements that cycle end to end:
//!
//! 1. Request an auth code for the configured user
//! 2. Sign it with the client's Ed25519 identity (see `sq-keys`)
//! 3. Exchange code and signature for an access/refresh token pair
//! 4. Persist the pair and rotate it as the expiries approach
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sq_auth::{AuthConfig, FileSessionStore, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::new(
//!         "https://api.example.net/v1/".parse()?,
//!         "user1",
//!         "abc",
//!         "join_code_1",
//!     );
//!
//!     let store = Arc::new(FileSessionStore::new(FileSessionStore::default_path()?));
//!     let mut manager = SessionManager::new(config, store).await?;
//!
//!     let session = manager.authenticate().await?;
//!     println!("access token expires at {}", session.access_token_expires);
//!
//!     // Later, before each batch of API calls
//!     let (_session, action) = manager.rotate_tokens().await?;
//!     println!("rotation action: {:?}", action);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Session storage
//!
//! The persisted record is the SDK's only durable session state: four
//! lines of plain text holding the token pair and its absolute expiries in
//! epoch milliseconds. [`SessionStore`] is the seam for swapping backends;
//! [`FileSessionStore`] is the default and [`MemorySessionStore`] serves
//! tests and embedded use.
//!
//! # Errors
//!
//! Expected remote failures come back as [`AuthError`] values, never
//! panics. [`AuthError::Unauthorized`] is the cue to rotate or
//! re-authenticate. [`AuthError::SessionNotFound`] and
//! [`AuthError::SessionCorrupt`] mean the local record is unusable, so a
//! network retry will not help.

pub mod client;
pub mod config;
pub mod errors;
pub mod file_store;
pub mod identity;
pub mod manager;
pub mod models;
pub mod session;
pub mod store;
pub mod validate;

pub use client::AuthClient;
pub use config::{AuthConfig, HttpTimeouts, DEFAULT_SCHEME, MIN_TOKEN_LIFETIME};
pub use errors::{AuthError, Result};
pub use file_store::FileSessionStore;
pub use manager::{rotation_action, RotationAction, SessionManager};
pub use models::{TokenIdentity, TokenRequest, TokenResponse};
pub use session::Session;
pub use store::{MemorySessionStore, SessionStore};
