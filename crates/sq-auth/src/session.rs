use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, Result};
use crate::models::TokenResponse;

/// An authenticated session: the token pair and its expiry instants.
///
/// Expiries arrive from the token endpoint as absolute epoch milliseconds
/// and are kept verbatim. Remaining lifetime is always computed as
/// `expiry - now`; no duration is ever re-anchored to the local clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires: DateTime<Utc>,
    pub refresh_token_expires: DateTime<Utc>,
}

impl Session {
    /// Build a session from a token endpoint response
    pub fn from_token_response(response: TokenResponse) -> Result<Self> {
        Ok(Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            access_token_expires: expiry_from_millis(response.access_token_expires)?,
            refresh_token_expires: expiry_from_millis(response.refresh_token_expires)?,
        })
    }

    /// Remaining access-token lifetime at `now`. Negative once expired.
    pub fn access_remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.access_token_expires - now
    }

    /// Remaining refresh-token lifetime at `now`. Negative once expired.
    pub fn refresh_remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.refresh_token_expires - now
    }
}

fn expiry_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| AuthError::InvalidResponse(format!("expiry out of range: {}", millis)))
}
