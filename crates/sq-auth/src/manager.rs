use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use sq_keys::Keypair;

use crate::client::AuthClient;
use crate::config::{AuthConfig, MIN_TOKEN_LIFETIME};
use crate::errors::Result;
use crate::identity;
use crate::models::{TokenIdentity, TokenRequest};
use crate::session::Session;
use crate::store::SessionStore;
use crate::validate;

/// What a rotation pass did with the stored session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAction {
    /// Both tokens had enough lifetime left; nothing was exchanged
    Reused,
    /// The access token was near expiry; the refresh flow ran
    Refreshed,
    /// Both tokens were near expiry; the full authentication flow ran
    Reauthenticated,
}

/// Pick the rotation action for `session` at `now`.
///
/// The threshold is inclusive: exactly [`MIN_TOKEN_LIFETIME`] remaining
/// already counts as near expiry. A session past its expiry has negative
/// remaining lifetime and lands in the same branch.
pub fn rotation_action(session: &Session, now: DateTime<Utc>) -> RotationAction {
    let min_lifetime = chrono::Duration::from_std(MIN_TOKEN_LIFETIME)
        .unwrap_or_else(|_| chrono::Duration::seconds(120));

    if session.access_remaining(now) > min_lifetime {
        return RotationAction::Reused;
    }

    if session.refresh_remaining(now) > min_lifetime {
        RotationAction::Refreshed
    } else {
        RotationAction::Reauthenticated
    }
}

/// Orchestrates the authentication lifecycle against the platform.
///
/// The manager owns the signing identity. It is resolved once at
/// construction, preferring an explicit keypair from the configuration,
/// then a persisted identity record, then a freshly generated keypair.
/// Every later rotation signs with that same identity unless a caller
/// overrides it through [`SessionManager::authenticate_with_keypair`].
pub struct SessionManager {
    config: AuthConfig,
    client: AuthClient,
    store: Arc<dyn SessionStore>,
    keypair: Keypair,
}

impl SessionManager {
    /// Create a manager, resolving the identity it will sign with
    pub async fn new(mut config: AuthConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let client = AuthClient::new(&config)?;

        let keypair = match config.keypair.take() {
            Some(keypair) => {
                debug!("Using the keypair supplied in the configuration");
                keypair
            }
            None => match &config.identity_path {
                Some(path) => match identity::load(path).await? {
                    Some(keypair) => {
                        debug!(path = %path.display(), "Loaded the persisted identity");
                        keypair
                    }
                    None => {
                        debug!("No persisted identity found, generating a fresh keypair");
                        Keypair::generate()
                    }
                },
                None => {
                    debug!("Identity persistence is disabled, generating a fresh keypair");
                    Keypair::generate()
                }
            },
        };

        Ok(Self {
            config,
            client,
            store,
            keypair,
        })
    }

    /// The base64 public key of the active identity
    pub fn public_key_base64(&self) -> String {
        self.keypair.public_key_base64()
    }

    /// Check whether the configured user identifier is registered
    #[instrument(skip(self))]
    pub async fn user_exists(&self) -> Result<bool> {
        validate::user_id(&self.config.user_id)?;
        self.client.id_exists(&self.config.user_id).await
    }

    /// Run the full authentication flow and persist the resulting session.
    ///
    /// Inputs are checked before any network call. On success the session
    /// record is replaced and, when an identity path is configured, the
    /// keypair that signed is persisted so later runs reuse it.
    #[instrument(skip(self))]
    pub async fn authenticate(&mut self) -> Result<Session> {
        validate::user_id(&self.config.user_id)?;
        validate::subscription(&self.config.prefix, &self.config.join_code)?;

        // Step 1: Request a single-use auth code
        let auth_code = self
            .client
            .auth_code(
                &self.config.user_id,
                &self.config.prefix,
                &self.config.join_code,
            )
            .await?;

        // Step 2: Sign the code with the active identity
        let signed = self.keypair.sign(&auth_code)?;

        // Step 3: Exchange code and signature for a token pair
        let request = TokenRequest {
            user_id: self.config.user_id.clone(),
            auth_code,
            signature: signed.signature_hex,
            key: signed.public_key_base64,
            scheme: self.config.scheme.clone(),
        };
        let tokens = self.client.exchange_token(&request).await?;
        let session = Session::from_token_response(tokens)?;

        // Step 4: Persist the session and the identity that earned it
        self.store.save(&session).await?;
        if let Some(path) = &self.config.identity_path {
            identity::save(path, &self.keypair).await?;
        }

        info!(user_id = %self.config.user_id, "Authenticated");
        Ok(session)
    }

    /// Authenticate with an explicit keypair.
    ///
    /// The keypair becomes the active identity; later rotations sign with
    /// it.
    #[instrument(skip(self, keypair))]
    pub async fn authenticate_with_keypair(&mut self, keypair: Keypair) -> Result<Session> {
        self.keypair = keypair;
        self.authenticate().await
    }

    /// Reuse, refresh or re-authenticate based on remaining token lifetime.
    ///
    /// Returns the session to use and what was done to produce it. With no
    /// stored session this fails with [`crate::AuthError::SessionNotFound`];
    /// call [`SessionManager::authenticate`] first.
    #[instrument(skip(self))]
    pub async fn rotate_tokens(&mut self) -> Result<(Session, RotationAction)> {
        let session = self.store.load().await?;
        let action = rotation_action(&session, Utc::now());

        match action {
            RotationAction::Reused => {
                debug!("Tokens have enough lifetime left, reusing them");
                Ok((session, action))
            }
            RotationAction::Refreshed => {
                debug!("Access token is near expiry, refreshing");
                let session = self.refresh().await?;
                Ok((session, action))
            }
            RotationAction::Reauthenticated => {
                debug!("Refresh token is near expiry too, re-authenticating");
                let session = self.authenticate().await?;
                Ok((session, action))
            }
        }
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// The stored record is only replaced after the exchange succeeds; a
    /// failed call leaves it untouched.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session> {
        let session = self.store.load().await?;

        let tokens = self.client.refresh_token(&session.refresh_token).await?;
        let session = Session::from_token_response(tokens)?;

        self.store.save(&session).await?;
        info!("Refreshed the session tokens");
        Ok(session)
    }

    /// Check the stored access token against the platform.
    ///
    /// [`crate::AuthError::Unauthorized`] here means the platform rejected
    /// the token and a rotation or re-authentication is due.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> Result<TokenIdentity> {
        let session = self.store.load().await?;
        self.client.validate_token(&session.access_token).await
    }

    /// End the session server-side and clear the local record
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let session = self.store.load().await?;

        self.client.logout(&session.refresh_token).await?;
        self.store.clear().await?;

        info!("Logged out and cleared the local session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_expiring_in(access_secs: i64, refresh_secs: i64, now: DateTime<Utc>) -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            access_token_expires: now + chrono::Duration::seconds(access_secs),
            refresh_token_expires: now + chrono::Duration::seconds(refresh_secs),
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_fresh_tokens_are_reused() {
        let now = fixed_now();
        let session = session_expiring_in(3_600, 86_400, now);

        assert_eq!(rotation_action(&session, now), RotationAction::Reused);
    }

    #[test]
    fn test_access_above_threshold_by_one_second_is_reused() {
        let now = fixed_now();
        let session = session_expiring_in(121, 86_400, now);

        assert_eq!(rotation_action(&session, now), RotationAction::Reused);
    }

    #[test]
    fn test_access_exactly_at_threshold_is_refreshed() {
        let now = fixed_now();
        let session = session_expiring_in(120, 86_400, now);

        assert_eq!(rotation_action(&session, now), RotationAction::Refreshed);
    }

    #[test]
    fn test_expired_access_with_live_refresh_is_refreshed() {
        let now = fixed_now();
        let session = session_expiring_in(-10, 86_400, now);

        assert_eq!(rotation_action(&session, now), RotationAction::Refreshed);
    }

    #[test]
    fn test_both_near_expiry_reauthenticates() {
        let now = fixed_now();
        let session = session_expiring_in(50, 50, now);

        assert_eq!(
            rotation_action(&session, now),
            RotationAction::Reauthenticated
        );
    }

    #[test]
    fn test_refresh_exactly_at_threshold_reauthenticates() {
        let now = fixed_now();
        let session = session_expiring_in(30, 120, now);

        assert_eq!(
            rotation_action(&session, now),
            RotationAction::Reauthenticated
        );
    }

    #[test]
    fn test_low_refresh_alone_does_not_trigger_rotation() {
        // Only the access-token lifetime decides whether anything happens
        let now = fixed_now();
        let session = session_expiring_in(3_600, 60, now);

        assert_eq!(rotation_action(&session, now), RotationAction::Reused);
    }
}
