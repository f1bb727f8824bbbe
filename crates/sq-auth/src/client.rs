use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::config::{endpoints, AuthConfig};
use crate::errors::{AuthError, Result};
use crate::models::*;

/// Client for the platform's auth endpoints
///
/// One method per endpoint, no retries. Auth codes are single-use, so a
/// failed token exchange surfaces immediately instead of being retried
/// with a stale code.
#[derive(Debug, Clone)]
pub struct AuthClient {
    base_url: Url,
    http: Client,
}

impl AuthClient {
    /// Create a new auth client
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(config.http_timeouts.connect)
            .timeout(config.http_timeouts.request)
            .user_agent(config.user_agent.as_deref().unwrap_or("sqlway"))
            .build()?;

        Ok(Self {
            base_url: config.base_url.clone(),
            http,
        })
    }

    /// Check whether a user identifier is already registered
    #[instrument(skip(self))]
    pub async fn id_exists(&self, user_id: &str) -> Result<bool> {
        let url = self
            .base_url
            .join(&format!("{}/{}", endpoints::ID_EXISTS, user_id))?;

        debug!("Checking whether the user identifier is registered");
        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Http {
                status,
                body_snippet: body.chars().take(200).collect(),
            });
        }

        let exists: bool = response.json().await?;
        Ok(exists)
    }

    /// Request a single-use auth code for the user
    #[instrument(skip(self, join_code))]
    pub async fn auth_code(&self, user_id: &str, prefix: &str, join_code: &str) -> Result<String> {
        let request = AuthCodeRequest {
            user_id: user_id.to_string(),
            prefix: prefix.to_string(),
            join_code: join_code.to_string(),
        };

        debug!("Requesting an auth code");
        let response = self
            .http
            .post(self.base_url.join(endpoints::AUTH_CODE)?)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Http {
                status,
                body_snippet: body.chars().take(200).collect(),
            });
        }

        let code: AuthCodeResponse = response.json().await?;
        Ok(code.auth_code)
    }

    /// Exchange a signed auth code for an access/refresh token pair
    #[instrument(skip(self, request))]
    pub async fn exchange_token(&self, request: &TokenRequest) -> Result<TokenResponse> {
        debug!("Exchanging the signed auth code for tokens");
        let response = self
            .http
            .post(self.base_url.join(endpoints::TOKEN)?)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(200).collect();

            // A rejected signature or expired code comes back as 401
            if status == StatusCode::UNAUTHORIZED {
                return Err(AuthError::Unauthorized { body_snippet });
            }

            return Err(AuthError::Http {
                status,
                body_snippet,
            });
        }

        let tokens: TokenResponse = response.json().await?;
        Ok(tokens)
    }

    /// Ask the platform who the access token belongs to
    #[instrument(skip(self, access_token))]
    pub async fn validate_token(&self, access_token: &str) -> Result<TokenIdentity> {
        debug!("Validating the access token");
        let response = self
            .http
            .get(self.base_url.join(endpoints::VALID_TOKEN)?)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(200).collect();

            if status == StatusCode::UNAUTHORIZED {
                return Err(AuthError::Unauthorized { body_snippet });
            }

            return Err(AuthError::Http {
                status,
                body_snippet,
            });
        }

        let identity: TokenIdentity = response.json().await?;
        Ok(identity)
    }

    /// Exchange the refresh token for a new token pair
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        debug!("Refreshing the token pair");
        let response = self
            .http
            .post(self.base_url.join(endpoints::REFRESH)?)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", refresh_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(200).collect();

            if status == StatusCode::UNAUTHORIZED {
                return Err(AuthError::Unauthorized { body_snippet });
            }

            return Err(AuthError::Http {
                status,
                body_snippet,
            });
        }

        let tokens: TokenResponse = response.json().await?;
        Ok(tokens)
    }

    /// Invalidate the session server-side
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        debug!("Logging out");
        let response = self
            .http
            .post(self.base_url.join(endpoints::LOGOUT)?)
            .header("Accept", "application/json")
            .header("Authorization", format!("Bearer {}", refresh_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body_snippet: String = body.chars().take(200).collect();

            if status == StatusCode::UNAUTHORIZED {
                return Err(AuthError::Unauthorized { body_snippet });
            }

            return Err(AuthError::Http {
                status,
                body_snippet,
            });
        }

        Ok(())
    }
}
