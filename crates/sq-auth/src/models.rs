use serde::{Deserialize, Serialize};

/// Request body for `POST auth/code`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCodeRequest {
    pub user_id: String,
    pub prefix: String,
    pub join_code: String,
}

/// Response from `POST auth/code`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCodeResponse {
    pub auth_code: String,
}

/// Request body for `POST auth/token`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub user_id: String,
    /// The single-use code issued by `auth/code`
    pub auth_code: String,
    /// Hex-encoded signature over the auth code
    pub signature: String,
    /// Base64 public key the signature verifies against
    pub key: String,
    pub scheme: String,
}

/// Token pair issued by `POST auth/token` and `POST auth/refresh`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute access-token expiry in epoch milliseconds
    pub access_token_expires: i64,
    /// Absolute refresh-token expiry in epoch milliseconds
    pub refresh_token_expires: i64,
}

/// Response from `GET auth/validtoken`: who the access token belongs to
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenIdentity {
    pub user_id: String,
}
