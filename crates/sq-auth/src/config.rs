use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use sq_keys::Keypair;

/// Auth endpoint paths, resolved against the configured base URL
pub mod endpoints {
    pub const ID_EXISTS: &str = "auth/idexists";
    pub const AUTH_CODE: &str = "auth/code";
    pub const TOKEN: &str = "auth/token";
    pub const VALID_TOKEN: &str = "auth/validtoken";
    pub const REFRESH: &str = "auth/refresh";
    pub const LOGOUT: &str = "auth/logout";
}

/// Signature scheme submitted with the token exchange
pub const DEFAULT_SCHEME: &str = "ed25519";

/// Tokens with this much lifetime left (or less) are rotated
pub const MIN_TOKEN_LIFETIME: Duration = Duration::from_secs(120);

/// HTTP timeout configuration
#[derive(Debug, Clone)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(15),
            request: Duration::from_secs(30),
        }
    }
}

/// Configuration for the auth client and session manager
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the platform API, e.g. `https://api.example.net/v1/`
    pub base_url: Url,
    /// User identifier to authenticate as
    pub user_id: String,
    /// Subscription prefix paired with the join code
    pub prefix: String,
    /// Join code for the subscription named by `prefix`
    pub join_code: String,
    /// Signature scheme identifier
    pub scheme: String,
    /// Explicit signing identity. When `None`, a persisted identity is
    /// loaded from `identity_path` or a fresh keypair is generated.
    pub keypair: Option<Keypair>,
    /// Where the identity record lives. `None` disables persistence.
    pub identity_path: Option<PathBuf>,
    /// HTTP timeouts
    pub http_timeouts: HttpTimeouts,
    /// Custom user agent (optional)
    pub user_agent: Option<String>,
}

impl AuthConfig {
    /// Create a configuration with default scheme and timeouts
    pub fn new(
        base_url: Url,
        user_id: impl Into<String>,
        prefix: impl Into<String>,
        join_code: impl Into<String>,
    ) -> Self {
        Self {
            base_url,
            user_id: user_id.into(),
            prefix: prefix.into(),
            join_code: join_code.into(),
            scheme: DEFAULT_SCHEME.to_string(),
            keypair: None,
            identity_path: None,
            http_timeouts: HttpTimeouts::default(),
            user_agent: None,
        }
    }

    /// Use an explicit keypair instead of a persisted or generated one
    pub fn with_keypair(mut self, keypair: Keypair) -> Self {
        self.keypair = Some(keypair);
        self
    }

    /// Persist the identity at `path` after a successful authentication
    pub fn with_identity_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_path = Some(path.into());
        self
    }
}
