//! Persistence for the client's signing identity.
//!
//! The platform ties table ownership to the public key that authenticated,
//! so losing the private key means losing write access. After the first
//! successful authentication the keypair is written to disk and reloaded
//! on later runs instead of generating a fresh one.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use sq_keys::Keypair;

use crate::errors::{AuthError, Result};

/// Identity record format version
const IDENTITY_VERSION: u32 = 1;

/// On-disk form of the signing keypair
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// Base64-encoded public key
    pub public_key: String,
    /// Base64-encoded private key
    pub private_key: String,
}

impl std::fmt::Debug for StoredIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredIdentity")
            .field("version", &self.version)
            .field("created_at", &self.created_at)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Get the default identity record location for the current platform
pub fn default_path() -> Result<PathBuf> {
    let project_dirs =
        directories::ProjectDirs::from("", "", "sqlway").ok_or(AuthError::ConfigDirUnavailable)?;

    Ok(project_dirs.config_dir().join("identity.json"))
}

/// Load the persisted keypair, if any.
///
/// A missing record is `Ok(None)`. A record that exists but does not parse,
/// or whose public key does not match its private key, is
/// [`AuthError::IdentityCorrupt`].
pub async fn load(path: &Path) -> Result<Option<Keypair>> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let stored: StoredIdentity =
        serde_json::from_str(&content).map_err(|e| AuthError::IdentityCorrupt {
            reason: format!("invalid identity record: {}", e),
        })?;

    let keypair = Keypair::from_base64(&stored.private_key).map_err(|e| {
        AuthError::IdentityCorrupt {
            reason: format!("invalid private key: {}", e),
        }
    })?;

    if keypair.public_key_base64() != stored.public_key.trim() {
        return Err(AuthError::IdentityCorrupt {
            reason: "public key does not match the private key".to_string(),
        });
    }

    Ok(Some(keypair))
}

/// Persist `keypair` at `path`, replacing any previous record
pub async fn save(path: &Path, keypair: &Keypair) -> Result<()> {
    let stored = StoredIdentity {
        version: IDENTITY_VERSION,
        created_at: Utc::now(),
        public_key: keypair.public_key_base64(),
        private_key: keypair.private_key_base64(),
    };
    let json = serde_json::to_string_pretty(&stored)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    // Atomic write: write to temp file, then rename
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, json).await?;

    // Sync to disk
    let file = std::fs::File::open(&temp_path)?;
    file.sync_all()?;

    // Atomic rename
    fs::rename(&temp_path, path).await?;

    // Set secure permissions (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
