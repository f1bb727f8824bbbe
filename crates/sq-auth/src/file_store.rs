use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::errors::{AuthError, Result};
use crate::session::Session;
use crate::store::SessionStore;

/// Number of fields in a session record
const RECORD_FIELDS: usize = 4;

/// File-based session store
///
/// The record is four lines of plain text in fixed order:
///
/// ```text
/// <access token>
/// <refresh token>
/// <access-token expiry, epoch milliseconds>
/// <refresh-token expiry, epoch milliseconds>
/// ```
///
/// Writes go to a temp file that is synced and renamed over the record,
/// so a crash mid-write never leaves a truncated record behind. A missing
/// or empty file reads as [`AuthError::SessionNotFound`]; a record that
/// exists but cannot be parsed reads as [`AuthError::SessionCorrupt`].
///
/// No locking is done. The store assumes at most one process per record
/// location.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default record location for the current platform
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("", "", "sqlway")
            .ok_or(AuthError::ConfigDirUnavailable)?;

        Ok(project_dirs.config_dir().join("session"))
    }

    /// The file this store reads and writes
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(content: &str) -> Result<Session> {
        // An empty file is an absent session, not a corrupt one
        if content.trim().is_empty() {
            return Err(AuthError::SessionNotFound);
        }

        let fields: Vec<&str> = content.lines().map(str::trim).collect();
        if fields.len() < RECORD_FIELDS {
            return Err(AuthError::SessionCorrupt {
                reason: format!("expected {} fields, found {}", RECORD_FIELDS, fields.len()),
            });
        }

        // Fields past the fourth are ignored, like the line readers that
        // consumed this format before us
        Ok(Session {
            access_token: token_field(fields[0], "access token")?,
            refresh_token: token_field(fields[1], "refresh token")?,
            access_token_expires: expiry_field(fields[2], "access-token expiry")?,
            refresh_token_expires: expiry_field(fields[3], "refresh-token expiry")?,
        })
    }

    fn render(session: &Session) -> String {
        format!(
            "{}\n{}\n{}\n{}\n",
            session.access_token,
            session.refresh_token,
            session.access_token_expires.timestamp_millis(),
            session.refresh_token_expires.timestamp_millis()
        )
    }
}

fn token_field(value: &str, name: &str) -> Result<String> {
    if value.is_empty() {
        return Err(AuthError::SessionCorrupt {
            reason: format!("empty {} field", name),
        });
    }
    Ok(value.to_string())
}

fn expiry_field(value: &str, name: &str) -> Result<DateTime<Utc>> {
    let millis: i64 = value.parse().map_err(|_| AuthError::SessionCorrupt {
        reason: format!("{} is not an integer: {:?}", name, value),
    })?;

    DateTime::from_timestamp_millis(millis).ok_or_else(|| AuthError::SessionCorrupt {
        reason: format!("{} is out of range: {}", name, millis),
    })
}

#[async_trait::async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Session> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::SessionNotFound);
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(&content)
    }

    async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, Self::render(session)).await?;

        // Sync to disk
        let file = std::fs::File::open(&temp_path)?;
        file.sync_all()?;

        // Atomic rename
        fs::rename(&temp_path, &self.path).await?;

        // Set secure permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
