use crate::session::{SessionStore, WynkSession};
use crate::{Result, WynkError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Session persistence in the XDG data directory.
///
/// The current session is stored as JSON in
/// `~/.local/share/wynk-client/session.json`. Only the token-bearing
/// [`WynkSession`] is written; credentials never touch the disk.
#[derive(Debug, Clone)]
pub struct SessionPersistence {
    dir: PathBuf,
}

impl SessionPersistence {
    /// Use the default XDG location.
    ///
    /// Returns an error if the XDG data directory cannot be determined.
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            WynkError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine XDG data directory",
            ))
        })?;

        Ok(Self::with_dir(data_dir.join("wynk-client")))
    }

    /// Store the session file under a specific directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the session file.
    pub fn session_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    /// Check if a saved session exists.
    pub fn session_exists(&self) -> bool {
        self.session_path().exists()
    }

    /// Save a session, creating the directory structure as needed.
    pub fn save_session(&self, session: &WynkSession) -> Result<()> {
        let session_path = self.session_path();

        if let Some(parent) = session_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let session_json = session
            .to_json()
            .map_err(|e| WynkError::Parse(format!("Failed to serialize session: {e}")))?;

        let mut file = open_private(&session_path)?;
        file.write_all(session_json.as_bytes())?;
        restrict_permissions(&session_path)?;

        log::debug!("Session saved to: {}", session_path.display());
        Ok(())
    }

    /// Load the saved session, `None` if there is no session file.
    pub fn load_session(&self) -> Result<Option<WynkSession>> {
        let session_path = self.session_path();

        if !session_path.exists() {
            return Ok(None);
        }

        let session_json = fs::read_to_string(&session_path)?;
        let session = WynkSession::from_json(&session_json)
            .map_err(|e| WynkError::Parse(format!("Failed to parse session JSON: {e}")))?;

        log::debug!("Session loaded from: {}", session_path.display());
        Ok(Some(session))
    }

    /// Remove the saved session file if present.
    pub fn remove_session(&self) -> Result<()> {
        let session_path = self.session_path();

        if session_path.exists() {
            fs::remove_file(&session_path)?;
            log::debug!("Session removed from: {}", session_path.display());
        }

        Ok(())
    }
}

impl SessionStore for SessionPersistence {
    fn load(&self) -> Result<Option<WynkSession>> {
        self.load_session()
    }

    fn save(&self, session: &WynkSession) -> Result<()> {
        self.save_session(session)
    }

    fn clear(&self) -> Result<()> {
        self.remove_session()
    }
}

/// Open the session file for writing, created owner-only on unix.
fn open_private(path: &Path) -> Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    Ok(options.open(path)?)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
