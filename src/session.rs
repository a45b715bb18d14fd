use crate::types::{Role, MAX_SESSION_TTL};
use crate::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

/// Serializable session state that can be persisted and restored.
///
/// This holds everything needed to make authenticated requests without
/// logging in again: the bearer token, who it belongs to, and when it stops
/// being usable. The password is deliberately absent.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WynkSession {
    /// The authenticated user name
    pub username: String,
    /// Which kind of account the token was issued for
    pub role: Role,
    /// Opaque bearer token returned by the login endpoint
    pub token: String,
    /// Base URL of the API that issued the token
    pub base_url: String,
    /// When the token was obtained
    pub issued_at: DateTime<Utc>,
    /// After this instant the session is treated as absent
    pub expires_at: DateTime<Utc>,
}

impl WynkSession {
    /// Create a session issued now that lives for `ttl`, at most [`MAX_SESSION_TTL`].
    pub fn new(
        username: String,
        role: Role,
        token: String,
        base_url: String,
        ttl: Duration,
    ) -> Self {
        let issued_at = Utc::now();
        let expires_at = ChronoDuration::from_std(ttl.min(MAX_SESSION_TTL))
            .ok()
            .and_then(|ttl| issued_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            username,
            role,
            token,
            base_url,
            issued_at,
            expires_at,
        }
    }

    /// Check whether the session has expired at the given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check if this session appears to be valid
    ///
    /// This performs basic validation but doesn't guarantee the token is
    /// still accepted by the server.
    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && !self.token.is_empty() && !self.is_expired()
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Serialize session to JSON string
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize session from JSON string
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Debug for WynkSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WynkSession")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Somewhere to keep the current session between actions.
///
/// The in-memory store mirrors a browser's tab-scoped storage; the file
/// backed [`SessionPersistence`](crate::SessionPersistence) keeps a session
/// across CLI invocations.
pub trait SessionStore {
    /// Load the stored session, if any.
    fn load(&self) -> Result<Option<WynkSession>>;

    /// Replace the stored session.
    fn save(&self, session: &WynkSession) -> Result<()>;

    /// Forget the stored session.
    fn clear(&self) -> Result<()>;

    /// Load the stored session only if it is still usable.
    ///
    /// An expired session is removed from the store.
    fn load_valid(&self) -> Result<Option<WynkSession>> {
        match self.load()? {
            Some(session) if session.is_expired() => {
                log::info!("Stored session for '{}' has expired", session.username);
                self.clear()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }
}

/// Session store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: RwLock<Option<WynkSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<WynkSession>> {
        Ok(self
            .session
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default())
    }

    fn save(&self, session: &WynkSession) -> Result<()> {
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
        Ok(())
    }
}
