//! Data types for the Wynk API and client.
//!
//! This module contains the core data structures used throughout the crate:
//! songs and playlists as the server returns them, request payloads, audio
//! stream results, client configuration and the event system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

// ================================================================================================
// ROLES AND CREDENTIALS
// ================================================================================================

/// The two kinds of account the Wynk API knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses and plays songs, manages playlists.
    #[default]
    Listener,
    /// Uploads and removes their own songs.
    Performer,
}

impl Role {
    /// Path segment used by the registration endpoint (`/wynk/register/{segment}`).
    pub fn register_segment(&self) -> &'static str {
        match self {
            Role::Listener => "user",
            Role::Performer => "singer",
        }
    }

    /// Path of the login endpoint for this role.
    pub fn login_path(&self) -> &'static str {
        match self {
            Role::Listener => "/wynk/login",
            Role::Performer => "/wynk/login/singer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Listener => write!(f, "listener"),
            Role::Performer => write!(f, "performer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "listener" | "user" => Ok(Role::Listener),
            "performer" | "singer" => Ok(Role::Performer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Name and password sent to the register and login endpoints.
///
/// The password only lives as long as this value; it is never stored in a
/// session.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ================================================================================================
// SONGS AND PLAYLISTS
// ================================================================================================

/// A song as listed by the Wynk API.
///
/// # Examples
///
/// ```rust
/// use wynk_client::Song;
///
/// let json = r#"{"id": 7, "songName": "Kesariya", "singerName": "Arijit", "rating": 4.5}"#;
/// let song: Song = serde_json::from_str(json).unwrap();
/// assert_eq!(song.song_name, "Kesariya");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Server side identifier
    pub id: i64,
    /// The song title
    pub song_name: String,
    /// The performer who uploaded the song
    pub singer_name: String,
    /// Average rating; absent ratings read as zero
    #[serde(default)]
    pub rating: f64,
}

/// A listener owned playlist.
///
/// Ownership is by user name rather than id, so the server is the only
/// authority on which playlists belong to whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub playlist_name: String,
    pub user_name: String,
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Playlist {
    /// Whether a song with the given id is a member of this playlist.
    pub fn contains(&self, song_id: i64) -> bool {
        self.songs.iter().any(|song| song.id == song_id)
    }
}

/// Body of `GET /wynk/user/playlist/{id}`; only the songs are used.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaylistSongs {
    #[serde(default)]
    pub songs: Vec<Song>,
}

/// Body of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Error body shape used by the Wynk API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A change to a listener's playlists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistMutation {
    /// `PUT /wynk/user/playlist/addSong`
    AddSong { playlist_id: i64, song_id: i64 },
    /// `DELETE /wynk/user/playlist/removeSong`
    RemoveSong { playlist_id: i64, song_id: i64 },
    /// `POST /wynk/user/addPlaylist`, creating a playlist seeded with one song
    Create {
        name: String,
        user_name: String,
        song_id: i64,
    },
}

impl PlaylistMutation {
    /// The playlist this mutation touches, when it already exists.
    pub fn playlist_id(&self) -> Option<i64> {
        match self {
            PlaylistMutation::AddSong { playlist_id, .. }
            | PlaylistMutation::RemoveSong { playlist_id, .. } => Some(*playlist_id),
            PlaylistMutation::Create { .. } => None,
        }
    }
}

/// JSON body of the create playlist endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewPlaylistBody<'a> {
    pub name: &'a str,
    pub user_name: &'a str,
    pub song_id: i64,
}

// ================================================================================================
// UPLOADS AND STREAMING
// ================================================================================================

/// Placeholder runtime sent with uploads when none is known.
pub const DEFAULT_RUNTIME: &str = "10";

/// A song file to upload as a performer.
#[derive(Clone, PartialEq, Eq)]
pub struct SongUpload {
    /// Title of the song
    pub name: String,
    /// Runtime field of the multipart form
    pub runtime: String,
    /// Performer name the song is filed under
    pub singer_name: String,
    /// File name reported in the multipart part
    pub file_name: String,
    /// MIME type of the file part
    pub content_type: String,
    /// Raw audio bytes
    pub bytes: Vec<u8>,
}

impl SongUpload {
    pub fn new(
        name: impl Into<String>,
        singer_name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            name: name.into(),
            runtime: DEFAULT_RUNTIME.to_string(),
            singer_name: singer_name.into(),
            content_type: mime_type_for_file(Path::new(&file_name)).to_string(),
            file_name,
            bytes,
        }
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }
}

impl fmt::Debug for SongUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SongUpload")
            .field("name", &self.name)
            .field("runtime", &self.runtime)
            .field("singer_name", &self.singer_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Get MIME type for an audio file from its extension.
pub fn mime_type_for_file(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("mp3") => "audio/mpeg",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("wav") => "audio/wav",
        Some("m4a") | Some("aac") => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// An HTTP byte range, rendered as a `Range` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// The open range `bytes=0-`, i.e. the whole file.
    pub fn from_start() -> Self {
        Self {
            start: 0,
            end: None,
        }
    }

    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

impl Default for ByteRange {
    fn default() -> Self {
        Self::from_start()
    }
}

/// Audio bytes returned by the stream endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioStream {
    pub song_id: i64,
    /// 200 for a full body, 206 for partial content
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AudioStream {
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }
}

impl fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioStream")
            .field("song_id", &self.song_id)
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

// ================================================================================================
// CLIENT CONFIGURATION
// ================================================================================================

/// Default API location used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default lifetime of a session issued at login.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Longest session lifetime the config accepts (one year).
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Client configuration shared by the library and the CLI.
///
/// Every request goes to the same `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the Wynk API, without a trailing slash
    pub base_url: String,
    /// How long a freshly issued session is considered valid
    pub session_ttl: Duration,
    /// External program used to play audio, if any
    pub player_command: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
            player_command: None,
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from `WYNK_BASE_URL`, `WYNK_SESSION_TTL_SECS` and `WYNK_PLAYER`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("WYNK_BASE_URL") {
            if !url.trim().is_empty() {
                config = config.with_base_url(url);
            }
        }
        if let Ok(ttl) = std::env::var("WYNK_SESSION_TTL_SECS") {
            match parse_session_ttl(&ttl) {
                Some(session_ttl) => config = config.with_session_ttl(session_ttl),
                None => log::warn!("Ignoring invalid WYNK_SESSION_TTL_SECS value '{ttl}'"),
            }
        }
        if let Ok(player) = std::env::var("WYNK_PLAYER") {
            if !player.trim().is_empty() {
                config.player_command = Some(player);
            }
        }
        config
    }

    /// Set the API base URL; a trailing slash is dropped
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the session lifetime, capped at [`MAX_SESSION_TTL`]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        if ttl > MAX_SESSION_TTL {
            log::warn!(
                "Session lifetime of {}s exceeds the maximum, using {}s",
                ttl.as_secs(),
                MAX_SESSION_TTL.as_secs()
            );
        }
        self.session_ttl = ttl.min(MAX_SESSION_TTL);
        self
    }

    /// Set the external player program
    pub fn with_player_command(mut self, command: impl Into<String>) -> Self {
        self.player_command = Some(command.into());
        self
    }
}

fn parse_session_ttl(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

// ================================================================================================
// EVENT SYSTEM
// ================================================================================================

/// Request information for client events
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET, POST, etc.)
    pub method: String,
    /// The full URI being requested
    pub uri: String,
    /// Query parameters as key-value pairs
    pub query_params: Vec<(String, String)>,
    /// Path without query parameters
    pub path: String,
}

impl RequestInfo {
    /// Create RequestInfo from a parsed URL and method
    pub fn from_url_and_method(url: &http_types::Url, method: &str) -> Self {
        Self {
            method: method.to_string(),
            uri: url.to_string(),
            query_params: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            path: url.path().to_string(),
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        let mut desc = format!("{} {}", self.method, self.path);
        if !self.query_params.is_empty() {
            let params: Vec<String> = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            desc.push_str(&format!("?{}", params.join("&")));
        }
        desc
    }
}

/// Event type to describe client activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Request completed with a response
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// A session was established by login or restored
    SessionStarted { username: String, role: Role },
    /// The session was dropped (logout, expiry or rejection by the server)
    SessionCleared { username: String, reason: String },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Type alias for the watch receiver
pub type ClientEventWatcher = watch::Receiver<Option<ClientEvent>>;

/// Shared event broadcasting state that persists across client clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Watch the most recent event
    pub fn watch(&self) -> ClientEventWatcher {
        self.last_event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

// ================================================================================================
// TESTS
// ================================================================================================
