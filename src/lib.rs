//! Client for the Wynk music streaming API.
//!
//! [`WynkClientImpl`] talks to the HTTP API through any
//! [`http_client::HttpClient`]. The [`auth`] and [`dashboard`] controllers hold
//! the form and list state of each view and call the client through the
//! [`WynkClient`] trait, so they can be driven by a mock in tests.

pub mod auth;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod headers;
pub mod multipart;
pub mod playback;
pub mod session;
pub mod session_persistence;
pub mod r#trait;
pub mod types;

pub use auth::{AuthMode, AuthPage, Route};
pub use client::WynkClientImpl;
pub use dashboard::{ListenerDashboard, PerformerDashboard, UploadFile, UploadForm};
pub use error::WynkError;
pub use playback::{
    AudioOutput, CommandOutput, NullOutput, PlaybackHandle, PlaybackState, Player,
};
pub use r#trait::WynkClient;
pub use session::{MemorySessionStore, SessionStore, WynkSession};
pub use session_persistence::SessionPersistence;
pub use types::{
    AudioStream, ByteRange, ClientConfig, ClientEvent, ClientEventReceiver, ClientEventWatcher,
    Credentials, MAX_SESSION_TTL, Playlist, PlaylistMutation, RequestInfo, Role, SharedEventBroadcaster, Song,
    SongUpload,
};

#[cfg(feature = "mock")]
pub use r#trait::MockWynkClient;

pub type Result<T> = std::result::Result<T, WynkError>;
