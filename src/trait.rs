use crate::session::WynkSession;
use crate::types::{
    AudioStream, ByteRange, Credentials, Playlist, PlaylistMutation, Role, Song, SongUpload,
};
use crate::Result;
use async_trait::async_trait;

/// Trait for Wynk client operations that can be mocked for testing.
///
/// This is the single typed capability set every view controller works
/// against: authenticate, list songs and playlists, mutate playlists,
/// upload, delete and stream songs. Controllers only describe which calls
/// they need; base URL, session and error mapping live behind the trait.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockWynkClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait WynkClient {
    /// Register a new account for the given role.
    async fn register(&self, role: Role, credentials: &Credentials) -> Result<()>;

    /// Log in and make the resulting session current.
    async fn login(&self, role: Role, credentials: &Credentials) -> Result<WynkSession>;

    /// The current session, if one is set and not yet expired.
    fn session(&self) -> Option<WynkSession>;

    /// Make a previously saved session current.
    fn restore_session(&self, session: WynkSession);

    /// Drop the current session.
    fn logout(&self);

    /// Check if the client currently holds a usable session.
    fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    /// Every song on the service.
    async fn list_songs(&self) -> Result<Vec<Song>>;

    /// Playlists owned by `user_name`.
    async fn list_playlists(&self, user_name: &str) -> Result<Vec<Playlist>>;

    /// Songs in a single playlist.
    async fn playlist_songs(&self, playlist_id: i64) -> Result<Vec<Song>>;

    /// Add to, remove from, or create a playlist.
    async fn mutate_playlist(&self, mutation: &PlaylistMutation) -> Result<()>;

    /// Songs uploaded by the performer `singer_name`.
    async fn list_performer_songs(&self, singer_name: &str) -> Result<Vec<Song>>;

    /// Upload a song as the current performer.
    async fn upload_song(&self, upload: &SongUpload) -> Result<()>;

    /// Delete one of the current performer's songs.
    async fn delete_song(&self, song_id: i64) -> Result<()>;

    /// Fetch audio bytes for a song. Only 200 and 206 responses succeed.
    async fn stream_song(&self, song_id: i64, range: ByteRange) -> Result<AudioStream>;
}
