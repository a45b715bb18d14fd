use crate::headers;
use crate::multipart::MultipartForm;
use crate::r#trait::WynkClient;
use crate::session::WynkSession;
use crate::types::{
    AudioStream, ByteRange, ClientConfig, ClientEvent, ClientEventReceiver, ClientEventWatcher,
    Credentials, ErrorBody, LoginResponse, NewPlaylistBody, Playlist, PlaylistMutation,
    PlaylistSongs, RequestInfo, Role, SharedEventBroadcaster, Song, SongUpload,
};
use crate::{Result, WynkError};
use async_trait::async_trait;
use http_client::{HttpClient, Request, Response};
use http_types::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::{Arc, RwLock};

/// Auth error text for a successful login response that carried no token.
pub(crate) const MISSING_TOKEN: &str = "Login response did not include a token";

/// Client for the Wynk music streaming API.
///
/// Works with any [`HttpClient`] implementation, talks to a single
/// configurable base URL and keeps the current [`WynkSession`] behind a lock
/// so that every method can take `&self`. Clones share the session and the
/// event broadcaster.
///
/// # Examples
///
/// ```rust,no_run
/// use wynk_client::{Credentials, Role, WynkClient, WynkClientImpl, Result};
///
/// #[tokio::main]
/// async fn main() -> Result<()> {
///     let http_client = http_client::native::NativeClient::new();
///     let client = WynkClientImpl::new(Box::new(http_client));
///
///     client
///         .login(Role::Listener, &Credentials::new("alice", "secret"))
///         .await?;
///     assert!(client.is_logged_in());
///
///     for song in client.list_songs().await? {
///         println!("{} by {}", song.song_name, song.singer_name);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WynkClientImpl {
    client: Arc<dyn HttpClient + Send + Sync>,
    config: ClientConfig,
    session: Arc<RwLock<Option<WynkSession>>>,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl WynkClientImpl {
    /// Create a client with the default configuration.
    pub fn new(client: Box<dyn HttpClient + Send + Sync>) -> Self {
        Self::with_config(client, ClientConfig::default())
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(client: Box<dyn HttpClient + Send + Sync>, config: ClientConfig) -> Self {
        Self {
            client: Arc::from(client),
            config,
            session: Arc::new(RwLock::new(None)),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    /// Create a client that resumes a saved session against the API that issued it.
    pub fn from_session(client: Box<dyn HttpClient + Send + Sync>, session: WynkSession) -> Self {
        let config = ClientConfig::default().with_base_url(session.base_url.clone());
        let client = Self::with_config(client, config);
        client.restore_session(session);
        client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Subscribe to client events.
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    /// Watch the most recent client event.
    pub fn watch_events(&self) -> ClientEventWatcher {
        self.broadcaster.watch()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    fn url(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.config.base_url, path);
        raw.parse::<Url>()
            .map_err(|e| WynkError::InvalidInput(format!("Invalid URL '{raw}': {e}")))
    }

    fn set_session(&self, session: Option<WynkSession>) {
        if let Ok(mut guard) = self.session.write() {
            *guard = session;
        }
    }

    fn clear_session(&self, reason: &str) {
        let previous = self
            .session
            .write()
            .ok()
            .and_then(|mut guard| guard.take());
        if let Some(previous) = previous {
            log::info!("Dropping session for '{}': {reason}", previous.username);
            self.broadcaster.broadcast_event(ClientEvent::SessionCleared {
                username: previous.username,
                reason: reason.to_string(),
            });
        }
    }

    /// The session to authenticate a request with.
    ///
    /// Fails without touching the network when there is no session or it
    /// has expired; an expired session is dropped.
    fn current_session(&self) -> Result<WynkSession> {
        let session = self
            .session
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(WynkError::NotAuthenticated)?;

        if session.is_expired() {
            self.clear_session("session expired");
            return Err(WynkError::SessionExpired);
        }

        Ok(session)
    }

    async fn send(&self, request: Request) -> Result<Response> {
        let request_info =
            RequestInfo::from_url_and_method(request.url(), &request.method().to_string());
        let request_start = std::time::Instant::now();

        log::debug!("Sending {}", request_info.short_description());
        self.broadcaster
            .broadcast_event(ClientEvent::RequestStarted {
                request: request_info.clone(),
            });

        let response = self
            .client
            .send(request)
            .await
            .map_err(|e| WynkError::Http(e.to_string()))?;

        let status_code: u16 = response.status().into();
        log::debug!(
            "{} -> {status_code}",
            request_info.short_description()
        );
        self.broadcaster
            .broadcast_event(ClientEvent::RequestCompleted {
                request: request_info,
                status_code,
                duration_ms: request_start.elapsed().as_millis() as u64,
            });

        Ok(response)
    }

    /// Send a request with the session's bearer token and map failures.
    ///
    /// 401 and 403 drop the session. Any other non-success status becomes
    /// [`WynkError::Status`].
    async fn send_authenticated(&self, mut request: Request) -> Result<Response> {
        let session = self.current_session()?;
        headers::add_auth(&mut request, &session);

        let mut response = self.send(request).await?;
        let status: u16 = response.status().into();

        if status == 401 || status == 403 {
            let message = read_error_message(&mut response).await;
            self.clear_session("token rejected by server");
            return Err(WynkError::Auth(
                message.unwrap_or_else(|| format!("Token rejected with status {status}")),
            ));
        }

        if !response.status().is_success() {
            return Err(status_error(&mut response).await);
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let mut request = Request::new(Method::Get, self.url(path)?);
        headers::add_common_headers(&mut request);
        let _ = request.insert_header("Accept", "application/json");

        let mut response = self.send_authenticated(request).await?;
        read_json(&mut response).await
    }

    async fn send_json_authenticated<B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response> {
        let mut request = Request::new(method, self.url(path)?);
        headers::add_json_headers(&mut request);
        request.set_body(to_json_body(body)?);
        self.send_authenticated(request).await
    }

    async fn send_empty_authenticated(&self, method: Method, path: &str) -> Result<Response> {
        let mut request = Request::new(method, self.url(path)?);
        headers::add_common_headers(&mut request);
        self.send_authenticated(request).await
    }
}

impl std::fmt::Debug for WynkClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WynkClientImpl")
            .field("config", &self.config)
            .field(
                "session",
                &self.session.read().ok().and_then(|guard| guard.clone()),
            )
            .finish()
    }
}

#[async_trait(?Send)]
impl WynkClient for WynkClientImpl {
    async fn register(&self, role: Role, credentials: &Credentials) -> Result<()> {
        let path = format!("/wynk/register/{}", role.register_segment());
        let mut request = Request::new(Method::Post, self.url(&path)?);
        headers::add_json_headers(&mut request);
        request.set_body(to_json_body(credentials)?);

        log::debug!("Registering {role} '{}'", credentials.name);
        let mut response = self.send(request).await?;

        if response.status().is_success() {
            log::info!("Registered {role} '{}'", credentials.name);
            Ok(())
        } else {
            Err(status_error(&mut response).await)
        }
    }

    async fn login(&self, role: Role, credentials: &Credentials) -> Result<WynkSession> {
        let mut request = Request::new(Method::Post, self.url(role.login_path())?);
        headers::add_json_headers(&mut request);
        request.set_body(to_json_body(credentials)?);

        let mut response = self.send(request).await?;
        log::debug!("Login response status: {}", response.status());

        if !response.status().is_success() {
            return Err(status_error(&mut response).await);
        }

        let body = response
            .body_string()
            .await
            .map_err(|e| WynkError::Http(e.to_string()))?;
        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| WynkError::Parse(format!("Invalid login response: {e}")))?;

        let token = match login.token.filter(|token| !token.is_empty()) {
            Some(token) => token,
            None => {
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.message)
                    .filter(|m| !m.is_empty());
                return Err(WynkError::Auth(
                    message.unwrap_or_else(|| MISSING_TOKEN.to_string()),
                ));
            }
        };

        let session = WynkSession::new(
            credentials.name.clone(),
            role,
            token,
            self.config.base_url.clone(),
            self.config.session_ttl,
        );

        log::info!("Logged in as {role} '{}'", session.username);
        self.set_session(Some(session.clone()));
        self.broadcaster
            .broadcast_event(ClientEvent::SessionStarted {
                username: session.username.clone(),
                role,
            });

        Ok(session)
    }

    fn session(&self) -> Option<WynkSession> {
        self.current_session().ok()
    }

    fn restore_session(&self, session: WynkSession) {
        let username = session.username.clone();
        let role = session.role;
        self.set_session(Some(session));
        self.broadcaster
            .broadcast_event(ClientEvent::SessionStarted { username, role });
    }

    fn logout(&self) {
        self.clear_session("logged out");
    }

    async fn list_songs(&self) -> Result<Vec<Song>> {
        self.get_json("/wynk/user/song").await
    }

    async fn list_playlists(&self, user_name: &str) -> Result<Vec<Playlist>> {
        let path = format!(
            "/wynk/user/playlist/getuser/{}",
            urlencoding::encode(user_name)
        );
        self.get_json(&path).await
    }

    async fn playlist_songs(&self, playlist_id: i64) -> Result<Vec<Song>> {
        let playlist: PlaylistSongs = self
            .get_json(&format!("/wynk/user/playlist/{playlist_id}"))
            .await?;
        Ok(playlist.songs)
    }

    async fn mutate_playlist(&self, mutation: &PlaylistMutation) -> Result<()> {
        log::debug!("Applying playlist mutation {mutation:?}");
        match mutation {
            PlaylistMutation::AddSong {
                playlist_id,
                song_id,
            } => {
                let path = format!(
                    "/wynk/user/playlist/addSong?playlistId={playlist_id}&songId={song_id}"
                );
                self.send_empty_authenticated(Method::Put, &path).await?;
            }
            PlaylistMutation::RemoveSong {
                playlist_id,
                song_id,
            } => {
                let path = format!(
                    "/wynk/user/playlist/removeSong?playlistId={playlist_id}&songId={song_id}"
                );
                self.send_empty_authenticated(Method::Delete, &path).await?;
            }
            PlaylistMutation::Create {
                name,
                user_name,
                song_id,
            } => {
                if name.trim().is_empty() {
                    return Err(WynkError::InvalidInput(
                        "Playlist name must not be empty".to_string(),
                    ));
                }
                let body = NewPlaylistBody {
                    name,
                    user_name,
                    song_id: *song_id,
                };
                self.send_json_authenticated(Method::Post, "/wynk/user/addPlaylist", &body)
                    .await?;
            }
        }
        Ok(())
    }

    async fn list_performer_songs(&self, singer_name: &str) -> Result<Vec<Song>> {
        let path = format!("/wynk/singer/getall/{}", urlencoding::encode(singer_name));
        self.get_json(&path).await
    }

    async fn upload_song(&self, upload: &SongUpload) -> Result<()> {
        if upload.name.trim().is_empty() {
            return Err(WynkError::InvalidInput(
                "Song name must not be empty".to_string(),
            ));
        }
        if upload.file_name.is_empty() {
            return Err(WynkError::InvalidInput("No file selected".to_string()));
        }

        let form = MultipartForm::new()
            .text("name", &upload.name)
            .text("runtime", &upload.runtime)
            .text("singerName", &upload.singer_name)
            .file(
                "file",
                &upload.file_name,
                &upload.content_type,
                &upload.bytes,
            );

        let mut request = Request::new(Method::Post, self.url("/wynk/singer/addsong")?);
        headers::add_common_headers(&mut request);
        let _ = request.insert_header("Content-Type", form.content_type());
        request.set_body(form.into_bytes().await?);

        log::debug!(
            "Uploading '{}' ({} bytes) for '{}'",
            upload.name,
            upload.bytes.len(),
            upload.singer_name
        );
        self.send_authenticated(request).await?;
        log::info!("Uploaded '{}'", upload.name);
        Ok(())
    }

    async fn delete_song(&self, song_id: i64) -> Result<()> {
        self.send_empty_authenticated(
            Method::Delete,
            &format!("/wynk/singer/removesong/{song_id}"),
        )
        .await?;
        log::info!("Deleted song {song_id}");
        Ok(())
    }

    async fn stream_song(&self, song_id: i64, range: ByteRange) -> Result<AudioStream> {
        let mut request = Request::new(
            Method::Get,
            self.url(&format!("/wynk/user/stream/{song_id}"))?,
        );
        headers::add_stream_headers(&mut request, range);

        let mut response = self.send_authenticated(request).await?;
        let status: u16 = response.status().into();
        if status != 200 && status != 206 {
            return Err(WynkError::Status {
                status,
                message: Some("Unexpected status for audio stream".to_string()),
            });
        }

        let content_type = response
            .header("Content-Type")
            .map(|values| values.as_str().to_string());
        let bytes = response
            .body_bytes()
            .await
            .map_err(|e| WynkError::Http(e.to_string()))?;

        log::debug!(
            "Fetched {} bytes of audio for song {song_id} (status {status})",
            bytes.len()
        );

        Ok(AudioStream {
            song_id,
            status,
            content_type,
            bytes,
        })
    }
}

fn to_json_body<B: serde::Serialize + ?Sized>(body: &B) -> Result<String> {
    serde_json::to_string(body)
        .map_err(|e| WynkError::Parse(format!("Failed to serialize request body: {e}")))
}

async fn read_json<T: DeserializeOwned>(response: &mut Response) -> Result<T> {
    let body = response
        .body_string()
        .await
        .map_err(|e| WynkError::Http(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| WynkError::Parse(e.to_string()))
}

/// The `message` field of an error body, if the body is JSON and has one.
async fn read_error_message(response: &mut Response) -> Option<String> {
    let body = response.body_string().await.ok()?;
    serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

async fn status_error(response: &mut Response) -> WynkError {
    let status: u16 = response.status().into();
    let message = read_error_message(response).await;
    log::debug!("Request failed with status {status}: {message:?}");
    WynkError::Status { status, message }
}
