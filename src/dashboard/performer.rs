use super::{forget_rejected_session, resume_session};
use crate::playback::{AudioOutput, PlaybackState, Player};
use crate::session::SessionStore;
use crate::types::{Song, SongUpload, DEFAULT_RUNTIME};
use crate::{Result, WynkClient, WynkError};
use std::path::Path;

/// An audio file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its final path component as the name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                WynkError::InvalidInput(format!("'{}' is not a file", path.display()))
            })?;
        Ok(Self { file_name, bytes })
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Fields of the upload form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub song_name: String,
    pub file: Option<UploadFile>,
    /// Sent as the placeholder runtime when left unset.
    pub runtime: Option<String>,
}

impl UploadForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Song manager for a logged in performer.
pub struct PerformerDashboard<'a, C, S, O>
where
    C: WynkClient + ?Sized,
    S: SessionStore + ?Sized,
    O: AudioOutput,
{
    client: &'a C,
    store: &'a S,
    username: String,
    songs: Vec<Song>,
    player: Player<O>,
    pub form: UploadForm,
}

impl<'a, C, S, O> PerformerDashboard<'a, C, S, O>
where
    C: WynkClient + ?Sized,
    S: SessionStore + ?Sized,
    O: AudioOutput,
{
    /// Open the dashboard for the stored session and load the performer's songs.
    ///
    /// A failed fetch is logged and leaves the list empty.
    pub async fn mount(client: &'a C, store: &'a S, output: O) -> Result<Self> {
        let session = resume_session(client, store)?;
        log::debug!("Mounting performer dashboard for '{}'", session.username);

        let mut dashboard = Self {
            client,
            store,
            username: session.username,
            songs: Vec::new(),
            player: Player::new(output),
            form: UploadForm::default(),
        };

        if let Err(e) = dashboard.refresh_songs().await {
            log::error!("Failed to fetch songs of '{}': {e}", dashboard.username);
        }

        Ok(dashboard)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn player(&self) -> &Player<O> {
        &self.player
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.player.state()
    }

    /// Upload the song described by the form.
    ///
    /// Needs a song name and a file; otherwise nothing is sent. The form is
    /// cleared only when the upload succeeds. Once the server has accepted the
    /// song a failed refetch is logged and the upload still counts as done.
    pub async fn upload(&mut self) -> Result<()> {
        if self.form.song_name.trim().is_empty() {
            return Err(WynkError::InvalidInput(
                "Please enter a song name".to_string(),
            ));
        }
        let Some(file) = &self.form.file else {
            return Err(WynkError::InvalidInput("Please select a file".to_string()));
        };

        let runtime = self
            .form
            .runtime
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_RUNTIME);
        let upload = SongUpload::new(
            self.form.song_name.trim(),
            self.username.clone(),
            file.file_name.clone(),
            file.bytes.clone(),
        )
        .with_runtime(runtime);

        let result = self.client.upload_song(&upload).await;
        self.checked(result)?;

        self.form.clear();
        self.refresh_after_change().await;
        Ok(())
    }

    /// Delete one of the performer's songs, then refetch the list.
    pub async fn delete(&mut self, song_id: i64) -> Result<()> {
        let result = self.client.delete_song(song_id).await;
        self.checked(result)?;
        self.refresh_after_change().await;
        Ok(())
    }

    pub async fn play(&mut self, song_id: i64) -> Result<()> {
        let result = self.player.play(self.client, song_id).await;
        self.checked(result)
    }

    pub fn stop(&mut self) {
        self.player.stop();
    }

    pub fn poll(&mut self) -> bool {
        self.player.poll()
    }

    async fn refresh_after_change(&mut self) {
        if let Err(e) = self.refresh_songs().await {
            log::error!("Failed to refetch songs of '{}': {e}", self.username);
        }
    }

    async fn refresh_songs(&mut self) -> Result<()> {
        let songs = self.checked(self.client.list_performer_songs(&self.username).await)?;
        self.songs = songs;
        Ok(())
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            forget_rejected_session(self.store, e);
        }
        result
    }
}
