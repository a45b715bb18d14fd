//! Audio playback of streamed songs.
//!
//! Fetched audio is materialised as a [`PlaybackHandle`], a temporary file
//! that is deleted when the handle is released or dropped. A [`Player`] owns
//! at most one handle at a time and hands it to an [`AudioOutput`].

use crate::types::{AudioStream, ByteRange};
use crate::{Result, WynkClient};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tempfile::NamedTempFile;

/// Audio bytes of one song, backed by a temporary file.
#[derive(Debug)]
pub struct PlaybackHandle {
    song_id: i64,
    content_type: Option<String>,
    len: usize,
    file: NamedTempFile,
}

impl PlaybackHandle {
    /// Write the stream to a new temporary file.
    pub fn from_stream(stream: &AudioStream) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("wynk-{}-", stream.song_id))
            .suffix(extension_for(stream.content_type.as_deref()))
            .tempfile()?;
        file.write_all(&stream.bytes)?;
        file.flush()?;

        log::debug!(
            "Materialised song {} at {}",
            stream.song_id,
            file.path().display()
        );

        Ok(Self {
            song_id: stream.song_id,
            content_type: stream.content_type.clone(),
            len: stream.bytes.len(),
            file,
        })
    }

    pub fn song_id(&self) -> i64 {
        self.song_id
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Copy the audio to a permanent location.
    pub fn save_to(&self, destination: &Path) -> Result<u64> {
        Ok(std::fs::copy(self.path(), destination)?)
    }

    /// Delete the backing file now, reporting any error.
    pub fn release(self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.file.close()?;
        log::debug!("Released {}", path.display());
        Ok(())
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    let essence = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .unwrap_or_default();
    match essence {
        "audio/mpeg" | "audio/mp3" => ".mp3",
        "audio/flac" => ".flac",
        "audio/ogg" => ".ogg",
        "audio/opus" => ".opus",
        "audio/wav" | "audio/x-wav" => ".wav",
        "audio/mp4" | "audio/aac" => ".m4a",
        _ => ".audio",
    }
}

/// Where the player is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing loaded
    #[default]
    Idle,
    /// Waiting for the audio of a song
    Fetching { song_id: i64 },
    /// A handle is current and has been handed to the output
    Playing { song_id: i64 },
}

/// Something that can play a materialised song.
pub trait AudioOutput {
    /// Start playing the handle's file.
    fn start(&mut self, handle: &PlaybackHandle) -> Result<()>;

    /// Stop whatever is playing. Must be safe to call when idle.
    fn stop(&mut self);

    /// Whether the current track has played to its end.
    fn is_finished(&mut self) -> bool;
}

/// Output that plays nothing; it only remembers what it was given.
#[derive(Debug, Default)]
pub struct NullOutput {
    current: Option<PathBuf>,
}

impl NullOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// File of the track most recently started and not yet stopped.
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }
}

impl AudioOutput for NullOutput {
    fn start(&mut self, handle: &PlaybackHandle) -> Result<()> {
        self.current = Some(handle.path().to_path_buf());
        Ok(())
    }

    fn stop(&mut self) {
        self.current = None;
    }

    fn is_finished(&mut self) -> bool {
        false
    }
}

/// Output that spawns an external player such as `mpv --no-video`.
///
/// The file path is appended as the last argument; stopping kills the child.
#[derive(Debug)]
pub struct CommandOutput {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandOutput {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    /// Parse a whitespace separated command line. `None` if it is blank.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl AudioOutput for CommandOutput {
    fn start(&mut self, handle: &PlaybackHandle) -> Result<()> {
        self.stop();
        log::debug!("Spawning {} for {}", self.program, handle.path().display());
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(handle.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                log::debug!("Player process already gone: {e}");
            }
            let _ = child.wait();
        }
    }

    fn is_finished(&mut self) -> bool {
        match self.child.as_mut().map(|child| child.try_wait()) {
            Some(Ok(Some(status))) => {
                log::debug!("Player process exited with {status}");
                self.child = None;
                true
            }
            Some(Ok(None)) => false,
            Some(Err(e)) => {
                log::warn!("Failed to poll player process: {e}");
                self.child = None;
                true
            }
            None => false,
        }
    }
}

impl Drop for CommandOutput {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Plays one song at a time.
///
/// The previous handle is released before a new song is fetched, on
/// [`stop`](Player::stop), when [`poll`](Player::poll) sees the track end,
/// and when the player is dropped.
#[derive(Debug)]
pub struct Player<O: AudioOutput> {
    output: O,
    state: PlaybackState,
    current: Option<PlaybackHandle>,
}

impl<O: AudioOutput> Player<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            state: PlaybackState::Idle,
            current: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The handle currently playing.
    pub fn current(&self) -> Option<&PlaybackHandle> {
        self.current.as_ref()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Stop the current song, then fetch and start `song_id`.
    ///
    /// On failure the player is left idle.
    pub async fn play<C: WynkClient + ?Sized>(&mut self, client: &C, song_id: i64) -> Result<()> {
        self.stop();
        self.state = PlaybackState::Fetching { song_id };

        match self.fetch_and_start(client, song_id).await {
            Ok(handle) => {
                log::info!("Playing song {song_id} ({} bytes)", handle.len());
                self.current = Some(handle);
                self.state = PlaybackState::Playing { song_id };
                Ok(())
            }
            Err(e) => {
                log::warn!("Playback of song {song_id} failed: {e}");
                self.state = PlaybackState::Idle;
                Err(e)
            }
        }
    }

    async fn fetch_and_start<C: WynkClient + ?Sized>(
        &mut self,
        client: &C,
        song_id: i64,
    ) -> Result<PlaybackHandle> {
        let stream = client.stream_song(song_id, ByteRange::from_start()).await?;
        let handle = PlaybackHandle::from_stream(&stream)?;
        self.output.start(&handle)?;
        Ok(handle)
    }

    /// Stop playback and release the current handle.
    pub fn stop(&mut self) {
        self.output.stop();
        self.release_current();
        self.state = PlaybackState::Idle;
    }

    /// Check whether the track ended on its own.
    ///
    /// Returns `true` when it did, in which case the handle has been released.
    pub fn poll(&mut self) -> bool {
        if !matches!(self.state, PlaybackState::Playing { .. }) {
            return false;
        }
        if !self.output.is_finished() {
            return false;
        }
        log::debug!("Track ended");
        self.release_current();
        self.state = PlaybackState::Idle;
        true
    }

    /// Take the current handle out of the player, leaving it idle.
    ///
    /// The caller becomes responsible for releasing it.
    pub fn take(&mut self) -> Option<PlaybackHandle> {
        self.output.stop();
        self.state = PlaybackState::Idle;
        self.current.take()
    }

    fn release_current(&mut self) {
        if let Some(handle) = self.current.take() {
            if let Err(e) = handle.release() {
                log::warn!("Failed to release playback file: {e}");
            }
        }
    }
}

impl<O: AudioOutput> Drop for Player<O> {
    fn drop(&mut self) {
        self.stop();
    }
}
