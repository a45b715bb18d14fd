use super::{forget_rejected_session, resume_session};
use crate::playback::{AudioOutput, PlaybackState, Player};
use crate::session::SessionStore;
use crate::types::{Playlist, PlaylistMutation, Song};
use crate::{Result, WynkClient, WynkError};

/// Song and playlist browser for a logged in listener.
///
/// `songs` shows either every song or, after
/// [`select_playlist`](Self::select_playlist), the songs of one playlist.
/// Mutations refetch the collections they affect.
pub struct ListenerDashboard<'a, C, S, O>
where
    C: WynkClient + ?Sized,
    S: SessionStore + ?Sized,
    O: AudioOutput,
{
    client: &'a C,
    store: &'a S,
    username: String,
    songs: Vec<Song>,
    playlists: Vec<Playlist>,
    selected_playlist: Option<i64>,
    player: Player<O>,
}

impl<'a, C, S, O> ListenerDashboard<'a, C, S, O>
where
    C: WynkClient + ?Sized,
    S: SessionStore + ?Sized,
    O: AudioOutput,
{
    /// Open the dashboard for the stored session and load songs and playlists.
    ///
    /// Both lists are fetched concurrently. A failed fetch is logged and
    /// leaves its list empty.
    pub async fn mount(client: &'a C, store: &'a S, output: O) -> Result<Self> {
        let session = resume_session(client, store)?;
        log::debug!("Mounting listener dashboard for '{}'", session.username);

        let mut dashboard = Self {
            client,
            store,
            username: session.username,
            songs: Vec::new(),
            playlists: Vec::new(),
            selected_playlist: None,
            player: Player::new(output),
        };

        let (songs, playlists) = futures::join!(
            client.list_songs(),
            client.list_playlists(&dashboard.username)
        );

        match songs {
            Ok(songs) => dashboard.songs = songs,
            Err(e) => {
                log::error!("Failed to fetch songs: {e}");
                forget_rejected_session(store, &e);
            }
        }
        match playlists {
            Ok(playlists) => dashboard.playlists = playlists,
            Err(e) => {
                log::error!("Failed to fetch playlists: {e}");
                forget_rejected_session(store, &e);
            }
        }

        Ok(dashboard)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Songs currently displayed.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// The playlist whose songs are displayed, `None` when showing all songs.
    pub fn selected_playlist(&self) -> Option<i64> {
        self.selected_playlist
    }

    pub fn player(&self) -> &Player<O> {
        &self.player
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.player.state()
    }

    /// Show only the songs of one playlist.
    pub async fn select_playlist(&mut self, playlist_id: i64) -> Result<()> {
        let songs = self.checked(self.client.playlist_songs(playlist_id).await)?;
        self.songs = songs;
        self.selected_playlist = Some(playlist_id);
        Ok(())
    }

    /// Go back to listing every song.
    pub async fn show_all_songs(&mut self) -> Result<()> {
        self.selected_playlist = None;
        self.refresh_songs().await
    }

    pub async fn play(&mut self, song_id: i64) -> Result<()> {
        let result = self.player.play(self.client, song_id).await;
        self.checked(result)
    }

    pub fn stop(&mut self) {
        self.player.stop();
    }

    /// Let the player notice a track that finished on its own.
    pub fn poll(&mut self) -> bool {
        self.player.poll()
    }

    pub async fn add_to_playlist(&mut self, song_id: i64, playlist_id: i64) -> Result<()> {
        self.mutate(PlaylistMutation::AddSong {
            playlist_id,
            song_id,
        })
        .await
    }

    pub async fn remove_from_playlist(&mut self, song_id: i64, playlist_id: i64) -> Result<()> {
        self.mutate(PlaylistMutation::RemoveSong {
            playlist_id,
            song_id,
        })
        .await
    }

    /// Create a playlist owned by this listener holding `song_id`.
    pub async fn create_playlist(&mut self, song_id: i64, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WynkError::InvalidInput(
                "Playlist name must not be empty".to_string(),
            ));
        }
        self.mutate(PlaylistMutation::Create {
            name: name.to_string(),
            user_name: self.username.clone(),
            song_id,
        })
        .await
    }

    async fn mutate(&mut self, mutation: PlaylistMutation) -> Result<()> {
        let result = self.client.mutate_playlist(&mutation).await;
        self.checked(result)?;

        if let Err(e) = self.refresh_playlists().await {
            log::error!("Failed to refetch playlists of '{}': {e}", self.username);
        }
        if let Some(selected) = self.selected_playlist {
            if mutation.playlist_id() == Some(selected) {
                match self.checked(self.client.playlist_songs(selected).await) {
                    Ok(songs) => self.songs = songs,
                    Err(e) => log::error!("Failed to refetch playlist {selected}: {e}"),
                }
            }
        }
        Ok(())
    }

    async fn refresh_songs(&mut self) -> Result<()> {
        let songs = self.checked(self.client.list_songs().await)?;
        self.songs = songs;
        Ok(())
    }

    async fn refresh_playlists(&mut self) -> Result<()> {
        let playlists = self.checked(self.client.list_playlists(&self.username).await)?;
        self.playlists = playlists;
        Ok(())
    }

    fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            forget_rejected_session(self.store, e);
        }
        result
    }
}
