use wynk_client::{
    ClientConfig, SessionPersistence, SessionStore, Song, WynkClient, WynkClientImpl,
    WynkSession,
};

/// Everything a command handler needs.
pub struct Context {
    pub config: ClientConfig,
    pub store: SessionPersistence,
    pub client: WynkClientImpl,
}

impl Context {
    /// Build the client for `config`, backed by the saved session directory.
    pub fn new(config: ClientConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = SessionPersistence::new()?;
        let http_client = http_client::native::NativeClient::new();
        let client = WynkClientImpl::with_config(Box::new(http_client), config.clone());
        Ok(Self {
            config,
            store,
            client,
        })
    }

    /// Load the saved session into the client.
    ///
    /// An expired session file is removed.
    pub fn restore_session(&self) -> Result<WynkSession, Box<dyn std::error::Error>> {
        match self.store.load_valid()? {
            Some(session) => {
                if session.base_url != self.config.base_url {
                    println!(
                        "⚠️  Warning: session was issued by {} but requests go to {}",
                        session.base_url, self.config.base_url
                    );
                }
                self.client.restore_session(session.clone());
                Ok(session)
            }
            None => Err("Not logged in. Run `wynk login` first.".into()),
        }
    }
}

/// Use the given password or fall back to `WYNK_PASSWORD`
pub fn get_password(password: Option<String>) -> Result<String, Box<dyn std::error::Error>> {
    match password {
        Some(password) => Ok(password),
        None => std::env::var("WYNK_PASSWORD")
            .map_err(|_| "Pass --password or set the WYNK_PASSWORD environment variable".into()),
    }
}

/// One line per song: id, title, performer and rating
pub fn print_songs(songs: &[Song]) {
    if songs.is_empty() {
        println!("   (no songs)");
        return;
    }
    for song in songs {
        println!("{}", format_song(song));
    }
}

pub fn format_song(song: &Song) -> String {
    if song.rating > 0.0 {
        format!(
            "  [{}] {} - {} ({:.1}★)",
            song.id, song.singer_name, song.song_name, song.rating
        )
    } else {
        format!("  [{}] {} - {}", song.id, song.singer_name, song.song_name)
    }
}

/// Describe how long a session has left, e.g. "42m 10s"
pub fn format_remaining(session: &WynkSession) -> String {
    let secs = session.remaining().as_secs();
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
