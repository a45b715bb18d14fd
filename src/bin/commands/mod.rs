pub mod auth;
pub mod listener;
pub mod performer;
pub mod play;
pub mod utils;

use clap::Subcommand;
use std::path::PathBuf;
use utils::Context;
use wynk_client::Role;

#[derive(Subcommand)]
pub enum PlaylistCommands {
    /// Add a song to one of your playlists
    ///
    /// Usage examples:
    /// # Add song 12 to playlist 3
    /// wynk playlist add --playlist 3 --song 12
    Add {
        /// Playlist id
        #[arg(long)]
        playlist: i64,

        /// Song id
        #[arg(long)]
        song: i64,
    },

    /// Remove a song from one of your playlists
    Remove {
        /// Playlist id
        #[arg(long)]
        playlist: i64,

        /// Song id
        #[arg(long)]
        song: i64,
    },

    /// Create a playlist that starts with one song
    ///
    /// Usage examples:
    /// # Create "Road Trip" holding song 12
    /// wynk playlist create --name "Road Trip" --song 12
    Create {
        /// Name of the new playlist
        #[arg(long)]
        name: String,

        /// Song the playlist starts with
        #[arg(long)]
        song: i64,
    },
}

#[derive(Subcommand)]
pub enum PerformerCommands {
    /// List the songs you have uploaded
    Songs,

    /// Upload a song file
    ///
    /// Usage examples:
    /// # Upload an mp3 with the placeholder runtime
    /// wynk performer upload --name "Anthem" --file ./anthem.mp3
    ///
    /// # Upload with an explicit runtime
    /// wynk performer upload --name "Anthem" --file ./anthem.mp3 --runtime 4
    Upload {
        /// Song title
        #[arg(long)]
        name: String,

        /// Audio file to upload
        #[arg(long)]
        file: PathBuf,

        /// Runtime sent with the upload
        #[arg(long)]
        runtime: Option<String>,
    },

    /// Delete one of your songs
    Delete {
        /// Song id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    ///
    /// Usage examples:
    /// # Register a listener, reading the password from WYNK_PASSWORD
    /// wynk register --role listener --name alice
    ///
    /// # Register a performer
    /// wynk register --role performer --name arijit --password secret
    Register {
        /// listener or performer
        #[arg(long, default_value = "listener")]
        role: Role,

        /// Account name
        #[arg(long)]
        name: String,

        /// Password (falls back to WYNK_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and save the session for later commands
    Login {
        /// listener or performer
        #[arg(long, default_value = "listener")]
        role: Role,

        /// Account name
        #[arg(long)]
        name: String,

        /// Password (falls back to WYNK_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show who the saved session belongs to
    Whoami,

    /// List every song, or the songs of one playlist
    ///
    /// Usage examples:
    /// # All songs
    /// wynk songs
    ///
    /// # Songs in playlist 3
    /// wynk songs --playlist 3
    Songs {
        /// Only show the songs of this playlist
        #[arg(long)]
        playlist: Option<i64>,
    },

    /// List your playlists
    Playlists,

    /// Change your playlists
    Playlist {
        #[command(subcommand)]
        command: PlaylistCommands,
    },

    /// Fetch a song and play it or save it
    ///
    /// Usage examples:
    /// # Save song 12 to a file
    /// wynk play 12 --output song.mp3
    ///
    /// # Play song 12 with mpv
    /// wynk play 12 --player "mpv --no-video"
    Play {
        /// Song id
        id: i64,

        /// Save the audio here instead of playing it
        #[arg(long, conflicts_with = "player")]
        output: Option<PathBuf>,

        /// Player command line (falls back to WYNK_PLAYER)
        #[arg(long)]
        player: Option<String>,
    },

    /// Manage your songs as a performer
    Performer {
        #[command(subcommand)]
        command: PerformerCommands,
    },
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command(
    command: Commands,
    ctx: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Register {
            role,
            name,
            password,
        } => {
            let password = utils::get_password(password)?;
            auth::handle_register(ctx, role, &name, &password).await
        }

        Commands::Login {
            role,
            name,
            password,
        } => {
            let password = utils::get_password(password)?;
            auth::handle_login(ctx, role, &name, &password).await
        }

        Commands::Logout => auth::handle_logout(ctx),

        Commands::Whoami => auth::handle_whoami(ctx),

        Commands::Songs { playlist } => listener::handle_songs(ctx, playlist).await,

        Commands::Playlists => listener::handle_playlists(ctx).await,

        Commands::Playlist { command } => match command {
            PlaylistCommands::Add { playlist, song } => {
                listener::handle_add(ctx, playlist, song).await
            }
            PlaylistCommands::Remove { playlist, song } => {
                listener::handle_remove(ctx, playlist, song).await
            }
            PlaylistCommands::Create { name, song } => {
                listener::handle_create(ctx, &name, song).await
            }
        },

        Commands::Play { id, output, player } => {
            if let Some(path) = output {
                play::handle_save(ctx, id, &path).await
            } else {
                let player = player.or_else(|| ctx.config.player_command.clone());
                match player {
                    Some(command) => play::handle_play(ctx, id, &command).await,
                    None => Err(
                        "Must specify --output, --player, or set WYNK_PLAYER".into(),
                    ),
                }
            }
        }

        Commands::Performer { command } => match command {
            PerformerCommands::Songs => performer::handle_songs(ctx).await,
            PerformerCommands::Upload {
                name,
                file,
                runtime,
            } => performer::handle_upload(ctx, &name, &file, runtime).await,
            PerformerCommands::Delete { id } => performer::handle_delete(ctx, id).await,
        },
    }
}
