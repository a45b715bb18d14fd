use super::utils::{print_songs, Context};
use wynk_client::{ListenerDashboard, NullOutput, SessionPersistence, WynkClientImpl};

type Dashboard<'a> = ListenerDashboard<'a, WynkClientImpl, SessionPersistence, NullOutput>;

async fn open(ctx: &Context) -> Result<Dashboard<'_>, Box<dyn std::error::Error>> {
    ctx.restore_session()?;
    Ok(ListenerDashboard::mount(&ctx.client, &ctx.store, NullOutput::new()).await?)
}

pub async fn handle_songs(
    ctx: &Context,
    playlist: Option<i64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = open(ctx).await?;

    match playlist {
        Some(id) => {
            dashboard.select_playlist(id).await?;
            let name = dashboard
                .playlists()
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.playlist_name.clone())
                .unwrap_or_else(|| format!("#{id}"));
            println!("🎵 Songs in playlist {name}:");
        }
        None => println!("🎵 All songs:"),
    }

    print_songs(dashboard.songs());
    Ok(())
}

pub async fn handle_playlists(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let dashboard = open(ctx).await?;
    print_playlists(&dashboard);
    Ok(())
}

pub async fn handle_add(
    ctx: &Context,
    playlist: i64,
    song: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = open(ctx).await?;
    dashboard.add_to_playlist(song, playlist).await?;
    println!("✅ Added song {song} to playlist {playlist}");
    print_playlists(&dashboard);
    Ok(())
}

pub async fn handle_remove(
    ctx: &Context,
    playlist: i64,
    song: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = open(ctx).await?;
    dashboard.remove_from_playlist(song, playlist).await?;
    println!("✅ Removed song {song} from playlist {playlist}");
    print_playlists(&dashboard);
    Ok(())
}

pub async fn handle_create(
    ctx: &Context,
    name: &str,
    song: i64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dashboard = open(ctx).await?;
    dashboard.create_playlist(song, name).await?;
    println!("✅ Created playlist '{name}'");
    print_playlists(&dashboard);
    Ok(())
}

fn print_playlists(dashboard: &Dashboard<'_>) {
    let playlists = dashboard.playlists();
    if playlists.is_empty() {
        println!("📂 {} has no playlists", dashboard.username());
        return;
    }

    println!("📂 Playlists of {}:", dashboard.username());
    for playlist in playlists {
        println!(
            "  [{}] {} ({} songs)",
            playlist.id,
            playlist.playlist_name,
            playlist.songs.len()
        );
        for song in &playlist.songs {
            println!("      - {} - {}", song.singer_name, song.song_name);
        }
    }
}
