use super::utils::Context;
use std::path::Path;
use std::time::Duration;
use wynk_client::{CommandOutput, NullOutput, Player};

/// Fetch a song and copy it to `path`
pub async fn handle_save(
    ctx: &Context,
    id: i64,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.restore_session()?;
    let mut player = Player::new(NullOutput::new());

    println!("⬇️  Fetching song {id}...");
    player.play(&ctx.client, id).await?;

    let handle = player
        .current()
        .ok_or("Playback finished before the audio could be saved")?;
    let written = handle.save_to(path)?;
    println!(
        "✅ Saved {written} bytes ({}) to {}",
        handle.content_type().unwrap_or("unknown type"),
        path.display()
    );
    player.stop();
    Ok(())
}

/// Fetch a song and play it through an external program until it ends or Ctrl-C
pub async fn handle_play(
    ctx: &Context,
    id: i64,
    command: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.restore_session()?;
    let output = CommandOutput::from_command_line(command).ok_or("Player command is empty")?;
    let mut player = Player::new(output);

    println!("⬇️  Fetching song {id}...");
    player.play(&ctx.client, id).await?;
    println!(
        "▶️  Playing with {} (Ctrl-C to stop)",
        player.output().program()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                player.stop();
                println!("⏹️  Stopped");
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if player.poll() {
                    println!("⏹️  Finished");
                    break;
                }
            }
        }
    }
    Ok(())
}
