use super::utils::{print_songs, Context};
use std::path::Path;
use wynk_client::{NullOutput, PerformerDashboard, UploadFile};

pub async fn handle_songs(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    ctx.restore_session()?;
    let dashboard = PerformerDashboard::mount(&ctx.client, &ctx.store, NullOutput::new()).await?;
    println!("🎤 Songs by {}:", dashboard.username());
    print_songs(dashboard.songs());
    Ok(())
}

pub async fn handle_upload(
    ctx: &Context,
    name: &str,
    file: &Path,
    runtime: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    ctx.restore_session()?;
    let mut dashboard =
        PerformerDashboard::mount(&ctx.client, &ctx.store, NullOutput::new()).await?;

    let file = UploadFile::from_path(file)?;
    println!("⬆️  Uploading '{name}' ({} bytes)...", file.bytes.len());

    dashboard.form.song_name = name.to_string();
    dashboard.form.file = Some(file);
    dashboard.form.runtime = runtime;
    dashboard.upload().await?;

    println!("✅ Uploaded '{name}'");
    print_songs(dashboard.songs());
    Ok(())
}

pub async fn handle_delete(ctx: &Context, id: i64) -> Result<(), Box<dyn std::error::Error>> {
    ctx.restore_session()?;
    let mut dashboard =
        PerformerDashboard::mount(&ctx.client, &ctx.store, NullOutput::new()).await?;
    dashboard.delete(id).await?;
    println!("🗑️  Deleted song {id}");
    print_songs(dashboard.songs());
    Ok(())
}
