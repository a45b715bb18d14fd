use super::utils::{format_remaining, Context};
use wynk_client::{AuthMode, AuthPage, Role, Route};

pub async fn handle_register(
    ctx: &Context,
    role: Role,
    name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("📝 Registering {role} '{name}'...");
    let mut page = AuthPage::new(AuthMode::Register, role).with_credentials(name, password);
    page.submit(&ctx.client, &ctx.store).await;

    if let Some(message) = page.message {
        println!("✅ {message}");
        Ok(())
    } else {
        Err(page
            .error
            .unwrap_or_else(|| "Registration failed.".to_string())
            .into())
    }
}

pub async fn handle_login(
    ctx: &Context,
    role: Role,
    name: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔐 Logging in as {role} '{name}'...");
    let mut page = AuthPage::new(AuthMode::Login, role).with_credentials(name, password);

    match page.submit(&ctx.client, &ctx.store).await {
        Some(route) => {
            println!("✅ Logged in, session saved to {}", ctx.store.session_path().display());
            match route {
                Route::ListenerDashboard => {
                    println!("🎧 Try `wynk songs` or `wynk playlists`")
                }
                Route::PerformerDashboard => println!("🎤 Try `wynk performer songs`"),
            }
            Ok(())
        }
        None => Err(page
            .error
            .unwrap_or_else(|| "Login failed.".to_string())
            .into()),
    }
}

pub fn handle_logout(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    if ctx.store.session_exists() {
        ctx.store.remove_session()?;
        println!("👋 Logged out");
    } else {
        println!("ℹ️  No saved session");
    }
    Ok(())
}

pub fn handle_whoami(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    match ctx.store.load_session()? {
        Some(session) if session.is_expired() => {
            ctx.store.remove_session()?;
            println!("⌛ Session for '{}' has expired and was removed", session.username);
        }
        Some(session) => {
            println!("👤 {} ({})", session.username, session.role);
            println!("   API:     {}", session.base_url);
            println!(
                "   Expires: {} (in {})",
                session.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
                format_remaining(&session)
            );
        }
        None => println!("ℹ️  Not logged in"),
    }
    Ok(())
}
