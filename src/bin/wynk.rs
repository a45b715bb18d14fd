mod commands;

use clap::Parser;
use commands::{execute_command, utils::Context, Commands};
use wynk_client::ClientConfig;

/// Command line client for the Wynk music streaming service
#[derive(Parser)]
#[command(
    name = "wynk",
    about = "Command line client for the Wynk music streaming service",
    long_about = None
)]
struct Cli {
    /// Base URL of the Wynk API (overrides WYNK_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if args.verbose {
        logger.filter_module("wynk_client", log::LevelFilter::Debug);
        logger.filter_module("wynk", log::LevelFilter::Debug);
    }
    logger.init();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }

    if args.verbose {
        println!("🔍 Verbose mode enabled");
        println!("🌐 Using API at {}", config.base_url);
    }

    let ctx = match Context::new(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("❌ Failed to create client: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(args.command, &ctx).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
