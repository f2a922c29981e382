//! Ghostty bot binary.

use clap::{Parser, Subcommand};
use ghostty_bot::{BotConfig, components, telemetry};
use std::path::PathBuf;

/// Ghostty Discord bot
#[derive(Parser, Debug)]
#[command(name = "ghostty-bot")]
#[command(about = "Ghostty community Discord bot", long_about = None)]
#[command(version)]
struct Cli {
    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ./ghostty_bot.toml if present)
    #[arg(short, long, global = true, env = "BOT_CONFIG")]
    config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Connect to the gateway and serve events
    Run,
    /// List the extensions the bot would load
    Extensions,
    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let config = BotConfig::load(cli.config.as_deref())?;
            config.validate()?;
            telemetry::init_tracing(*config.json_logs())?;
            run(config).await?;
        }

        Commands::Extensions => {
            for name in components::registry().discover() {
                println!("{}", name);
            }
        }

        Commands::CheckConfig => {
            let config = BotConfig::load(cli.config.as_deref())?;
            config.validate()?;
            println!("Configuration OK");
            println!("{:#?}", config);
        }
    }

    Ok(())
}

/// Messages kept per channel by the serenity cache.
#[cfg(feature = "discord")]
const RECENT_MESSAGES: usize = 100;

#[cfg(feature = "discord")]
async fn run(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    use ghostty_bot::{Bot, GhosttyHandler};
    use ghostty_gateway::SerenityGateway;
    use serenity::Client;
    use serenity::cache::Settings;
    use std::sync::Arc;
    use tracing::info;

    let gateway = Arc::new(SerenityGateway::new());
    let token = config.token().clone();
    let bot = Bot::new(config, gateway.clone(), components::registry());

    // Keep recent messages so edits arrive with their previous content.
    let mut cache_settings = Settings::default();
    cache_settings.max_messages = RECENT_MESSAGES;

    let mut client = Client::builder(&token, GhosttyHandler::intents())
        .cache_settings(cache_settings)
        .event_handler(GhosttyHandler::new(Arc::clone(&bot)))
        .await?;
    gateway.attach(Arc::clone(&client.cache), Arc::clone(&client.http));
    info!("Serenity client built successfully");

    bot.setup_hook().await?;
    client.start().await?;
    Ok(())
}

#[cfg(not(feature = "discord"))]
async fn run(_config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    Err("ghostty-bot was built without the `discord` feature".into())
}
