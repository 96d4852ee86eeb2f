//! db-chat - Chat with a SQLite database in plain language.

use std::sync::Arc;

use anyhow::Context;
use db_chat::chat::ChatService;
use db_chat::cli::Cli;
use db_chat::config::Config;
use db_chat::db::{DatabaseClient, SqliteClient};
use db_chat::llm::create_client;
use db_chat::logging::init_logging;
use db_chat::server::{build_router, serve};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(config.logging.file.as_deref());

    if let Err(e) = run(config).await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

/// Loads the config file and applies CLI overrides.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load_from_file(&cli.config_path())?;
    cli.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(
        database = %config.database.path.display(),
        provider = %config.llm.provider,
        session_mode = ?config.chat.session_mode,
        "Starting db-chat"
    );

    let llm = create_client(&config.llm)?;
    let db: Arc<dyn DatabaseClient> = Arc::new(
        SqliteClient::open(&config.database.path)
            .await
            .with_context(|| format!("Failed to open {}", config.database.path.display()))?,
    );

    let service = Arc::new(
        ChatService::start(llm, db, &config.chat)
            .await
            .context("Failed to load the database schema")?,
    );

    let router = build_router(service.clone(), &config.server.static_dir);
    serve(router, &config.server.bind_address()).await?;

    service.shutdown().await;
    Ok(())
}
