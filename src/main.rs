use anyhow::Context;
use dotenvy::dotenv;
use std::path::Path;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio_util::sync::CancellationToken;

use mediadrop::core::{config, init_logger, install_panic_hook, BotConfig};
use mediadrop::download::{HttpFetcher, Pipeline, RetentionManager, YtDlpBackend};
use mediadrop::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env if present, before any Lazy config is read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;
    install_panic_hook();

    run_bot().await
}

async fn run_bot() -> anyhow::Result<()> {
    log::info!("Starting mediadrop v{}", env!("CARGO_PKG_VERSION"));

    let bot_config = BotConfig::load(Path::new(config::CONFIG_PATH.as_str()))
        .with_context(|| format!("cannot start with config {}", *config::CONFIG_PATH))?;
    log::info!(
        "Config loaded: {} admin(s), limit {} MB, download dir {}",
        bot_config.admin_ids.len(),
        bot_config.max_file_size_mb,
        bot_config.download_dir.display()
    );

    tokio::fs::create_dir_all(&bot_config.download_dir)
        .await
        .with_context(|| format!("cannot create {}", bot_config.download_dir.display()))?;

    let backend = Arc::new(YtDlpBackend::default());
    let retention = RetentionManager::with_defaults(bot_config.download_dir.clone());
    let pipeline = Pipeline::new(
        backend,
        HttpFetcher::new()?,
        retention.clone(),
        bot_config.max_file_size_mb,
    );

    let shutdown = CancellationToken::new();
    let sweeper = retention.spawn_sweeper(shutdown.clone());

    let bot = create_bot(&bot_config.token)?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let deps = HandlerDeps::new(Arc::new(bot_config), pipeline);
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    log::info!("Bot is running, waiting for updates");
    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    shutdown.cancel();
    if let Err(e) = sweeper.await {
        log::warn!("Retention sweeper ended abnormally: {}", e);
    }
    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
