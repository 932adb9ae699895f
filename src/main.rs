use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use task_snap_bot::bot::{self, BotState};
use task_snap_bot::config::Config;
use task_snap_bot::instance_manager::OcrInstanceManager;
use task_snap_bot::ocr::TesseractExtractor;
use task_snap_bot::ocr_config::OcrConfig;
use task_snap_bot::solver::build_solver;
use task_snap_bot::store::ResultStore;
use task_snap_bot::web;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Fails before any network connection when a required variable is missing
    let config = Arc::new(Config::from_env()?);
    info!(config = ?config, "Starting task bot");

    let store = Arc::new(ResultStore::new());
    let extractor = Arc::new(TesseractExtractor::new(
        OcrConfig::default(),
        Arc::new(OcrInstanceManager::new()),
    ));
    let state = Arc::new(BotState {
        config: Arc::clone(&config),
        store: Arc::clone(&store),
        extractor,
        solver: build_solver(&config),
    });

    let bot = Bot::new(config.bot_token.clone());
    bot.delete_webhook().drop_pending_updates(true).await?;

    let listener = tokio::net::TcpListener::bind(config.web_bind_addr).await?;
    info!(addr = %config.web_bind_addr, "Result viewer listening");
    let router = web::build_router(Arc::clone(&store));
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "Result viewer stopped");
        }
    });

    info!("Bot initialized, starting dispatcher");
    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    server.abort();
    info!("Task bot stopped");
    Ok(())
}
