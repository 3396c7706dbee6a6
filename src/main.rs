//! panel-bot — Telegram-бот с меню, информационными панелями и рассылкой.

mod bot;
mod broadcast;
mod config;
mod content;
mod fanout;
mod registry;

use broadcast::BroadcastState;
use std::path::PathBuf;
use teloxide::dispatching::Dispatcher;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    if let Err(error) = dotenvy::dotenv() {
        tracing::debug!(error = %error, ".env not loaded");
    }

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    tracing::info!(
        config_path = ?config_path,
        "Starting panel-bot"
    );

    let config = config::Config::load(config_path.as_deref())?;
    let token = config.bot_token()?;
    tracing::info!(
        admin_count = config.admin_ids.len(),
        users_path = %config.users_path.display(),
        content_path = %config.content_path.display(),
        logo_path = %config.logo_path.display(),
        parse_mode = ?config.parse_mode,
        broadcast_timeout_secs = ?config.broadcast_timeout_secs,
        "Configuration loaded"
    );
    if config.admin_ids.is_empty() {
        tracing::warn!("ADMIN_IDS is empty, /broadcast is unavailable");
    }
    if !config.logo_path.exists() {
        tracing::warn!(
            logo_path = %config.logo_path.display(),
            "Logo file not found, panels will fail to render"
        );
    }

    let state = bot::handlers::BotState::new(config);
    let bot = Bot::new(token);
    tracing::info!("Dispatcher initialized, bot is ready");

    Dispatcher::builder(bot, bot::handlers::schema())
        .dependencies(dptree::deps![state, InMemStorage::<BroadcastState>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
