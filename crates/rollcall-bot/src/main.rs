//! # rollcall
//!
//! Tracks the groups and channels the bot belongs to and periodically
//! reports members missing from each conversation's allow-list to its
//! administrators.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rollcall_bot::providers::TelegramTransport;
use rollcall_bot::{Rollcall, ShutdownCoordinator};
use rollcall_runtime::ChatTransport;
use rollcall_settings::{ValidatedSettings, load_settings_from_path, settings_path};
use rollcall_store::{ConnectionConfig, RollcallStore};
use rollcall_telegram::{BotApi, UpdatePoller};
use tracing::info;

/// Membership audit bot.
#[derive(Parser, Debug)]
#[command(name = "rollcall", about = "Audits group members against per-chat allow-lists")]
struct Cli {
    /// Settings file (defaults to `~/.rollcall/settings.json`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Default log filter (overrides settings; `RUST_LOG` still wins).
    #[arg(long)]
    log_level: Option<String>,
}

fn load(args: &Cli) -> Result<ValidatedSettings> {
    let path = args.config.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    if let Some(db_path) = &args.db_path {
        settings.database.path.clone_from(db_path);
    }
    if let Some(level) = &args.log_level {
        settings.logging.level.clone_from(level);
    }
    settings.validate().context("Invalid configuration")
}

fn init_logging(settings: &ValidatedSettings) -> Result<()> {
    let level = settings.logging.level.as_str();
    if !settings.logging.persist_warnings {
        rollcall_logging::init_subscriber(level);
        return Ok(());
    }

    // Dedicated connection, separate from the pool.
    let conn = rusqlite::Connection::open(&settings.database.path)
        .context("Failed to open logging DB connection")?;
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL; PRAGMA busy_timeout = {};",
        settings.database.busy_timeout_ms
    ))
    .context("Failed to set logging connection pragmas")?;
    let _ = rollcall_logging::init_subscriber_with_sqlite(level, conn)
        .context("Failed to create logs table")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let settings = load(&args)?;

    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
    };
    let store =
        RollcallStore::open(&settings.database.path, &config).context("Failed to open database")?;
    init_logging(&settings)?;

    let api = BotApi::new(settings.api_base_url.as_str(), settings.bot_token.as_str());
    let me = api.get_me().await.context("Bot API rejected the token")?;
    info!(
        bot_id = me.id.get(),
        username = me.username.as_deref().unwrap_or_default(),
        db = %settings.database.path.display(),
        interval_secs = settings.audit_interval.as_secs(),
        "rollcall starting"
    );

    let transport: Arc<dyn ChatTransport> = Arc::new(TelegramTransport::new(api.clone()));
    let app = Rollcall::assemble(store, transport, settings.audit_interval);
    let report = app
        .bootstrap
        .reconcile()
        .await
        .context("Failed to restore tracked conversations")?;
    info!(restored = report.restored, armed = report.armed, "state restored");

    let shutdown = ShutdownCoordinator::default();
    let token = shutdown.token();
    let dispatcher = Arc::clone(&app.dispatcher);
    let mut poller = UpdatePoller::new(api, settings.poll_timeout);
    let poll_task = tokio::spawn(async move {
        poller
            .run(token, |update| {
                let dispatcher = Arc::clone(&dispatcher);
                async move { dispatcher.dispatch(update).await }
            })
            .await;
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutdown requested");
    shutdown.graceful_shutdown(poll_task, &app).await;
    Ok(())
}
