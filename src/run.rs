//! Bot lifecycle: build the components, run the loops, stop on a signal

use crate::config::Config;
use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use crate::telegram::chat::ChatApi;
use crate::telegram::commands::{CommandSettings, CommandSurface};
use crate::telegram::{run_update_loop, TelegramChat};
use crate::tokens::market_data::{MarketDataProvider, TokenProvider};
use crate::tracking::{PinManager, PinTimings, Poller, TrackingStore};
use std::sync::Arc;
use tokio::sync::watch;

/// Run the bot until Ctrl+C or SIGTERM
pub async fn run_bot(config: Config) -> Result<(), ScanBotError> {
    logger::info(LogTag::System, "Scan bot starting up...");

    let telegram = TelegramChat::connect(&config.telegram.bot_token).await?;
    let bot = telegram.bot().clone();
    let chat: Arc<dyn ChatApi> = Arc::new(telegram);

    let provider: Arc<dyn TokenProvider> = Arc::new(MarketDataProvider::from_config(&config.api));
    let store = Arc::new(TrackingStore::new());
    let pins = Arc::new(PinManager::new(
        chat.clone(),
        store.clone(),
        PinTimings::from(&config.tracking),
    ));

    let surface = Arc::new(CommandSurface::new(
        chat.clone(),
        provider.clone(),
        store.clone(),
        pins.clone(),
        CommandSettings::from(&config.telegram),
    ));
    let poller = Arc::new(Poller::new(
        provider,
        store,
        pins,
        chat,
        &config.tracking,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poll_handle = tokio::spawn(poller.run(shutdown_rx.clone()));
    let update_handle = tokio::spawn(run_update_loop(
        bot,
        surface,
        config.telegram.updates_timeout_secs,
        shutdown_rx,
    ));

    logger::info(LogTag::System, "Scan bot running");
    wait_for_shutdown_signal().await?;

    logger::info(LogTag::System, "Initiating graceful shutdown...");
    shutdown_tx.send_replace(true);

    for (name, handle) in [("poll loop", poll_handle), ("update loop", update_handle)] {
        if let Err(e) = handle.await {
            logger::warning(
                LogTag::System,
                &format!("{} ended abnormally: {}", name, e),
            );
        }
    }

    logger::info(LogTag::System, "Scan bot stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C, SIGTERM on Unix)
async fn wait_for_shutdown_signal() -> Result<(), ScanBotError> {
    #[cfg(unix)]
    let signal_name = {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
            ScanBotError::configuration_error(format!("Failed to bind SIGTERM: {}", e))
        })?;

        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.map_err(|e| {
                    ScanBotError::configuration_error(format!("Failed to listen for Ctrl+C: {}", e))
                })?;
                "SIGINT"
            }
            _ = sigterm.recv() => "SIGTERM",
        }
    };

    #[cfg(not(unix))]
    let signal_name = {
        tokio::signal::ctrl_c().await.map_err(|e| {
            ScanBotError::configuration_error(format!("Failed to listen for Ctrl+C: {}", e))
        })?;
        "CTRL_C"
    };

    logger::warning(
        LogTag::System,
        &format!("Shutdown signal received ({})", signal_name),
    );
    Ok(())
}
