use scanbot::{
    arguments::{config_path_override, is_help_requested, print_help},
    config::{load_config_from_path, with_config, CONFIG_FILE_PATH},
    logger::{self as logger, LogTag},
};

/// Main entry point for the scan bot
///
/// Loads `.env`, then the TOML config (or `--config <path>`), then runs
/// until a shutdown signal. A missing bot token ends the process with
/// exit code 1.
#[tokio::main]
async fn main() {
    // .env is optional; the token may come from the real environment
    let _ = dotenv::dotenv();

    logger::init();

    if is_help_requested() {
        print_help();
        std::process::exit(0);
    }

    let path = config_path_override().unwrap_or_else(|| CONFIG_FILE_PATH.to_string());
    let config = match load_config_from_path(&path) {
        Ok(config) => config,
        Err(e) => {
            logger::error(LogTag::Config, &format!("Startup aborted: {}", e));
            std::process::exit(1);
        }
    };

    with_config(|c| {
        logger::info(
            LogTag::Config,
            &format!(
                "Loaded {}: alert threshold {:.2}%, poll every {}s",
                path,
                c.tracking.alert_threshold * 100.0,
                c.tracking.poll_interval_secs
            ),
        )
    });

    if let Err(e) = scanbot::run::run_bot(config).await {
        logger::error(LogTag::System, &format!("Bot stopped with error: {}", e));
        std::process::exit(1);
    }
}
