use super::schemas::Config;
/// Configuration utilities - loading, environment overrides and access helpers
use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

/// Global configuration instance
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Environment variable holding the bot token
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_API_TOKEN";

/// Load configuration from a TOML file, apply environment overrides and
/// initialize the global CONFIG
///
/// A missing file means all defaults. A missing bot token after the
/// environment override is fatal.
pub fn load_config_from_path(path: &str) -> Result<Config, ScanBotError> {
    let config = if std::path::Path::new(path).exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScanBotError::configuration_error(format!(
                "Failed to read config file '{}': {}",
                path, e
            ))
        })?;
        parse_config(&contents).map_err(|e| {
            ScanBotError::configuration_error(format!(
                "Failed to parse config file '{}': {}",
                path, e
            ))
        })?
    } else {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path),
        );
        Config::default()
    };

    let config = apply_env_overrides(config, std::env::var(TOKEN_ENV_VAR).ok());
    config
        .validate()
        .map_err(ScanBotError::configuration_error)?;

    if config.telegram.bot_token.trim().is_empty() {
        return Err(ScanBotError::missing_config(format!(
            "telegram.bot_token (or {})",
            TOKEN_ENV_VAR
        )));
    }

    match CONFIG.get() {
        Some(lock) => *lock.write() = config.clone(),
        None => {
            let _ = CONFIG.set(RwLock::new(config.clone()));
        }
    }

    Ok(config)
}

/// Parse a TOML document into a Config; absent keys keep their defaults
pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents).map_err(|e| e.to_string())
}

/// Apply the bot token from the environment, when present and non-empty
pub fn apply_env_overrides(mut config: Config, env_token: Option<String>) -> Config {
    if let Some(token) = env_token.map(|t| t.trim().to_string()) {
        if !token.is_empty() {
            config.telegram.bot_token = token;
        }
    }
    config
}

/// Execute a function with read access to the configuration
///
/// Falls back to defaults when the configuration was never loaded.
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(lock) => f(&lock.read()),
        None => f(&Config::default()),
    }
}
