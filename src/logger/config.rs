/// Logger configuration derived from command-line flags
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Most detailed level that may be printed
    pub min_level: LogLevel,
    /// Tags with --debug-<tag> enabled
    pub debug_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Debug,
            debug_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Get a copy of the active logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

/// Replace the active logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build the logger configuration from the process arguments
pub fn init_from_args() {
    set_logger_config(config_from_args(&arguments::get_cmd_args()));
}

/// Build a logger configuration from an explicit argument list
pub fn config_from_args(args: &[String]) -> LoggerConfig {
    let min_level = if args.iter().any(|a| a == "--quiet") {
        LogLevel::Warning
    } else if args.iter().any(|a| a == "--verbose") {
        LogLevel::Verbose
    } else {
        LogLevel::Debug
    };

    let debug_tags = args
        .iter()
        .filter_map(|a| a.strip_prefix("--debug-"))
        .map(|key| key.to_lowercase())
        .collect();

    LoggerConfig {
        min_level,
        debug_tags,
    }
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_tags.contains(&tag.to_debug_key()) || config.debug_tags.contains("all")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_debug_flags_collected() {
        let cfg = config_from_args(&args(&["scanbot", "--debug-poller", "--debug-API"]));
        assert!(cfg.debug_tags.contains("poller"));
        assert!(cfg.debug_tags.contains("api"));
        assert_eq!(cfg.min_level, LogLevel::Debug);
    }

    #[test]
    fn test_quiet_wins_over_verbose() {
        let cfg = config_from_args(&args(&["scanbot", "--verbose", "--quiet"]));
        assert_eq!(cfg.min_level, LogLevel::Warning);
    }

    #[test]
    fn test_active_config_is_replaced() {
        let previous = get_logger_config();
        let mut cfg = LoggerConfig::default();
        cfg.debug_tags.insert("pins".to_string());

        set_logger_config(cfg);
        assert!(is_debug_enabled_for_tag(&LogTag::Pins));
        assert!(!is_debug_enabled_for_tag(&LogTag::Api));

        set_logger_config(previous);
    }
}
