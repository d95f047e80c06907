/// Configuration schemas - all config structures defined once with defaults
use crate::config_struct;
use std::time::Duration;

// ============================================================================
// TELEGRAM CONFIGURATION
// ============================================================================

config_struct! {
    /// Telegram connection and chat behaviour
    pub struct TelegramConfig {
        /// Bot token from @BotFather. TELEGRAM_BOT_API_TOKEN overrides it.
        bot_token: String = String::new(),

        /// Long-poll timeout for getUpdates
        updates_timeout_secs: u32 = 10,

        /// Answer "Not a contract address" to other text (otherwise stay silent)
        reply_to_non_addresses: bool = true,

        /// The sole user of a private chat may toggle tracking
        allow_private_chat_toggle: bool = true,
    }
}

// ============================================================================
// TRACKING CONFIGURATION
// ============================================================================

config_struct! {
    /// Market cap tracking, polling and pinned card timings
    pub struct TrackingConfig {
        /// Relative market cap move that fires an alert (0.05 = 5%)
        alert_threshold: f64 = 0.05,

        /// Seconds between poll cycles
        poll_interval_secs: u64 = 30,

        /// Seconds after startup before the first poll cycle
        poll_start_delay_secs: u64 = 10,

        /// Seconds the "refreshing" placeholder stays before the card is replaced
        refresh_placeholder_delay_secs: u64 = 2,

        /// Seconds before the "tracking stopped" notice deletes itself
        untrack_notice_delay_secs: u64 = 5,

        /// Seconds before the "admins only" notice deletes itself
        denial_notice_delay_secs: u64 = 10,
    }
}

impl TrackingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn poll_start_delay(&self) -> Duration {
        Duration::from_secs(self.poll_start_delay_secs)
    }

    pub fn refresh_placeholder_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_placeholder_delay_secs)
    }

    pub fn untrack_notice_delay(&self) -> Duration {
        Duration::from_secs(self.untrack_notice_delay_secs)
    }

    pub fn denial_notice_delay(&self) -> Duration {
        Duration::from_secs(self.denial_notice_delay_secs)
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

config_struct! {
    /// Market data sources
    pub struct ApiConfig {
        dexscreener_base_url: String = "https://api.dexscreener.com".to_string(),
        pumpfun_base_url: String = "https://frontend-api.pump.fun".to_string(),
        timeout_secs: u64 = 10,
        max_concurrent_requests: usize = 5,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration loaded from data/config.toml
    pub struct Config {
        telegram: TelegramConfig = TelegramConfig::default(),
        tracking: TrackingConfig = TrackingConfig::default(),
        api: ApiConfig = ApiConfig::default(),
    }
}

impl Config {
    /// Check values that would make the bot misbehave rather than fail
    pub fn validate(&self) -> Result<(), String> {
        let threshold = self.tracking.alert_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(format!(
                "tracking.alert_threshold must be a positive number, got {}",
                threshold
            ));
        }
        if self.tracking.poll_interval_secs == 0 {
            return Err("tracking.poll_interval_secs must be at least 1".to_string());
        }
        if self.api.max_concurrent_requests == 0 {
            return Err("api.max_concurrent_requests must be at least 1".to_string());
        }
        Ok(())
    }
}
