//! Chat event handlers
//!
//! Incoming updates are reduced to [`IncomingText`] and [`IncomingCallback`]
//! by the update loop, then routed here:
//! - `message`: address lookups, `/start` and `/help`
//! - `callbacks`: the Refresh and Track/Untrack buttons

mod callbacks;
mod message;

use crate::config::TelegramConfig;
use crate::logger::{self, LogTag};
use crate::telegram::chat::{ChatApi, MessageRef};
use crate::tokens::market_data::TokenProvider;
use crate::tokens::types::TokenSnapshot;
use crate::tracking::pins::PinManager;
use crate::tracking::store::TrackingStore;
use std::sync::Arc;

pub const HELP_TEXT: &str = "👋 <b>Token Scanner</b>\n\n\
    Send a contract address (Solana mint or 0x address) to get a market card.\n\n\
    <b>🔄 Refresh</b> re-posts the card with fresh data.\n\
    <b>📌 Track</b> pins the card and posts an alert whenever the market cap \
    moves past the alert threshold. Group admins only.";
pub const NOT_ADDRESS_TEXT: &str = "❌ Not a contract address";
pub const UNAVAILABLE_TEXT: &str = "⚠️ Token data unavailable";
pub const DENIED_TEXT: &str = "⛔ Only group admins can toggle tracking.";

/// A text message from a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingText {
    pub chat_id: i64,
    pub text: String,
}

/// A button press on one of the bot's messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    pub query_id: String,
    pub user_id: u64,
    /// The message carrying the button; absent when it is too old to access
    pub message: Option<MessageRef>,
    pub data: String,
}

/// Reply behavior taken from the `[telegram]` config section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSettings {
    pub reply_to_non_addresses: bool,
    pub allow_private_chat_toggle: bool,
}

impl From<&TelegramConfig> for CommandSettings {
    fn from(config: &TelegramConfig) -> Self {
        Self {
            reply_to_non_addresses: config.reply_to_non_addresses,
            allow_private_chat_toggle: config.allow_private_chat_toggle,
        }
    }
}

impl Default for CommandSettings {
    fn default() -> Self {
        Self::from(&TelegramConfig::default())
    }
}

pub struct CommandSurface {
    chat: Arc<dyn ChatApi>,
    provider: Arc<dyn TokenProvider>,
    store: Arc<TrackingStore>,
    pins: Arc<PinManager>,
    settings: CommandSettings,
}

impl CommandSurface {
    pub fn new(
        chat: Arc<dyn ChatApi>,
        provider: Arc<dyn TokenProvider>,
        store: Arc<TrackingStore>,
        pins: Arc<PinManager>,
        settings: CommandSettings,
    ) -> Self {
        Self {
            chat,
            provider,
            store,
            pins,
            settings,
        }
    }

    /// Fetch a snapshot; transient errors are logged and read as a miss
    async fn fetch_snapshot(&self, address: &str) -> Option<TokenSnapshot> {
        match self.provider.fetch(address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                logger::warning(
                    LogTag::Commands,
                    &format!("Lookup of {} failed: {}", address, e),
                );
                None
            }
        }
    }

    async fn send_text(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.chat.send_message(chat_id, text, &[]).await {
            logger::warning(
                LogTag::Commands,
                &format!("Reply to chat {} failed: {}", chat_id, e),
            );
        }
    }
}
