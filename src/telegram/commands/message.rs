//! Text message handling: commands and address lookups

use super::{CommandSurface, IncomingText, HELP_TEXT, NOT_ADDRESS_TEXT, UNAVAILABLE_TEXT};
use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use crate::telegram::formatters::render_card;
use crate::tokens::address::{extract_candidate, is_contract_address};

impl CommandSurface {
    /// Reply to a text message with a card, a help text or nothing
    pub async fn handle_text(&self, message: IncomingText) -> Result<(), ScanBotError> {
        let text = message.text.trim();
        if text.is_empty() {
            return Ok(());
        }

        if let Some(command) = text.strip_prefix('/') {
            // "/help@scan_bot args" -> "help"
            let name = command
                .split_whitespace()
                .next()
                .and_then(|c| c.split('@').next())
                .unwrap_or_default();
            match name {
                "start" | "help" => self.send_text(message.chat_id, HELP_TEXT).await,
                other => logger::debug(
                    LogTag::Commands,
                    &format!("Ignoring unknown command /{}", other),
                ),
            }
            return Ok(());
        }

        let Some(candidate) = extract_candidate(text) else {
            return Ok(());
        };

        if !is_contract_address(candidate) {
            if self.settings.reply_to_non_addresses {
                self.send_text(message.chat_id, NOT_ADDRESS_TEXT).await;
            }
            return Ok(());
        }

        logger::debug(
            LogTag::Commands,
            &format!("Lookup {} for chat {}", candidate, message.chat_id),
        );

        let Some(snapshot) = self.fetch_snapshot(candidate).await else {
            self.send_text(message.chat_id, UNAVAILABLE_TEXT).await;
            return Ok(());
        };

        let card = render_card(&snapshot, self.store.is_tracked(candidate));
        self.chat
            .send_message(message.chat_id, &card.text, &card.buttons)
            .await?;
        Ok(())
    }
}
