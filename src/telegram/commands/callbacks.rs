//! Callback query handlers for the card buttons
//!
//! Every press is answered exactly once so the client stops its spinner.

use super::{CommandSurface, IncomingCallback, DENIED_TEXT, UNAVAILABLE_TEXT};
use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use crate::telegram::chat::MessageRef;
use crate::telegram::formatters::{html_escape, render_card};
use crate::telegram::keyboards::CallbackAction;
use crate::tokens::types::short_address;
use crate::tracking::pins::CardCommit;

impl CommandSurface {
    /// Route a button press to refresh or toggle
    pub async fn handle_callback(&self, callback: IncomingCallback) -> Result<(), ScanBotError> {
        let Some(action) = CallbackAction::parse(&callback.data) else {
            logger::debug(
                LogTag::Commands,
                &format!("Ignoring callback data '{}'", callback.data),
            );
            self.answer(&callback.query_id, None).await;
            return Ok(());
        };

        let Some(card) = callback.message else {
            self.answer(&callback.query_id, Some("Message is no longer available"))
                .await;
            return Ok(());
        };

        match action {
            CallbackAction::Refresh(address) => {
                self.handle_refresh(&callback.query_id, card, &address).await
            }
            CallbackAction::Toggle(address) => {
                self.handle_toggle(&callback.query_id, callback.user_id, card, &address)
                    .await
            }
        }
    }

    async fn handle_refresh(
        &self,
        query_id: &str,
        card: MessageRef,
        address: &str,
    ) -> Result<(), ScanBotError> {
        let Some(snapshot) = self.fetch_snapshot(address).await else {
            self.answer(query_id, Some(UNAVAILABLE_TEXT)).await;
            return Ok(());
        };
        self.answer(query_id, None).await;

        self.pins
            .replace_card(card, &snapshot, CardCommit::Refresh)
            .await?;
        Ok(())
    }

    async fn handle_toggle(
        &self,
        query_id: &str,
        user_id: u64,
        card: MessageRef,
        address: &str,
    ) -> Result<(), ScanBotError> {
        if !self.is_authorized(card.chat_id, user_id).await {
            logger::info(
                LogTag::Commands,
                &format!(
                    "User {} may not toggle {} in chat {}",
                    user_id, address, card.chat_id
                ),
            );
            self.answer(query_id, None).await;
            self.pins
                .notify_transient(card.chat_id, DENIED_TEXT, self.pins.timings().denial_notice_delay)
                .await;
            return Ok(());
        }

        if self.store.is_tracked(address) {
            self.toggle_off(query_id, card, address).await
        } else {
            self.toggle_on(query_id, card, address).await
        }
    }

    async fn toggle_on(
        &self,
        query_id: &str,
        card: MessageRef,
        address: &str,
    ) -> Result<(), ScanBotError> {
        let market_cap = self
            .fetch_snapshot(address)
            .await
            .and_then(|s| s.market_cap.filter(|c| c.is_finite() && *c > 0.0).map(|c| (s, c)));
        let Some((snapshot, market_cap)) = market_cap else {
            self.answer(query_id, Some(UNAVAILABLE_TEXT)).await;
            return Ok(());
        };
        self.answer(query_id, None).await;

        if let Err(e) = self.store.start_tracking(address, market_cap, card) {
            logger::info(LogTag::Commands, &format!("Toggle-on ignored: {}", e));
            return Ok(());
        }

        self.pins.pin_tracked(address, card).await;

        if self.store.pinned_ref(address) == Some(card) {
            let rendered = render_card(&snapshot, true);
            self.chat
                .edit_message(card, &rendered.text, &rendered.buttons)
                .await?;
        }
        Ok(())
    }

    async fn toggle_off(
        &self,
        query_id: &str,
        card: MessageRef,
        address: &str,
    ) -> Result<(), ScanBotError> {
        self.answer(query_id, None).await;

        let previous = match self.pins.release(address).await {
            Ok(previous) => previous,
            Err(e) => {
                logger::info(LogTag::Commands, &format!("Toggle-off ignored: {}", e));
                return Ok(());
            }
        };

        let snapshot = self.fetch_snapshot(address).await;
        let symbol = snapshot
            .as_ref()
            .map(|s| s.display_symbol())
            .unwrap_or_else(|| short_address(address));
        self.pins
            .notify_transient(
                card.chat_id,
                &format!("🔕 Stopped tracking <b>{}</b>", html_escape(&symbol)),
                self.pins.timings().untrack_notice_delay,
            )
            .await;

        if let Some(snapshot) = snapshot {
            if !self.store.is_tracked(address) {
                let rendered = render_card(&snapshot, false);
                let mut relabel = vec![card];
                if previous != card {
                    relabel.push(previous);
                }
                for target in relabel {
                    if let Err(e) = self
                        .chat
                        .edit_message(target, &rendered.text, &rendered.buttons)
                        .await
                    {
                        logger::debug(
                            LogTag::Commands,
                            &format!("Relabel of {} failed: {}", target, e),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    /// Owners and admins may toggle; so may the user of a private chat
    async fn is_authorized(&self, chat_id: i64, user_id: u64) -> bool {
        if chat_id > 0 && self.settings.allow_private_chat_toggle {
            return true;
        }
        match self.chat.member_role(chat_id, user_id).await {
            Ok(role) => role.is_privileged(),
            Err(e) => {
                logger::warning(
                    LogTag::Commands,
                    &format!("Role lookup for user {} in {} failed: {}", user_id, chat_id, e),
                );
                false
            }
        }
    }

    async fn answer(&self, query_id: &str, text: Option<&str>) {
        if let Err(e) = self.chat.answer_callback(query_id, text).await {
            logger::debug(
                LogTag::Commands,
                &format!("Answering callback {} failed: {}", query_id, e),
            );
        }
    }
}
