/// Pinned card lifecycle
///
/// Keeps at most one pinned card per tracked contract across refreshes,
/// toggles and alerts. The store is the source of truth: every sequence
/// commits to the store first and then makes the chat agree with it,
/// re-reading the store after each suspension point.
use crate::config::TrackingConfig;
use crate::errors::{ScanBotError, TrackingError};
use crate::logger::{self, LogTag};
use crate::telegram::chat::{send_transient, ChatApi, MessageRef};
use crate::telegram::formatters::{render_card, REFRESHING_TEXT};
use crate::tokens::types::TokenSnapshot;
use crate::tracking::store::{PinUpdate, TrackingStore};
use std::sync::Arc;
use std::time::Duration;

/// Fixed delays used by the card sequences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinTimings {
    pub placeholder_delay: Duration,
    pub untrack_notice_delay: Duration,
    pub denial_notice_delay: Duration,
}

impl From<&TrackingConfig> for PinTimings {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            placeholder_delay: config.refresh_placeholder_delay(),
            untrack_notice_delay: config.untrack_notice_delay(),
            denial_notice_delay: config.denial_notice_delay(),
        }
    }
}

/// What a card replacement commits to the store
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardCommit {
    /// Manual refresh: move the pin, keep the baseline
    Refresh,
    /// Threshold alert: move the pin and the baseline to `market_cap`
    Alert { market_cap: f64 },
}

pub struct PinManager {
    chat: Arc<dyn ChatApi>,
    store: Arc<TrackingStore>,
    timings: PinTimings,
}

impl PinManager {
    pub fn new(chat: Arc<dyn ChatApi>, store: Arc<TrackingStore>, timings: PinTimings) -> Self {
        Self {
            chat,
            store,
            timings,
        }
    }

    pub fn timings(&self) -> PinTimings {
        self.timings
    }

    /// Replace `old` with a freshly rendered card and move the pin to it
    ///
    /// Placeholder, wait, delete, send. If the contract was tracked when the
    /// new card was rendered, the store is updated by `commit`, then the new
    /// card is pinned and the previous pin released. An alert whose card lost
    /// the race to another refresh still moves the baseline, and its card is
    /// deleted. Returns the new card.
    pub async fn replace_card(
        &self,
        old: MessageRef,
        snapshot: &TokenSnapshot,
        commit: CardCommit,
    ) -> Result<MessageRef, ScanBotError> {
        let address = snapshot.address.as_str();

        if let Err(e) = self.chat.edit_message(old, REFRESHING_TEXT, &[]).await {
            logger::debug(
                LogTag::Pins,
                &format!("Placeholder edit on {} failed: {}", old, e),
            );
        }

        tokio::time::sleep(self.timings.placeholder_delay).await;

        let old_deleted = match self.chat.delete_message(old).await {
            Ok(()) => true,
            Err(e) => {
                logger::warning(
                    LogTag::Pins,
                    &format!("Could not delete old card {}: {}", old, e),
                );
                false
            }
        };

        let tracked = self.store.is_tracked(address);
        let card = render_card(snapshot, tracked);
        let new_card = self
            .chat
            .send_message(old.chat_id, &card.text, &card.buttons)
            .await?;

        if !tracked {
            return Ok(new_card);
        }

        let committed = match commit {
            CardCommit::Refresh => self
                .store
                .replace_pin(address, new_card)
                .map(|previous| PinUpdate::Moved { previous }),
            CardCommit::Alert { market_cap } => {
                self.store.record_alert(address, old, market_cap, new_card)
            }
        };

        match committed {
            Ok(PinUpdate::Moved { previous }) => {
                // Deleting a pinned message also removes the pin
                if previous != new_card && !(previous == old && old_deleted) {
                    self.unpin_tolerant(previous).await;
                }
                self.pin_verified(address, new_card).await;
            }
            Ok(PinUpdate::Kept { current }) => {
                logger::info(
                    LogTag::Pins,
                    &format!(
                        "{} was re-pinned to {} meanwhile, removing card {}",
                        address, current, new_card
                    ),
                );
                if let Err(e) = self.chat.delete_message(new_card).await {
                    logger::warning(
                        LogTag::Pins,
                        &format!("Could not delete card {}: {}", new_card, e),
                    );
                }
            }
            Err(e) => {
                logger::info(
                    LogTag::Pins,
                    &format!("Card {} left unpinned: {}", new_card, e),
                );
                let card = render_card(snapshot, false);
                if let Err(e) = self.chat.edit_message(new_card, &card.text, &card.buttons).await {
                    logger::debug(
                        LogTag::Pins,
                        &format!("Relabel of {} failed: {}", new_card, e),
                    );
                }
            }
        }

        Ok(new_card)
    }

    /// Pin the card a toggle-on was pressed on; tracking is already recorded
    pub async fn pin_tracked(&self, address: &str, card: MessageRef) {
        self.pin_verified(address, card).await;
    }

    /// Clear tracking, then release the pin it owned
    ///
    /// Returns the card that was pinned. Unpin failure is logged and the
    /// contract stays untracked.
    pub async fn release(&self, address: &str) -> Result<MessageRef, TrackingError> {
        let previous = self.store.stop_tracking(address)?;
        self.unpin_tolerant(previous).await;
        Ok(previous)
    }

    /// Notice that disappears after `delay`
    pub async fn notify_transient(&self, chat_id: i64, text: &str, delay: Duration) {
        if let Err(e) = send_transient(&self.chat, chat_id, text, delay).await {
            logger::warning(
                LogTag::Pins,
                &format!("Transient notice to {} failed: {}", chat_id, e),
            );
        }
    }

    /// Pin `card`, then undo the pin if the store moved on meanwhile
    async fn pin_verified(&self, address: &str, card: MessageRef) {
        if let Err(e) = self.chat.pin_message(card).await {
            logger::warning(
                LogTag::Pins,
                &format!("Could not pin card {} for {}: {}", card, address, e),
            );
            return;
        }

        if self.store.pinned_ref(address) != Some(card) {
            logger::info(
                LogTag::Pins,
                &format!("{} changed while pinning {}, releasing it", address, card),
            );
            self.unpin_tolerant(card).await;
            return;
        }

        logger::debug(LogTag::Pins, &format!("Pinned card {} for {}", card, address));
    }

    async fn unpin_tolerant(&self, card: MessageRef) {
        if let Err(e) = self.chat.unpin_message(card).await {
            logger::warning(
                LogTag::Pins,
                &format!("Could not unpin card {}: {}", card, e),
            );
        }
    }
}
