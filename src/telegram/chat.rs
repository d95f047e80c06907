//! Platform-neutral chat operations
//!
//! The tracking core talks to the chat through [`ChatApi`] only, so the
//! Telegram adapter can be swapped for a recording fake in tests.

use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Identifies one message in one chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

impl MessageRef {
    pub fn new(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.chat_id, self.message_id)
    }
}

/// Inline button attached to a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionButton {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

impl ActionButton {
    pub fn callback(label: &str, data: &str) -> Self {
        ActionButton::Callback {
            label: label.to_string(),
            data: data.to_string(),
        }
    }

    pub fn url(label: &str, url: &str) -> Self {
        ActionButton::Url {
            label: label.to_string(),
            url: url.to_string(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ActionButton::Callback { label, .. } | ActionButton::Url { label, .. } => label,
        }
    }
}

/// Rows of buttons, top to bottom
pub type ButtonRows = Vec<Vec<ActionButton>>;

/// A rendered message: HTML text plus its buttons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub text: String,
    pub buttons: ButtonRows,
}

/// Role of a user in a chat at the moment of asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRole {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberRole {
    /// Owners and administrators may toggle tracking
    pub fn is_privileged(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Administrator)
    }
}

/// The seven chat operations the bot relies on
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Send an HTML message with optional buttons (empty rows = no keyboard)
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> Result<MessageRef, ScanBotError>;

    /// Replace a message's text and buttons (empty rows remove the keyboard)
    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> Result<(), ScanBotError>;

    async fn delete_message(&self, message: MessageRef) -> Result<(), ScanBotError>;

    async fn pin_message(&self, message: MessageRef) -> Result<(), ScanBotError>;

    async fn unpin_message(&self, message: MessageRef) -> Result<(), ScanBotError>;

    /// Acknowledge a button press, optionally with a toast text
    async fn answer_callback(&self, query_id: &str, text: Option<&str>) -> Result<(), ScanBotError>;

    async fn member_role(&self, chat_id: i64, user_id: u64) -> Result<MemberRole, ScanBotError>;
}

/// Delete `message` after `delay` without holding up the caller
pub fn schedule_delete(chat: Arc<dyn ChatApi>, message: MessageRef, delay: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = chat.delete_message(message).await {
            logger::debug(
                LogTag::Telegram,
                &format!("Scheduled delete of {} failed: {}", message, e),
            );
        }
    });
}

/// Send a notice that deletes itself after `delay`
pub async fn send_transient(
    chat: &Arc<dyn ChatApi>,
    chat_id: i64,
    text: &str,
    delay: Duration,
) -> Result<MessageRef, ScanBotError> {
    let message = chat.send_message(chat_id, text, &[]).await?;
    schedule_delete(chat.clone(), message, delay);
    Ok(message)
}
