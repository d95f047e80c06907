//! Telegram adapter for the chat operations
//!
//! Wraps a teloxide `Bot`. Messages go out as HTML with link previews off.

use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use crate::telegram::chat::{ActionButton, ChatApi, MemberRole, MessageRef};
use crate::telegram::keyboards::inline_keyboard;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, LinkPreviewOptions, MessageId, ParseMode, UserId};

fn no_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

/// Telegram implementation of [`ChatApi`]
#[derive(Clone)]
pub struct TelegramChat {
    bot: Bot,
}

impl TelegramChat {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Validate the token with getMe; returns the bot's username
    pub async fn connect(token: &str) -> Result<Self, ScanBotError> {
        let chat = Self::new(token);
        match chat.bot.get_me().await {
            Ok(me) => {
                let username = me.username.clone().unwrap_or_else(|| "unknown".to_string());
                logger::info(
                    LogTag::Telegram,
                    &format!("Bot initialized: @{} (ID: {})", username, me.id),
                );
                Ok(chat)
            }
            Err(e) => {
                logger::error(
                    LogTag::Telegram,
                    &format!("Failed to validate bot token: {}", e),
                );
                Err(ScanBotError::chat("getMe", e.to_string()))
            }
        }
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl ChatApi for TelegramChat {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> Result<MessageRef, ScanBotError> {
        let mut request = self
            .bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_link_preview());
        if !buttons.is_empty() {
            request = request.reply_markup(inline_keyboard(buttons));
        }

        let sent = request
            .await
            .map_err(|e| ScanBotError::chat("sendMessage", e.to_string()))?;
        Ok(MessageRef::new(chat_id, sent.id.0))
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> Result<(), ScanBotError> {
        let mut request = self
            .bot
            .edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_link_preview());
        if !buttons.is_empty() {
            request = request.reply_markup(inline_keyboard(buttons));
        }

        request
            .await
            .map_err(|e| ScanBotError::chat("editMessageText", e.to_string()))?;
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), ScanBotError> {
        self.bot
            .delete_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map_err(|e| ScanBotError::chat("deleteMessage", e.to_string()))?;
        Ok(())
    }

    async fn pin_message(&self, message: MessageRef) -> Result<(), ScanBotError> {
        self.bot
            .pin_chat_message(ChatId(message.chat_id), MessageId(message.message_id))
            .disable_notification(true)
            .await
            .map_err(|e| ScanBotError::chat("pinChatMessage", e.to_string()))?;
        Ok(())
    }

    async fn unpin_message(&self, message: MessageRef) -> Result<(), ScanBotError> {
        self.bot
            .unpin_chat_message(ChatId(message.chat_id))
            .message_id(MessageId(message.message_id))
            .await
            .map_err(|e| ScanBotError::chat("unpinChatMessage", e.to_string()))?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str, text: Option<&str>) -> Result<(), ScanBotError> {
        let mut request = self.bot.answer_callback_query(query_id.to_string());
        if let Some(text) = text {
            request = request.text(text.to_string());
        }
        request
            .await
            .map_err(|e| ScanBotError::chat("answerCallbackQuery", e.to_string()))?;
        Ok(())
    }

    async fn member_role(&self, chat_id: i64, user_id: u64) -> Result<MemberRole, ScanBotError> {
        let member = self
            .bot
            .get_chat_member(ChatId(chat_id), UserId(user_id))
            .await
            .map_err(|e| ScanBotError::chat("getChatMember", e.to_string()))?;

        let kind = &member.kind;
        let role = if kind.is_owner() {
            MemberRole::Owner
        } else if kind.is_administrator() {
            MemberRole::Administrator
        } else if kind.is_banned() {
            MemberRole::Banned
        } else if kind.is_left() {
            MemberRole::Left
        } else if kind.is_restricted() {
            MemberRole::Restricted
        } else {
            MemberRole::Member
        };
        Ok(role)
    }
}
