//! Update loop
//!
//! Long-polls getUpdates and hands each text message or button press to the
//! command surface on its own task, so a handler waiting on a fetch or a
//! card delay never holds up the next update.

use crate::logger::{self, LogTag};
use crate::telegram::chat::MessageRef;
use crate::telegram::commands::{CommandSurface, IncomingCallback, IncomingText};
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, Message, UpdateKind};
use tokio::sync::watch;

/// Delay before retrying after a failed getUpdates call
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Poll until `shutdown` turns true
pub async fn run_update_loop(
    bot: Bot,
    surface: Arc<CommandSurface>,
    timeout_secs: u32,
    mut shutdown: watch::Receiver<bool>,
) {
    logger::info(LogTag::Telegram, "Update loop started");
    let mut offset: i32 = 0;

    while !*shutdown.borrow_and_update() {
        let mut request = bot.get_updates().timeout(timeout_secs);
        if offset > 0 {
            request = request.offset(offset);
        }

        let updates = tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            result = request.send() => result,
        };

        match updates {
            Ok(updates) => {
                for update in updates {
                    offset = update.id.0 as i32 + 1;
                    dispatch(update.kind, &surface);
                }
            }
            Err(e) => {
                logger::warning(LogTag::Telegram, &format!("getUpdates failed: {}", e));
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
            }
        }
    }
    logger::info(LogTag::Telegram, "Update loop stopped");
}

fn dispatch(kind: UpdateKind, surface: &Arc<CommandSurface>) {
    match kind {
        UpdateKind::Message(message) => {
            if let Some(incoming) = text_from_message(&message) {
                let surface = surface.clone();
                tokio::spawn(async move {
                    if let Err(e) = surface.handle_text(incoming).await {
                        logger::error(LogTag::Commands, &format!("Message handler failed: {}", e));
                    }
                });
            }
        }
        UpdateKind::CallbackQuery(query) => {
            let incoming = callback_from_query(&query);
            let surface = surface.clone();
            tokio::spawn(async move {
                if let Err(e) = surface.handle_callback(incoming).await {
                    logger::error(LogTag::Commands, &format!("Callback handler failed: {}", e));
                }
            });
        }
        other => {
            logger::verbose(LogTag::Telegram, &format!("Ignoring update: {:?}", other));
        }
    }
}

fn text_from_message(message: &Message) -> Option<IncomingText> {
    let text = message.text()?;
    Some(IncomingText {
        chat_id: message.chat.id.0,
        text: text.to_string(),
    })
}

fn callback_from_query(query: &CallbackQuery) -> IncomingCallback {
    IncomingCallback {
        query_id: query.id.to_string(),
        user_id: query.from.id.0,
        message: query
            .message
            .as_ref()
            .map(|m| MessageRef::new(m.chat().id.0, m.id().0)),
        data: query.data.clone().unwrap_or_default(),
    }
}
