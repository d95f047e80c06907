//! Telegram integration for the scan bot
//!
//! # Architecture
//!
//! ```text
//! telegram/
//! ├── mod.rs           # This file - public API
//! ├── chat.rs          # ChatApi seam, MessageRef, buttons, roles
//! ├── bot.rs           # teloxide implementation of ChatApi
//! ├── polling.rs       # getUpdates loop
//! │
//! ├── keyboards.rs     # Card buttons and callback data
//! ├── formatters.rs    # HTML card and alert rendering
//! │
//! └── commands/        # Event handlers
//!     ├── mod.rs       # CommandSurface and incoming event types
//!     ├── message.rs   # Address lookups, /start, /help
//!     └── callbacks.rs # Refresh and Track/Untrack buttons
//! ```

// ============================================================================
// SUBMODULES
// ============================================================================

pub mod bot;
pub mod chat;
pub mod commands;
pub mod formatters;
pub mod keyboards;
pub mod polling;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use bot::TelegramChat;
pub use chat::{
    schedule_delete, send_transient, ActionButton, ButtonRows, Card, ChatApi, MemberRole,
    MessageRef,
};
pub use commands::{CommandSettings, CommandSurface, IncomingCallback, IncomingText};
pub use formatters::{html_escape, render_alert, render_card};
pub use keyboards::CallbackAction;
pub use polling::run_update_loop;
