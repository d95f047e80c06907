//! Card buttons and callback data
//!
//! Callback data is namespaced by action: `refresh_<address>` and
//! `toggle_<address>`. Addresses never contain `_`, so the first
//! underscore splits the action from the address.

use crate::telegram::chat::{ActionButton, ButtonRows};
use crate::logger::{self, LogTag};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const REFRESH_PREFIX: &str = "refresh";
pub const TOGGLE_PREFIX: &str = "toggle";

pub const REFRESH_LABEL: &str = "🔄 Refresh";
pub const TRACK_LABEL: &str = "📌 Track";
pub const UNTRACK_LABEL: &str = "🔕 Untrack";
pub const CHART_LABEL: &str = "📊 Chart";

/// A parsed button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Refresh(String),
    Toggle(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let parts: Vec<&str> = data.splitn(2, '_').collect();
        match parts.as_slice() {
            [REFRESH_PREFIX, address] if !address.is_empty() => {
                Some(CallbackAction::Refresh(address.to_string()))
            }
            [TOGGLE_PREFIX, address] if !address.is_empty() => {
                Some(CallbackAction::Toggle(address.to_string()))
            }
            _ => None,
        }
    }

    pub fn address(&self) -> &str {
        match self {
            CallbackAction::Refresh(address) | CallbackAction::Toggle(address) => address,
        }
    }
}

pub fn refresh_data(address: &str) -> String {
    format!("{}_{}", REFRESH_PREFIX, address)
}

pub fn toggle_data(address: &str) -> String {
    format!("{}_{}", TOGGLE_PREFIX, address)
}

/// Refresh + Track/Untrack on the first row, chart link below
pub fn card_buttons(address: &str, tracked: bool, chart_url: Option<&str>) -> ButtonRows {
    let toggle_label = if tracked { UNTRACK_LABEL } else { TRACK_LABEL };
    let mut rows = vec![vec![
        ActionButton::callback(REFRESH_LABEL, &refresh_data(address)),
        ActionButton::callback(toggle_label, &toggle_data(address)),
    ]];
    if let Some(url) = chart_url.filter(|u| !u.is_empty()) {
        rows.push(vec![ActionButton::url(CHART_LABEL, url)]);
    }
    rows
}

/// Convert button rows to a Telegram inline keyboard
///
/// A URL that does not parse is dropped from its row; Telegram rejects the
/// whole message otherwise.
pub fn inline_keyboard(rows: &[Vec<ActionButton>]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().filter_map(to_inline_button).collect::<Vec<_>>())
        .filter(|row| !row.is_empty())
        .collect();
    InlineKeyboardMarkup::new(rows)
}

fn to_inline_button(button: &ActionButton) -> Option<InlineKeyboardButton> {
    match button {
        ActionButton::Callback { label, data } => {
            Some(InlineKeyboardButton::callback(label.clone(), data.clone()))
        }
        ActionButton::Url { label, url } => match url.parse() {
            Ok(parsed) => Some(InlineKeyboardButton::url(label.clone(), parsed)),
            Err(_) => {
                logger::warning(LogTag::Telegram, &format!("Dropping button with invalid url '{}'", url));
                None
            }
        },
    }
}
