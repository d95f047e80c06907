//! Card and alert rendering
//!
//! Everything here is pure: the same snapshot, tracking flag and clock give
//! the same text. Provider-supplied strings are HTML-escaped before they
//! reach the message.

use crate::telegram::chat::Card;
use crate::telegram::keyboards::card_buttons;
use crate::tokens::types::{SnapshotSource, TokenSnapshot, TxnCounts};
use crate::tracking::poller::{Direction, MarketCapMove};
use chrono::{DateTime, Utc};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// Text shown on a card while it is being replaced
pub const REFRESHING_TEXT: &str = "🔄 Refreshing...";

/// Escape `&`, `<` and `>` for Telegram HTML
pub use teloxide::utils::html::escape as html_escape;

/// 1500000 -> "1.50M"; below one thousand keeps two decimals
pub fn format_large_number(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}

/// Buy/sell counts: plain below one thousand, abbreviated above
pub fn format_count(count: u64) -> String {
    if count < 1_000 {
        count.to_string()
    } else {
        format_large_number(count as f64)
    }
}

pub fn format_price(price: f64) -> String {
    if price <= 0.0 {
        "0".to_string()
    } else if price < 0.000001 {
        format!("{:.2e}", price)
    } else if price < 0.001 {
        format!("{:.9}", price)
    } else if price < 1.0 {
        format!("{:.6}", price)
    } else {
        format!("{:.4}", price)
    }
}

/// 🟢 for gains, 🔴 for losses, ⚪ for flat
pub fn format_price_change(change: f64) -> String {
    let glyph = if change > 0.0 {
        "🟢"
    } else if change < 0.0 {
        "🔴"
    } else {
        "⚪"
    };
    format!("{}{:.2}%", glyph, change)
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Relative age in the two largest whole units
///
/// Years and months when at least a year old, months and days when at
/// least a month, days and hours when at least a day, else hours and
/// minutes. Months are 30 days and years 365.
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total = (now - created_at).num_seconds().max(0);
    let days = total / SECONDS_PER_DAY;

    if days >= DAYS_PER_YEAR {
        let years = days / DAYS_PER_YEAR;
        let months = (days % DAYS_PER_YEAR) / DAYS_PER_MONTH;
        format!("{}, {}", plural(years, "year"), plural(months, "month"))
    } else if days >= DAYS_PER_MONTH {
        let months = days / DAYS_PER_MONTH;
        format!("{}, {}", plural(months, "month"), plural(days % DAYS_PER_MONTH, "day"))
    } else if days >= 1 {
        let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
        format!("{}, {}", plural(days, "day"), plural(hours, "hour"))
    } else {
        let hours = total / SECONDS_PER_HOUR;
        let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
        format!("{}, {}", plural(hours, "hour"), plural(minutes, "minute"))
    }
}

fn usd(value: Option<f64>) -> String {
    value
        .map(|v| format!("${}", format_large_number(v)))
        .unwrap_or_else(|| "N/A".to_string())
}

fn change(value: Option<f64>) -> String {
    value.map(format_price_change).unwrap_or_else(|| "N/A".to_string())
}

fn buys_sells(counts: &TxnCounts) -> String {
    let side = |c: Option<u64>| c.map(format_count).unwrap_or_else(|| "N/A".to_string());
    format!("{}/{}", side(counts.buys), side(counts.sells))
}

/// Render the card for `snapshot` as of `now`
pub fn render_card_at(snapshot: &TokenSnapshot, tracked: bool, now: DateTime<Utc>) -> Card {
    let chain = if snapshot.chain_id.is_empty() {
        "N/A".to_string()
    } else {
        html_escape(&snapshot.chain_id.to_uppercase())
    };
    let age = snapshot
        .created_at
        .map(|created| format_age(created, now))
        .unwrap_or_else(|| "N/A".to_string());
    let price = snapshot
        .price_usd
        .map(|p| format!("${}", format_price(p)))
        .unwrap_or_else(|| "N/A".to_string());

    let mut text = format!(
        "<b>Chain:</b> {chain}\n\
         \n\
         <b>Token Name:</b> {name}\n\
         <b>Symbol:</b> {symbol}\n\
         <b>Price (USD):</b> {price}\n\
         <b>Market Cap (USD):</b> {mcap}\n\
         <b>Liquidity (USD):</b> {liquidity}\n\
         <b>24h Volume (USD):</b> {volume}\n\
         <b>Age:</b> {age}\n",
        chain = chain,
        name = html_escape(&snapshot.name),
        symbol = html_escape(&snapshot.display_symbol()),
        price = price,
        mcap = usd(snapshot.market_cap),
        liquidity = usd(snapshot.liquidity_usd),
        volume = usd(snapshot.volume.h24),
        age = age,
    );

    match snapshot.source {
        SnapshotSource::DexScreener => {
            text.push_str(&format!(
                "\n\
                 <b>Buys/Sells (5m):</b> {}\n\
                 <b>Buys/Sells (1h):</b> {}\n\
                 <b>Buys/Sells (24h):</b> {}\n\
                 \n\
                 <b>Price Change (5m):</b> {}\n\
                 <b>Price Change (1h):</b> {}\n\
                 <b>Price Change (6h):</b> {}\n\
                 <b>Price Change (24h):</b> {}\n",
                buys_sells(&snapshot.txns.m5),
                buys_sells(&snapshot.txns.h1),
                buys_sells(&snapshot.txns.h24),
                change(snapshot.price_change.m5),
                change(snapshot.price_change.h1),
                change(snapshot.price_change.h6),
                change(snapshot.price_change.h24),
            ));
        }
        SnapshotSource::PumpFun => {
            text.push_str("\n<i>Not listed on a DEX yet (bonding curve data)</i>\n");
        }
    }

    text.push_str(&format!("\n<code>{}</code>", html_escape(&snapshot.address)));
    if tracked {
        text.push_str("\n📌 <i>Tracking market cap</i>");
    }

    Card {
        text,
        buttons: card_buttons(&snapshot.address, tracked, snapshot.chart_url.as_deref()),
    }
}

pub fn render_card(snapshot: &TokenSnapshot, tracked: bool) -> Card {
    render_card_at(snapshot, tracked, Utc::now())
}

/// One-line alert announcing a threshold move
pub fn render_alert(snapshot: &TokenSnapshot, movement: &MarketCapMove) -> String {
    let glyph = match movement.direction {
        Direction::Up => "📈",
        Direction::Down => "📉",
    };
    format!(
        "{} <b>{}</b> market cap {} {:+.2}%\n${} → ${}",
        glyph,
        html_escape(&snapshot.display_symbol()),
        movement.direction,
        movement.change_pct,
        format_large_number(movement.baseline),
        format_large_number(movement.current),
    )
}
