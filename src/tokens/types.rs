/// Normalized market data for one contract
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotSource {
    /// Listed pair on the price aggregator
    DexScreener,
    /// Bonding-curve token not yet listed on any DEX
    PumpFun,
}

/// Buy/sell counts for one time window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnCounts {
    pub buys: Option<u64>,
    pub sells: Option<u64>,
}

/// Values bucketed by the aggregator's standard windows
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Windows<T> {
    pub m5: T,
    pub h1: T,
    pub h6: T,
    pub h24: T,
}

/// One fetch result. Built fresh per fetch and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub address: String,
    pub chain_id: String,
    pub name: String,
    pub symbol: String,
    pub price_usd: Option<f64>,
    /// Fully diluted valuation, the value tracked for alerts
    pub market_cap: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub volume: Windows<Option<f64>>,
    pub txns: Windows<TxnCounts>,
    pub price_change: Windows<Option<f64>>,
    pub created_at: Option<DateTime<Utc>>,
    pub chart_url: Option<String>,
    pub source: SnapshotSource,
}

impl TokenSnapshot {
    /// An empty snapshot for `address`, filled in by the API mappers
    pub fn new(address: &str, source: SnapshotSource) -> Self {
        Self {
            address: address.to_string(),
            chain_id: String::new(),
            name: String::new(),
            symbol: String::new(),
            price_usd: None,
            market_cap: None,
            liquidity_usd: None,
            volume: Windows::default(),
            txns: Windows::default(),
            price_change: Windows::default(),
            created_at: None,
            chart_url: None,
            source,
        }
    }

    /// Symbol for display, falling back to a shortened address
    pub fn display_symbol(&self) -> String {
        if self.symbol.trim().is_empty() {
            short_address(&self.address)
        } else {
            self.symbol.clone()
        }
    }
}

/// `DezX...B263` style shortening for logs and notices
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
