/// DexScreener API client (primary market data source)
///
/// API Documentation: https://docs.dexscreener.com/api/reference
///
/// Endpoint used:
/// - /latest/dex/search?q={query} - search pairs by free text (the contract address)
use crate::errors::ScanBotError;
use crate::tokens::types::{SnapshotSource, TokenSnapshot, TxnCounts, Windows};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";

/// Request timeout in seconds
pub const TIMEOUT_SECS: u64 = 10;

/// DexScreener search client
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<Semaphore>,
    timeout: Duration,
}

impl DexScreenerClient {
    pub fn new(base_url: &str, max_concurrent: usize, timeout_seconds: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// Search pairs for `address` and map the matching pair to a snapshot
    ///
    /// Returns `Ok(None)` when no pair has `address` as its base token.
    pub async fn fetch_snapshot(&self, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
        let permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| format!("Rate limiter error: {}", e))?;

        let url = format!("{}/latest/dex/search", self.base_url);

        debug!("[DEXSCREENER] Searching pairs: query={}", address);

        let response = self
            .client
            .get(&url)
            .query(&[("q", address)])
            .timeout(self.timeout)
            .send()
            .await?;

        drop(permit);

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScanBotError::http_status(
                url,
                status.as_u16(),
                Some(error_text).filter(|t| !t.is_empty()),
            ));
        }

        let body = response.text().await?;
        parse_search_response(&body, address)
    }
}

/// Parse a search response body and pick the pair whose base token is `address`
pub fn parse_search_response(body: &str, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
    let data: SearchResponse = serde_json::from_str(body)?;

    let pair = data
        .pairs
        .unwrap_or_default()
        .into_iter()
        .find(|p| {
            p.base_token
                .as_ref()
                .and_then(|t| t.address.as_deref())
                .map(|a| same_address(a, address))
                .unwrap_or(false)
        });

    Ok(pair.map(|p| p.to_snapshot(address)))
}

/// EVM addresses compare case-insensitively, base-58 mints exactly
fn same_address(candidate: &str, query: &str) -> bool {
    if query.starts_with("0x") {
        candidate.eq_ignore_ascii_case(query)
    } else {
        candidate == query
    }
}

// ===== Response Types =====

#[derive(Debug, Deserialize)]
struct SearchResponse {
    pairs: Option<Vec<DexScreenerPairRaw>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexScreenerPairRaw {
    chain_id: Option<String>,
    url: Option<String>,
    base_token: Option<TokenInfo>,
    price_usd: Option<String>,
    txns: Option<TxnWindowsRaw>,
    volume: Option<WindowsRaw>,
    price_change: Option<WindowsRaw>,
    liquidity: Option<LiquidityData>,
    fdv: Option<f64>,
    market_cap: Option<f64>,
    pair_created_at: Option<i64>,
}

impl DexScreenerPairRaw {
    fn to_snapshot(self, address: &str) -> TokenSnapshot {
        let mut snap = TokenSnapshot::new(address, SnapshotSource::DexScreener);

        if let Some(base) = self.base_token {
            snap.name = base.name.unwrap_or_default();
            snap.symbol = base.symbol.unwrap_or_default();
        }

        snap.chain_id = self.chain_id.unwrap_or_default();
        snap.chart_url = self.url.filter(|u| !u.is_empty());
        snap.price_usd = self.price_usd.and_then(|p| p.parse::<f64>().ok());
        snap.market_cap = self.fdv.or(self.market_cap);
        snap.liquidity_usd = self.liquidity.and_then(|l| l.usd);
        snap.created_at = self.pair_created_at.and_then(millis_to_datetime);

        if let Some(volume) = self.volume {
            snap.volume = volume.into();
        }
        if let Some(change) = self.price_change {
            snap.price_change = change.into();
        }
        if let Some(txns) = self.txns {
            snap.txns = Windows {
                m5: txns.m5.map(Into::into).unwrap_or_default(),
                h1: txns.h1.map(Into::into).unwrap_or_default(),
                h6: txns.h6.map(Into::into).unwrap_or_default(),
                h24: txns.h24.map(Into::into).unwrap_or_default(),
            };
        }

        snap
    }
}

pub(crate) fn millis_to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    if millis <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(millis).single()
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    address: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TxnWindowsRaw {
    m5: Option<TxnPeriodRaw>,
    h1: Option<TxnPeriodRaw>,
    h6: Option<TxnPeriodRaw>,
    h24: Option<TxnPeriodRaw>,
}

#[derive(Debug, Deserialize)]
struct TxnPeriodRaw {
    buys: Option<u64>,
    sells: Option<u64>,
}

impl From<TxnPeriodRaw> for TxnCounts {
    fn from(raw: TxnPeriodRaw) -> Self {
        TxnCounts {
            buys: raw.buys,
            sells: raw.sells,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WindowsRaw {
    m5: Option<f64>,
    h1: Option<f64>,
    h6: Option<f64>,
    h24: Option<f64>,
}

impl From<WindowsRaw> for Windows<Option<f64>> {
    fn from(raw: WindowsRaw) -> Self {
        Windows {
            m5: raw.m5,
            h1: raw.h1,
            h6: raw.h6,
            h24: raw.h24,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiquidityData {
    usd: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "DezXAZ8z7PinRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn search_body() -> String {
        format!(
            r#"{{
              "schemaVersion": "1.0.0",
              "pairs": [
                {{
                  "chainId": "solana",
                  "dexId": "raydium",
                  "url": "https://dexscreener.com/solana/pairone",
                  "pairAddress": "pairone",
                  "baseToken": {{ "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" }},
                  "quoteToken": {{ "address": "{mint}", "name": "Bonk", "symbol": "Bonk" }},
                  "priceUsd": "150.1"
                }},
                {{
                  "chainId": "solana",
                  "dexId": "orca",
                  "url": "https://dexscreener.com/solana/pairtwo",
                  "pairAddress": "pairtwo",
                  "baseToken": {{ "address": "{mint}", "name": "Bonk", "symbol": "Bonk" }},
                  "quoteToken": {{ "address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL" }},
                  "priceUsd": "0.00002451",
                  "txns": {{
                    "m5": {{ "buys": 12, "sells": 7 }},
                    "h1": {{ "buys": 140, "sells": 98 }},
                    "h24": {{ "buys": 4021, "sells": 3500 }}
                  }},
                  "volume": {{ "h24": 1500000.5, "h6": 320000, "h1": 51000, "m5": 900 }},
                  "priceChange": {{ "m5": 0.1, "h1": -1.25, "h6": 3, "h24": 12.5 }},
                  "liquidity": {{ "usd": 2500000.0, "base": 100, "quote": 200 }},
                  "fdv": 1750000000,
                  "marketCap": 1600000000,
                  "pairCreatedAt": 1670000000000
                }}
              ]
            }}"#,
            mint = MINT
        )
    }

    #[test]
    fn test_picks_pair_with_matching_base_token() {
        let snap = parse_search_response(&search_body(), MINT).unwrap().unwrap();

        assert_eq!(snap.symbol, "Bonk");
        assert_eq!(snap.chain_id, "solana");
        assert_eq!(snap.chart_url.as_deref(), Some("https://dexscreener.com/solana/pairtwo"));
        assert_eq!(snap.price_usd, Some(0.00002451));
        assert_eq!(snap.market_cap, Some(1_750_000_000.0));
        assert_eq!(snap.liquidity_usd, Some(2_500_000.0));
        assert_eq!(snap.txns.h24.buys, Some(4021));
        assert_eq!(snap.txns.h6, TxnCounts::default());
        assert_eq!(snap.price_change.h1, Some(-1.25));
        assert_eq!(snap.volume.h24, Some(1_500_000.5));
        assert_eq!(snap.created_at.map(|d| d.timestamp()), Some(1_670_000_000));
        assert_eq!(snap.source, SnapshotSource::DexScreener);
    }

    #[test]
    fn test_market_cap_falls_back_when_fdv_missing() {
        let body = format!(
            r#"{{"pairs":[{{"baseToken":{{"address":"{}"}},"marketCap":42000.0}}]}}"#,
            MINT
        );
        let snap = parse_search_response(&body, MINT).unwrap().unwrap();
        assert_eq!(snap.market_cap, Some(42_000.0));
        assert_eq!(snap.price_usd, None);
    }

    #[test]
    fn test_no_matching_pair_is_none() {
        assert!(parse_search_response(r#"{"pairs":[]}"#, MINT).unwrap().is_none());
        assert!(parse_search_response(r#"{"schemaVersion":"1.0.0","pairs":null}"#, MINT)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_evm_match_ignores_case() {
        let body = r#"{"pairs":[{"baseToken":{"address":"0xAbCdEf0000000000000000000000000000000001"},"fdv":10.0}]}"#;
        let snap = parse_search_response(body, "0xabcdef0000000000000000000000000000000001")
            .unwrap()
            .unwrap();
        assert_eq!(snap.market_cap, Some(10.0));
    }

    #[test]
    fn test_malformed_body_is_error() {
        let err = parse_search_response("<html>busy</html>", MINT).unwrap_err();
        assert!(matches!(err, ScanBotError::Data(_)));
    }
}
