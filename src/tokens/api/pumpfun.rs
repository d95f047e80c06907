/// pump.fun coin API client (fallback for tokens still on the bonding curve)
///
/// Endpoint used:
/// - /coins/{mint} - coin metadata and market cap
///
/// Unlisted tokens have no pair on the aggregator yet, so this yields a
/// reduced snapshot: no transaction counts, volumes or price changes.
use super::dexscreener::millis_to_datetime;
use crate::errors::ScanBotError;
use crate::tokens::types::{SnapshotSource, TokenSnapshot};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub const PUMPFUN_BASE_URL: &str = "https://frontend-api.pump.fun";

/// pump.fun tokens are minted with 6 decimals
const TOKEN_DECIMALS: i32 = 6;

pub struct PumpFunClient {
    client: Client,
    base_url: String,
    rate_limiter: Arc<Semaphore>,
    timeout: Duration,
}

impl PumpFunClient {
    pub fn new(base_url: &str, max_concurrent: usize, timeout_seconds: u64) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    /// Fetch coin data for `mint`; 404 means the coin is unknown
    pub async fn fetch_snapshot(&self, mint: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
        let permit = self
            .rate_limiter
            .acquire()
            .await
            .map_err(|e| format!("Rate limiter error: {}", e))?;

        let url = format!("{}/coins/{}", self.base_url, mint);

        debug!("[PUMPFUN] Fetching coin: {}", mint);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        drop(permit);

        let status = response.status();
        if status.as_u16() == 404 || status.as_u16() == 204 {
            return Ok(None);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScanBotError::http_status(
                url,
                status.as_u16(),
                Some(error_text).filter(|t| !t.is_empty()),
            ));
        }

        let body = response.text().await?;
        parse_coin_response(&body, mint)
    }
}

/// Map a coin body to a snapshot; an empty body or a different mint is a miss
pub fn parse_coin_response(body: &str, mint: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
    if body.trim().is_empty() || body.trim() == "null" {
        return Ok(None);
    }

    let coin: PumpFunCoin = serde_json::from_str(body)?;
    if coin.mint.as_deref() != Some(mint) {
        return Ok(None);
    }

    Ok(Some(coin.to_snapshot(mint)))
}

#[derive(Debug, Deserialize)]
struct PumpFunCoin {
    mint: Option<String>,
    name: Option<String>,
    symbol: Option<String>,
    usd_market_cap: Option<f64>,
    total_supply: Option<f64>,
    created_timestamp: Option<i64>,
}

impl PumpFunCoin {
    fn to_snapshot(self, mint: &str) -> TokenSnapshot {
        let mut snap = TokenSnapshot::new(mint, SnapshotSource::PumpFun);
        snap.chain_id = "solana".to_string();
        snap.name = self.name.unwrap_or_default();
        snap.symbol = self.symbol.unwrap_or_default();
        snap.market_cap = self.usd_market_cap;
        snap.price_usd = match (self.usd_market_cap, self.total_supply) {
            (Some(cap), Some(raw_supply)) if raw_supply > 0.0 => {
                Some(cap / (raw_supply / 10f64.powi(TOKEN_DECIMALS)))
            }
            _ => None,
        };
        snap.created_at = self.created_timestamp.and_then(millis_to_datetime);
        snap.chart_url = Some(format!("https://pump.fun/coin/{}", mint));
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "8zSLdDzM1XsqnfrHmHvA9ir6pvYDjs8UXz6B2Tydd6b2";

    #[test]
    fn test_maps_coin_to_reduced_snapshot() {
        let body = format!(
            r#"{{
              "mint": "{}",
              "name": "Fresh Coin",
              "symbol": "FRESH",
              "usd_market_cap": 7500.0,
              "market_cap": 45.2,
              "total_supply": 1000000000000000,
              "created_timestamp": 1700000000000,
              "complete": false
            }}"#,
            MINT
        );

        let snap = parse_coin_response(&body, MINT).unwrap().unwrap();
        assert_eq!(snap.source, SnapshotSource::PumpFun);
        assert_eq!(snap.symbol, "FRESH");
        assert_eq!(snap.chain_id, "solana");
        assert_eq!(snap.market_cap, Some(7500.0));
        // 1e15 raw units at 6 decimals is 1e9 tokens
        assert_eq!(snap.price_usd, Some(0.0000075));
        assert_eq!(snap.created_at.map(|d| d.timestamp()), Some(1_700_000_000));
        assert_eq!(
            snap.chart_url.as_deref(),
            Some("https://pump.fun/coin/8zSLdDzM1XsqnfrHmHvA9ir6pvYDjs8UXz6B2Tydd6b2")
        );
        assert_eq!(snap.txns.h24.buys, None);
    }

    #[test]
    fn test_empty_or_foreign_body_is_none() {
        assert!(parse_coin_response("", MINT).unwrap().is_none());
        assert!(parse_coin_response("null", MINT).unwrap().is_none());
        assert!(parse_coin_response(r#"{"mint":"other"}"#, MINT).unwrap().is_none());
    }
}
