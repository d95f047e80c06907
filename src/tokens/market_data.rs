//! Token Info Provider: primary aggregator with an unlisted-token fallback

use crate::config::ApiConfig;
use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use crate::tokens::address::{classify, AddressKind};
use crate::tokens::api::{DexScreenerClient, PumpFunClient};
use crate::tokens::types::TokenSnapshot;
use async_trait::async_trait;

/// Source of market snapshots
///
/// `Ok(None)` is a miss (nothing listed for the address). `Err` is a
/// transient failure; callers log it and treat it like a miss for this
/// attempt. There is no retry: the next poll or button press tries again.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch(&self, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError>;
}

#[async_trait]
impl TokenProvider for DexScreenerClient {
    async fn fetch(&self, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
        self.fetch_snapshot(address).await
    }
}

#[async_trait]
impl TokenProvider for PumpFunClient {
    async fn fetch(&self, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
        // pump.fun only knows Solana mints
        if classify(address) != Some(AddressKind::Base58) {
            return Ok(None);
        }
        self.fetch_snapshot(address).await
    }
}

/// Primary source first, fallback only when the primary has no pair
///
/// A primary error is returned as is; the fallback is not consulted.
pub struct MarketDataProvider {
    primary: Box<dyn TokenProvider>,
    fallback: Option<Box<dyn TokenProvider>>,
}

impl MarketDataProvider {
    pub fn new(primary: Box<dyn TokenProvider>, fallback: Option<Box<dyn TokenProvider>>) -> Self {
        Self { primary, fallback }
    }

    /// DexScreener search backed by pump.fun coin lookup
    pub fn from_config(api: &ApiConfig) -> Self {
        Self::new(
            Box::new(DexScreenerClient::new(
                &api.dexscreener_base_url,
                api.max_concurrent_requests,
                api.timeout_secs,
            )),
            Some(Box::new(PumpFunClient::new(
                &api.pumpfun_base_url,
                api.max_concurrent_requests,
                api.timeout_secs,
            ))),
        )
    }
}

#[async_trait]
impl TokenProvider for MarketDataProvider {
    async fn fetch(&self, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
        match self.primary.fetch(address).await {
            Ok(Some(snapshot)) => return Ok(Some(snapshot)),
            Ok(None) => {}
            Err(e) => {
                logger::warning(
                    LogTag::Api,
                    &format!("Primary lookup failed for {}: {}", address, e),
                );
                return Err(e);
            }
        }

        let Some(fallback) = self.fallback.as_ref() else {
            return Ok(None);
        };

        match fallback.fetch(address).await {
            Ok(Some(snapshot)) => {
                logger::debug(
                    LogTag::Api,
                    &format!("Using fallback data for unlisted token {}", address),
                );
                Ok(Some(snapshot))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                logger::warning(
                    LogTag::Api,
                    &format!("Fallback lookup failed for {}: {}", address, e),
                );
                Err(e)
            }
        }
    }
}
