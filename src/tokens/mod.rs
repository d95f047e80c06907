//! Token data: address classification, market snapshots and their sources
//!
//! - `address`: surface-format check for contract addresses
//! - `types`: the normalized `TokenSnapshot`
//! - `api`: DexScreener (primary) and pump.fun (fallback) clients
//! - `market_data`: the `TokenProvider` seam combining both sources

pub mod address;
pub mod api;
pub mod market_data;
pub mod types;

pub use address::{classify, extract_candidate, is_contract_address, AddressKind};
pub use market_data::{MarketDataProvider, TokenProvider};
pub use types::{short_address, SnapshotSource, TokenSnapshot, TxnCounts, Windows};
