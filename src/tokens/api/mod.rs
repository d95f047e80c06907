/// API clients for external token data sources
pub mod dexscreener;
pub mod pumpfun;

pub use dexscreener::DexScreenerClient;
pub use pumpfun::PumpFunClient;
