//! Market cap tracking: store, pinned card lifecycle and poll loop
//!
//! - `store`: authoritative table of tracked contracts
//! - `pins`: keeps one live pinned card per tracked contract
//! - `poller`: periodic threshold check that drives alerts

pub mod pins;
pub mod poller;
pub mod store;

pub use pins::{CardCommit, PinManager, PinTimings};
pub use poller::{evaluate_move, CycleReport, Direction, MarketCapMove, Poller};
pub use store::{PinUpdate, TrackedContract, Tracking, TrackingState, TrackingStore};
