/// In-memory table of tracked contracts
///
/// Only tracked contracts occupy the table. Looking up an address that was
/// never tracked returns an `Untracked` view without inserting anything, so
/// one-off lookups never grow the table.
///
/// Every mutation is one compare-and-set under the lock: read the entry,
/// check the precondition, write. The lock is never held across an await,
/// so handlers that suspend between steps must re-check through these
/// operations instead of caching state.
use crate::errors::TrackingError;
use crate::logger::{self, LogTag};
use crate::telegram::chat::MessageRef;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Alert state of a tracked contract. The three fields exist together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracking {
    pub initial_market_cap: f64,
    pub last_alerted_cap: f64,
    pub pinned: MessageRef,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackingState {
    Untracked,
    Tracked(Tracking),
}

/// How a pin-moving commit landed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinUpdate {
    /// The pin moved to the new card; `previous` is the card it left
    Moved { previous: MessageRef },
    /// The pin had already moved to `current`; it was left there
    Kept { current: MessageRef },
}

/// A contract and its current tracking state
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedContract {
    pub address: String,
    pub state: TrackingState,
}

impl TrackedContract {
    pub fn is_tracked(&self) -> bool {
        matches!(self.state, TrackingState::Tracked(_))
    }

    pub fn initial_market_cap(&self) -> Option<f64> {
        self.tracking().map(|t| t.initial_market_cap)
    }

    pub fn last_alerted_cap(&self) -> Option<f64> {
        self.tracking().map(|t| t.last_alerted_cap)
    }

    pub fn pinned_message_ref(&self) -> Option<MessageRef> {
        self.tracking().map(|t| t.pinned)
    }

    fn tracking(&self) -> Option<&Tracking> {
        match &self.state {
            TrackingState::Tracked(t) => Some(t),
            TrackingState::Untracked => None,
        }
    }
}

#[derive(Default)]
pub struct TrackingStore {
    entries: Mutex<HashMap<String, Tracking>>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of `address`; never fails
    pub fn get(&self, address: &str) -> TrackedContract {
        let state = match self.entries.lock().get(address) {
            Some(tracking) => TrackingState::Tracked(*tracking),
            None => TrackingState::Untracked,
        };
        TrackedContract {
            address: address.to_string(),
            state,
        }
    }

    pub fn is_tracked(&self, address: &str) -> bool {
        self.entries.lock().contains_key(address)
    }

    pub fn pinned_ref(&self, address: &str) -> Option<MessageRef> {
        self.entries.lock().get(address).map(|t| t.pinned)
    }

    /// Addresses and states of every tracked contract
    pub fn tracked(&self) -> Vec<(String, Tracking)> {
        let mut list: Vec<(String, Tracking)> = self
            .entries
            .lock()
            .iter()
            .map(|(address, tracking)| (address.clone(), *tracking))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Begin tracking with `market_cap` as both the initial cap and the baseline
    pub fn start_tracking(
        &self,
        address: &str,
        market_cap: f64,
        pinned: MessageRef,
    ) -> Result<(), TrackingError> {
        let mut entries = self.entries.lock();
        if entries.contains_key(address) {
            return Err(TrackingError::AlreadyTracked {
                address: address.to_string(),
            });
        }
        entries.insert(
            address.to_string(),
            Tracking {
                initial_market_cap: market_cap,
                last_alerted_cap: market_cap,
                pinned,
            },
        );
        drop(entries);

        logger::info(
            LogTag::Tracker,
            &format!(
                "Tracking {} from market cap {:.2} (card {})",
                address, market_cap, pinned
            ),
        );
        Ok(())
    }

    /// Clear tracking and hand back the card the caller must unpin
    pub fn stop_tracking(&self, address: &str) -> Result<MessageRef, TrackingError> {
        let removed = self.entries.lock().remove(address);
        match removed {
            Some(tracking) => {
                logger::info(
                    LogTag::Tracker,
                    &format!("Stopped tracking {} (card {})", address, tracking.pinned),
                );
                Ok(tracking.pinned)
            }
            None => Err(TrackingError::NotTracked {
                address: address.to_string(),
            }),
        }
    }

    /// Move the baseline to `new_cap` and the pin to `new_pin`
    ///
    /// `replacing` is the card the alert was computed against. The alert has
    /// been posted by now, so the baseline always moves while the contract is
    /// tracked. If the pin moved since (a refresh or a re-track), it stays
    /// where it is and `Kept` tells the caller to drop `new_pin`.
    pub fn record_alert(
        &self,
        address: &str,
        replacing: MessageRef,
        new_cap: f64,
        new_pin: MessageRef,
    ) -> Result<PinUpdate, TrackingError> {
        let mut entries = self.entries.lock();
        let tracking = entries
            .get_mut(address)
            .ok_or_else(|| TrackingError::NotTracked {
                address: address.to_string(),
            })?;

        let previous_cap = std::mem::replace(&mut tracking.last_alerted_cap, new_cap);
        let update = if tracking.pinned == replacing {
            let previous = std::mem::replace(&mut tracking.pinned, new_pin);
            PinUpdate::Moved { previous }
        } else {
            PinUpdate::Kept {
                current: tracking.pinned,
            }
        };
        drop(entries);

        logger::debug(
            LogTag::Tracker,
            &format!(
                "Baseline for {} moved {:.2} -> {:.2} ({:?})",
                address, previous_cap, new_cap, update
            ),
        );
        Ok(update)
    }

    /// Point a tracked contract at a freshly sent card; baseline unchanged
    pub fn replace_pin(&self, address: &str, new_pin: MessageRef) -> Result<MessageRef, TrackingError> {
        let mut entries = self.entries.lock();
        let tracking = entries
            .get_mut(address)
            .ok_or_else(|| TrackingError::NotTracked {
                address: address.to_string(),
            })?;
        let previous = std::mem::replace(&mut tracking.pinned, new_pin);
        drop(entries);

        logger::debug(
            LogTag::Tracker,
            &format!("Card for {} moved {} -> {}", address, previous, new_pin),
        );
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: i32) -> MessageRef {
        MessageRef::new(-100, id)
    }

    #[test]
    fn test_unknown_address_is_untracked_and_not_stored() {
        let store = TrackingStore::new();
        let contract = store.get("TOKEN_A");

        assert_eq!(contract.state, TrackingState::Untracked);
        assert_eq!(contract.initial_market_cap(), None);
        assert_eq!(contract.last_alerted_cap(), None);
        assert_eq!(contract.pinned_message_ref(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_start_sets_linked_fields_together() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_A", 100_000.0, card(1)).unwrap();

        let contract = store.get("TOKEN_A");
        assert!(contract.is_tracked());
        assert_eq!(contract.initial_market_cap(), Some(100_000.0));
        assert_eq!(contract.initial_market_cap(), contract.last_alerted_cap());
        assert_eq!(contract.pinned_message_ref(), Some(card(1)));
    }

    #[test]
    fn test_start_twice_is_rejected_without_change() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_A", 100.0, card(1)).unwrap();

        let err = store.start_tracking("TOKEN_A", 999.0, card(2)).unwrap_err();
        assert_eq!(
            err,
            TrackingError::AlreadyTracked {
                address: "TOKEN_A".to_string()
            }
        );
        assert_eq!(store.get("TOKEN_A").last_alerted_cap(), Some(100.0));
        assert_eq!(store.pinned_ref("TOKEN_A"), Some(card(1)));
    }

    #[test]
    fn test_stop_returns_pin_and_clears_all_fields() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_A", 100.0, card(7)).unwrap();

        assert_eq!(store.stop_tracking("TOKEN_A"), Ok(card(7)));
        let contract = store.get("TOKEN_A");
        assert_eq!(contract.initial_market_cap(), None);
        assert_eq!(contract.last_alerted_cap(), None);
        assert_eq!(contract.pinned_message_ref(), None);
    }

    #[test]
    fn test_stop_untracked_is_reported_noop() {
        let store = TrackingStore::new();
        let err = store.stop_tracking("TOKEN_A").unwrap_err();
        assert_eq!(
            err,
            TrackingError::NotTracked {
                address: "TOKEN_A".to_string()
            }
        );

        store.start_tracking("TOKEN_A", 1.0, card(1)).unwrap();
        store.stop_tracking("TOKEN_A").unwrap();
        assert!(store.stop_tracking("TOKEN_A").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_alert_moves_baseline_and_pin() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_A", 100_000.0, card(1)).unwrap();

        let update = store
            .record_alert("TOKEN_A", card(1), 106_000.0, card(2))
            .unwrap();
        assert_eq!(update, PinUpdate::Moved { previous: card(1) });

        let contract = store.get("TOKEN_A");
        assert_eq!(contract.initial_market_cap(), Some(100_000.0));
        assert_eq!(contract.last_alerted_cap(), Some(106_000.0));
        assert_eq!(contract.pinned_message_ref(), Some(card(2)));
    }

    #[test]
    fn test_record_alert_requires_tracking() {
        let store = TrackingStore::new();
        let err = store
            .record_alert("TOKEN_A", card(1), 5.0, card(2))
            .unwrap_err();
        assert!(matches!(err, TrackingError::NotTracked { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_record_alert_against_moved_pin_keeps_pin_and_moves_baseline() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_A", 100.0, card(1)).unwrap();
        store.replace_pin("TOKEN_A", card(3)).unwrap();

        let update = store
            .record_alert("TOKEN_A", card(1), 200.0, card(4))
            .unwrap();
        assert_eq!(update, PinUpdate::Kept { current: card(3) });
        assert_eq!(store.get("TOKEN_A").last_alerted_cap(), Some(200.0));
        assert_eq!(store.get("TOKEN_A").initial_market_cap(), Some(100.0));
        assert_eq!(store.pinned_ref("TOKEN_A"), Some(card(3)));
    }

    #[test]
    fn test_replace_pin_keeps_baseline() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_A", 50.0, card(1)).unwrap();

        assert_eq!(store.replace_pin("TOKEN_A", card(9)), Ok(card(1)));
        assert_eq!(store.get("TOKEN_A").last_alerted_cap(), Some(50.0));
        assert_eq!(store.pinned_ref("TOKEN_A"), Some(card(9)));
        assert!(store.replace_pin("TOKEN_B", card(2)).is_err());
    }

    #[test]
    fn test_tracked_lists_only_tracked_contracts() {
        let store = TrackingStore::new();
        store.start_tracking("TOKEN_B", 2.0, card(2)).unwrap();
        store.start_tracking("TOKEN_A", 1.0, card(1)).unwrap();
        let _ = store.get("TOKEN_C");

        let listed: Vec<String> = store.tracked().into_iter().map(|(a, _)| a).collect();
        assert_eq!(listed, vec!["TOKEN_A".to_string(), "TOKEN_B".to_string()]);
        assert_eq!(store.len(), 2);
    }
}
