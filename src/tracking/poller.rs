/// Market cap poll loop
///
/// On each tick every tracked contract is re-fetched and compared against
/// its last alerted market cap. A move of at least the threshold posts an
/// alert and replaces the pinned card. Contracts are checked concurrently
/// and one contract's failure never stops the others.
use crate::config::TrackingConfig;
use crate::errors::ScanBotError;
use crate::logger::{self, LogTag};
use crate::telegram::chat::ChatApi;
use crate::telegram::formatters::render_alert;
use crate::tokens::market_data::TokenProvider;
use crate::tokens::types::TokenSnapshot;
use crate::tracking::pins::{CardCommit, PinManager};
use crate::tracking::store::{Tracking, TrackingStore};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A threshold-crossing move between two market caps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketCapMove {
    pub direction: Direction,
    /// Signed percentage, e.g. 6.0 for +6%
    pub change_pct: f64,
    pub baseline: f64,
    pub current: f64,
}

/// Compare `current` against `baseline`; `Some` when the relative move is
/// at least `threshold` (inclusive)
///
/// A zero, negative or non-finite baseline yields `None`.
pub fn evaluate_move(baseline: f64, current: f64, threshold: f64) -> Option<MarketCapMove> {
    if !baseline.is_finite() || !current.is_finite() || baseline <= 0.0 {
        return None;
    }

    let delta = (current - baseline).abs() / baseline;
    if !delta.is_finite() || delta < threshold {
        return None;
    }

    let direction = if current > baseline {
        Direction::Up
    } else {
        Direction::Down
    };

    Some(MarketCapMove {
        direction,
        change_pct: (current - baseline) / baseline * 100.0,
        baseline,
        current,
    })
}

/// Totals for one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub alerts: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckOutcome {
    Alerted,
    Unchanged,
    Skipped,
}

pub struct Poller {
    provider: Arc<dyn TokenProvider>,
    store: Arc<TrackingStore>,
    pins: Arc<PinManager>,
    chat: Arc<dyn ChatApi>,
    threshold: f64,
    interval: Duration,
    start_delay: Duration,
}

impl Poller {
    pub fn new(
        provider: Arc<dyn TokenProvider>,
        store: Arc<TrackingStore>,
        pins: Arc<PinManager>,
        chat: Arc<dyn ChatApi>,
        config: &TrackingConfig,
    ) -> Self {
        Self {
            provider,
            store,
            pins,
            chat,
            threshold: config.alert_threshold,
            interval: config.poll_interval(),
            start_delay: config.poll_start_delay(),
        }
    }

    /// Tick until `shutdown` turns true
    ///
    /// The flag is re-read before every wait, so a shutdown requested while
    /// a cycle is running stops the loop once that cycle ends.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        logger::info(
            LogTag::Poller,
            &format!(
                "Poll loop starting in {}s, every {}s, threshold {:.2}%",
                self.start_delay.as_secs(),
                self.interval.as_secs(),
                self.threshold * 100.0
            ),
        );

        let mut ticker = interval_at(Instant::now() + self.start_delay, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !*shutdown.borrow_and_update() {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let report = self.run_cycle().await;
                    if report.checked > 0 {
                        logger::debug(
                            LogTag::Poller,
                            &format!(
                                "Cycle: checked={} alerts={} unchanged={} skipped={}",
                                report.checked, report.alerts, report.unchanged, report.skipped
                            ),
                        );
                    }
                }
            }
        }
        logger::info(LogTag::Poller, "Poll loop stopped");
    }

    /// Check every tracked contract once
    pub async fn run_cycle(&self) -> CycleReport {
        let tracked = self.store.tracked();
        let checks = tracked
            .iter()
            .map(|(address, tracking)| self.check_contract(address, *tracking));
        let outcomes = join_all(checks).await;

        let mut report = CycleReport {
            checked: outcomes.len(),
            ..CycleReport::default()
        };
        for outcome in outcomes {
            match outcome {
                CheckOutcome::Alerted => report.alerts += 1,
                CheckOutcome::Unchanged => report.unchanged += 1,
                CheckOutcome::Skipped => report.skipped += 1,
            }
        }
        report
    }

    async fn check_contract(&self, address: &str, tracking: Tracking) -> CheckOutcome {
        let snapshot = match self.provider.fetch(address).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                logger::debug(LogTag::Poller, &format!("No data for {} this cycle", address));
                return CheckOutcome::Skipped;
            }
            Err(e) => {
                logger::warning(
                    LogTag::Poller,
                    &format!("Fetch failed for {}, skipping this cycle: {}", address, e),
                );
                return CheckOutcome::Skipped;
            }
        };

        let Some(current) = snapshot.market_cap else {
            return CheckOutcome::Skipped;
        };

        // Baseline as of now, not as of the cycle start
        let Some(baseline) = self.store.get(address).last_alerted_cap() else {
            return CheckOutcome::Skipped;
        };
        if baseline <= 0.0 {
            return CheckOutcome::Skipped;
        }

        let Some(movement) = evaluate_move(baseline, current, self.threshold) else {
            logger::verbose(
                LogTag::Poller,
                &format!("{} at {:.2} vs baseline {:.2}, no alert", address, current, baseline),
            );
            return CheckOutcome::Unchanged;
        };

        match self.alert(address, tracking, &snapshot, &movement).await {
            Ok(()) => CheckOutcome::Alerted,
            Err(e) => {
                logger::error(
                    LogTag::Poller,
                    &format!("Alert for {} failed: {}", address, e),
                );
                CheckOutcome::Skipped
            }
        }
    }

    async fn alert(
        &self,
        address: &str,
        tracking: Tracking,
        snapshot: &TokenSnapshot,
        movement: &MarketCapMove,
    ) -> Result<(), ScanBotError> {
        let pinned = self.store.pinned_ref(address).unwrap_or(tracking.pinned);

        logger::info(
            LogTag::Poller,
            &format!(
                "{} market cap {} {:+.2}% ({:.2} -> {:.2})",
                address, movement.direction, movement.change_pct, movement.baseline, movement.current
            ),
        );

        self.chat
            .send_message(pinned.chat_id, &render_alert(snapshot, movement), &[])
            .await?;

        self.pins
            .replace_card(
                pinned,
                snapshot,
                CardCommit::Alert {
                    market_cap: movement.current,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::chat::MessageRef;
    use crate::testing::{snapshot, ChatCall, RecordingChat, ScriptedProvider};
    use crate::tracking::pins::PinTimings;

    const CHAT: i64 = -100;

    struct Harness {
        recorder: Arc<RecordingChat>,
        store: Arc<TrackingStore>,
        provider: Arc<ScriptedProvider>,
        pins: Arc<PinManager>,
        poller: Poller,
    }

    fn harness() -> Harness {
        let recorder = Arc::new(RecordingChat::new());
        let store = Arc::new(TrackingStore::new());
        let provider = Arc::new(ScriptedProvider::new());
        let pins = Arc::new(PinManager::new(
            recorder.clone(),
            store.clone(),
            PinTimings {
                placeholder_delay: Duration::from_secs(2),
                untrack_notice_delay: Duration::from_secs(5),
                denial_notice_delay: Duration::from_secs(10),
            },
        ));
        let poller = Poller::new(
            provider.clone(),
            store.clone(),
            pins.clone(),
            recorder.clone(),
            &TrackingConfig::default(),
        );
        Harness {
            recorder,
            store,
            provider,
            pins,
            poller,
        }
    }

    fn alerts_sent(recorder: &RecordingChat) -> usize {
        recorder
            .sent_texts()
            .iter()
            .filter(|t| t.contains("market cap up") || t.contains("market cap down"))
            .count()
    }

    #[test]
    fn test_evaluate_move_threshold_is_inclusive() {
        let movement = evaluate_move(100_000.0, 105_000.0, 0.05).unwrap();
        assert_eq!(movement.direction, Direction::Up);
        assert!((movement.change_pct - 5.0).abs() < 1e-9);

        assert!(evaluate_move(100_000.0, 104_999.0, 0.05).is_none());
        let down = evaluate_move(100_000.0, 95_000.0, 0.05).unwrap();
        assert_eq!(down.direction, Direction::Down);
        assert!(down.change_pct < 0.0);
    }

    #[test]
    fn test_evaluate_move_skips_undefined_baselines() {
        assert!(evaluate_move(0.0, 100.0, 0.05).is_none());
        assert!(evaluate_move(-5.0, 100.0, 0.05).is_none());
        assert!(evaluate_move(f64::NAN, 100.0, 0.05).is_none());
        assert!(evaluate_move(100.0, f64::INFINITY, 0.05).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_a_scenario() {
        let h = harness();
        let card = h.recorder.send_message(CHAT, "card", &[]).await.unwrap();
        h.store.start_tracking("TOKEN_A", 100_000.0, card).unwrap();

        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 104_000.0))));
        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 106_000.0))));

        let first = h.poller.run_cycle().await;
        assert_eq!(first, CycleReport { checked: 1, alerts: 0, unchanged: 1, skipped: 0 });
        assert_eq!(h.store.get("TOKEN_A").last_alerted_cap(), Some(100_000.0));
        assert_eq!(h.recorder.calls().len(), 1);

        let second = h.poller.run_cycle().await;
        assert_eq!(second.alerts, 1);
        assert_eq!(h.store.get("TOKEN_A").last_alerted_cap(), Some(106_000.0));
        assert_eq!(h.store.get("TOKEN_A").initial_market_cap(), Some(100_000.0));
        assert!(h.recorder.sent_texts().iter().any(|t| t.contains("market cap up +6.00%")));

        let pinned = h.store.pinned_ref("TOKEN_A").unwrap();
        assert_ne!(pinned, card);
        assert!(h.recorder.calls().contains(&ChatCall::Pin(pinned)));
        assert_eq!(h.recorder.pinned().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_small_moves_never_mutate_or_send() {
        let h = harness();
        let card = MessageRef::new(CHAT, 1);
        h.store.start_tracking("TOKEN_A", 100_000.0, card).unwrap();
        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 96_000.0))));

        for _ in 0..5 {
            h.poller.run_cycle().await;
        }
        assert_eq!(h.store.get("TOKEN_A").last_alerted_cap(), Some(100_000.0));
        assert_eq!(h.store.pinned_ref("TOKEN_A"), Some(card));
        assert!(h.recorder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_contract_does_not_block_others() {
        let h = harness();
        let card_b = MessageRef::new(CHAT, 1);
        let card_c = MessageRef::new(CHAT, 2);
        h.store.start_tracking("TOKEN_B", 100.0, card_b).unwrap();
        h.store.start_tracking("TOKEN_C", 100.0, card_c).unwrap();
        h.provider.push(
            "TOKEN_B",
            Err(ScanBotError::http_status("search", 500, None)),
        );
        h.provider.push("TOKEN_C", Ok(Some(snapshot("TOKEN_C", 150.0))));

        let report = h.poller.run_cycle().await;

        assert_eq!(report, CycleReport { checked: 2, alerts: 1, unchanged: 0, skipped: 1 });
        assert_eq!(h.store.get("TOKEN_B").last_alerted_cap(), Some(100.0));
        assert_eq!(h.store.pinned_ref("TOKEN_B"), Some(card_b));
        assert_eq!(h.store.get("TOKEN_C").last_alerted_cap(), Some(150.0));
        assert_eq!(alerts_sent(&h.recorder), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_data_is_skipped() {
        let h = harness();
        h.store
            .start_tracking("TOKEN_A", 100.0, MessageRef::new(CHAT, 1))
            .unwrap();
        let mut no_cap = snapshot("TOKEN_A", 0.0);
        no_cap.market_cap = None;
        h.provider.push("TOKEN_A", Ok(Some(no_cap)));

        let report = h.poller.run_cycle().await;
        assert_eq!(report.skipped, 1);
        assert!(h.recorder.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_baseline_is_skipped() {
        let h = harness();
        h.store
            .start_tracking("TOKEN_A", 0.0, MessageRef::new(CHAT, 1))
            .unwrap();
        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 500.0))));

        let report = h.poller.run_cycle().await;
        assert_eq!(report.skipped, 1);
        assert_eq!(h.store.get("TOKEN_A").last_alerted_cap(), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_during_alert_does_not_repeat_alert() {
        let h = harness();
        let card = h.recorder.send_message(CHAT, "card", &[]).await.unwrap();
        h.store.start_tracking("TOKEN_A", 100.0, card).unwrap();
        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 200.0))));

        let refresh = {
            let pins = h.pins.clone();
            tokio::spawn(async move {
                pins.replace_card(card, &snapshot("TOKEN_A", 190.0), CardCommit::Refresh)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(500)).await;

        let first = h.poller.run_cycle().await;
        let refreshed = refresh.await.unwrap().unwrap();
        assert_eq!(first.alerts, 1);
        assert_eq!(h.store.get("TOKEN_A").last_alerted_cap(), Some(200.0));

        let second = h.poller.run_cycle().await;
        assert_eq!(second, CycleReport { checked: 1, alerts: 0, unchanged: 1, skipped: 0 });
        assert_eq!(alerts_sent(&h.recorder), 1);
        assert_eq!(h.store.pinned_ref("TOKEN_A"), Some(refreshed));
        assert_eq!(h.recorder.pinned().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_waits_for_start_delay_and_stops() {
        let h = harness();
        h.store
            .start_tracking("TOKEN_A", 100.0, MessageRef::new(CHAT, 1))
            .unwrap();
        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 100.0))));
        let calls = h.provider.call_counter();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poller = Arc::new(h.poller);

        let task = tokio::spawn(poller.clone().run(shutdown_rx));
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);

        shutdown_tx.send_replace(true);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_cycle_stops_after_it() {
        let h = harness();
        let card = h.recorder.send_message(CHAT, "card", &[]).await.unwrap();
        h.store.start_tracking("TOKEN_A", 100.0, card).unwrap();
        h.provider.push("TOKEN_A", Ok(Some(snapshot("TOKEN_A", 200.0))));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(Arc::new(h.poller).run(shutdown_rx));
        // first tick at 10s, alert card parked in its 2s placeholder delay
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(!task.is_finished());
        shutdown_tx.send_replace(true);

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("poll loop should stop once the cycle ends")
            .unwrap();
        assert_eq!(h.store.get("TOKEN_A").last_alerted_cap(), Some(200.0));
    }
}
