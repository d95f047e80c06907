//! Test doubles for the chat seam and the token provider

use crate::errors::ScanBotError;
use crate::telegram::chat::{ActionButton, ChatApi, MemberRole, MessageRef};
use crate::tokens::market_data::TokenProvider;
use crate::tokens::types::{SnapshotSource, TokenSnapshot};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

/// A minimal snapshot with a symbol derived from the address
pub fn snapshot(address: &str, market_cap: f64) -> TokenSnapshot {
    let mut snap = TokenSnapshot::new(address, SnapshotSource::DexScreener);
    snap.chain_id = "solana".to_string();
    snap.name = format!("{} Token", address);
    snap.symbol = address.trim_start_matches("TOKEN_").to_string();
    snap.price_usd = Some(0.001);
    snap.market_cap = Some(market_cap);
    snap.chart_url = Some(format!("https://dexscreener.com/solana/{}", address));
    snap
}

type ScriptedResult = Result<Option<TokenSnapshot>, ScanBotError>;

/// Replays queued results per address; the last queued result repeats
pub struct ScriptedProvider {
    scripts: Mutex<HashMap<String, VecDeque<ScriptedResult>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn push(&self, address: &str, result: ScriptedResult) {
        self.scripts
            .lock()
            .entry(address.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl TokenProvider for ScriptedProvider {
    async fn fetch(&self, address: &str) -> Result<Option<TokenSnapshot>, ScanBotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scripts = self.scripts.lock();
        let Some(queue) = scripts.get_mut(address) else {
            return Ok(None);
        };
        if queue.len() > 1 {
            return queue.pop_front().unwrap_or(Ok(None));
        }
        queue.front().cloned().unwrap_or(Ok(None))
    }
}

/// One recorded chat operation
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Send { message: MessageRef, text: String },
    Edit { message: MessageRef, text: String },
    Delete(MessageRef),
    Pin(MessageRef),
    Unpin(MessageRef),
    Answer { query_id: String, text: Option<String> },
    MemberRole { chat_id: i64, user_id: u64 },
}

/// Records every call and tracks which messages the platform shows as pinned
pub struct RecordingChat {
    calls: Mutex<Vec<ChatCall>>,
    buttons: Mutex<HashMap<MessageRef, Vec<Vec<ActionButton>>>>,
    pinned: Mutex<HashSet<MessageRef>>,
    roles: Mutex<HashMap<(i64, u64), MemberRole>>,
    next_id: AtomicI32,
    fail_pins: AtomicBool,
    fail_unpins: AtomicBool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            buttons: Mutex::new(HashMap::new()),
            pinned: Mutex::new(HashSet::new()),
            roles: Mutex::new(HashMap::new()),
            next_id: AtomicI32::new(100),
            fail_pins: AtomicBool::new(false),
            fail_unpins: AtomicBool::new(false),
        }
    }

    pub fn set_role(&self, chat_id: i64, user_id: u64, role: MemberRole) {
        self.roles.lock().insert((chat_id, user_id), role);
    }

    pub fn fail_pins(&self, fail: bool) {
        self.fail_pins.store(fail, Ordering::SeqCst);
    }

    pub fn fail_unpins(&self, fail: bool) {
        self.fail_unpins.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().clone()
    }

    /// Texts of every sent message, in order
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ChatCall::Send { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_sent(&self) -> Option<MessageRef> {
        self.calls.lock().iter().rev().find_map(|c| match c {
            ChatCall::Send { message, .. } => Some(*message),
            _ => None,
        })
    }

    /// Messages currently pinned according to the replayed calls
    pub fn pinned(&self) -> HashSet<MessageRef> {
        self.pinned.lock().clone()
    }

    /// Labels of the buttons last attached to `message`
    pub fn button_labels(&self, message: MessageRef) -> Vec<String> {
        self.buttons
            .lock()
            .get(&message)
            .map(|rows| {
                rows.iter()
                    .flatten()
                    .map(|b| b.label().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl ChatApi for RecordingChat {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> Result<MessageRef, ScanBotError> {
        let message = MessageRef::new(chat_id, self.next_id.fetch_add(1, Ordering::SeqCst));
        self.buttons.lock().insert(message, buttons.to_vec());
        self.record(ChatCall::Send {
            message,
            text: text.to_string(),
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        message: MessageRef,
        text: &str,
        buttons: &[Vec<ActionButton>],
    ) -> Result<(), ScanBotError> {
        self.buttons.lock().insert(message, buttons.to_vec());
        self.record(ChatCall::Edit {
            message,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), ScanBotError> {
        self.pinned.lock().remove(&message);
        self.record(ChatCall::Delete(message));
        Ok(())
    }

    async fn pin_message(&self, message: MessageRef) -> Result<(), ScanBotError> {
        self.record(ChatCall::Pin(message));
        if self.fail_pins.load(Ordering::SeqCst) {
            return Err(ScanBotError::chat("pinChatMessage", "not enough rights"));
        }
        self.pinned.lock().insert(message);
        Ok(())
    }

    async fn unpin_message(&self, message: MessageRef) -> Result<(), ScanBotError> {
        self.record(ChatCall::Unpin(message));
        if self.fail_unpins.load(Ordering::SeqCst) {
            return Err(ScanBotError::chat("unpinChatMessage", "not enough rights"));
        }
        self.pinned.lock().remove(&message);
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str, text: Option<&str>) -> Result<(), ScanBotError> {
        self.record(ChatCall::Answer {
            query_id: query_id.to_string(),
            text: text.map(str::to_string),
        });
        Ok(())
    }

    async fn member_role(&self, chat_id: i64, user_id: u64) -> Result<MemberRole, ScanBotError> {
        self.record(ChatCall::MemberRole { chat_id, user_id });
        Ok(self
            .roles
            .lock()
            .get(&(chat_id, user_id))
            .copied()
            .unwrap_or(MemberRole::Member))
    }
}
