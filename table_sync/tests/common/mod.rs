//! Shared in-memory collaborators for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use table_sync::{
    ActionKind, Address, SyncError, SyncResult,
    gateway::{ActionSubmitter, TableGateway},
};

/// Gateway answering from canned responses and counting every call
pub struct MockGateway {
    table_state: Mutex<SyncResult<Value>>,
    seat_data: Mutex<HashMap<u8, SyncResult<Value>>>,
    nonce: Mutex<SyncResult<u64>>,
    deal_response: Mutex<SyncResult<Value>>,
    seat_delay: Mutex<Option<Duration>>,
    table_fetches: AtomicUsize,
    seat_fetches: AtomicUsize,
    nonce_fetches: AtomicUsize,
    deal_requests: AtomicUsize,
}

impl MockGateway {
    pub fn new(table_state: Value) -> Self {
        Self {
            table_state: Mutex::new(Ok(table_state)),
            seat_data: Mutex::new(HashMap::new()),
            nonce: Mutex::new(Err(SyncError::Transport("no nonce configured".to_string()))),
            deal_response: Mutex::new(Err(SyncError::Transport("no deal configured".to_string()))),
            seat_delay: Mutex::new(None),
            table_fetches: AtomicUsize::new(0),
            seat_fetches: AtomicUsize::new(0),
            nonce_fetches: AtomicUsize::new(0),
            deal_requests: AtomicUsize::new(0),
        }
    }

    pub fn set_table_state(&self, state: SyncResult<Value>) {
        *self.table_state.lock().unwrap() = state;
    }

    pub fn set_seat_data(&self, seat: u8, data: SyncResult<Value>) {
        self.seat_data.lock().unwrap().insert(seat, data);
    }

    pub fn set_nonce(&self, nonce: SyncResult<u64>) {
        *self.nonce.lock().unwrap() = nonce;
    }

    pub fn set_deal_response(&self, response: SyncResult<Value>) {
        *self.deal_response.lock().unwrap() = response;
    }

    /// Hold every seat fetch for `delay` before answering
    pub fn set_seat_delay(&self, delay: Duration) {
        *self.seat_delay.lock().unwrap() = Some(delay);
    }

    pub fn table_fetches(&self) -> usize {
        self.table_fetches.load(Ordering::SeqCst)
    }

    pub fn seat_fetches(&self) -> usize {
        self.seat_fetches.load(Ordering::SeqCst)
    }

    pub fn nonce_fetches(&self) -> usize {
        self.nonce_fetches.load(Ordering::SeqCst)
    }

    pub fn deal_requests(&self) -> usize {
        self.deal_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TableGateway for MockGateway {
    async fn fetch_table_state(&self, _table_id: &str) -> SyncResult<Value> {
        self.table_fetches.fetch_add(1, Ordering::SeqCst);
        self.table_state.lock().unwrap().clone()
    }

    async fn fetch_seat_data(&self, _table_id: &str, seat: u8) -> SyncResult<Value> {
        self.seat_fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.seat_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.seat_data
            .lock()
            .unwrap()
            .get(&seat)
            .cloned()
            .unwrap_or_else(|| Ok(json!({ "seat": seat })))
    }

    async fn fetch_nonce(&self, _address: &Address) -> SyncResult<u64> {
        self.nonce_fetches.fetch_add(1, Ordering::SeqCst);
        self.nonce.lock().unwrap().clone()
    }

    async fn request_deal(&self, _table_id: &str) -> SyncResult<Value> {
        self.deal_requests.fetch_add(1, Ordering::SeqCst);
        self.deal_response.lock().unwrap().clone()
    }
}

/// One recorded submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub table_id: String,
    pub action: ActionKind,
    pub amount: String,
    pub nonce: u64,
}

/// Submitter recording every call, optionally rejecting them
#[derive(Default)]
pub struct MockSubmitter {
    submissions: Mutex<Vec<Submission>>,
    reject_with: Mutex<Option<String>>,
}

impl MockSubmitter {
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn reject_with(&self, reason: &str) {
        *self.reject_with.lock().unwrap() = Some(reason.to_string());
    }
}

#[async_trait]
impl ActionSubmitter for MockSubmitter {
    async fn submit_action(
        &self,
        table_id: &str,
        action: &ActionKind,
        amount: &str,
        nonce: u64,
    ) -> SyncResult<()> {
        self.submissions.lock().unwrap().push(Submission {
            table_id: table_id.to_string(),
            action: action.clone(),
            amount: amount.to_string(),
            nonce,
        });

        match self.reject_with.lock().unwrap().clone() {
            Some(reason) => Err(SyncError::Submission(reason)),
            None => Ok(()),
        }
    }
}

/// Flat table state with two seated players, 0xAA on seat 0 and 0xBB on
/// seat 1
pub fn two_player_state(next_to_act: u8, round: &str) -> Value {
    json!({
        "address": "0xtable",
        "type": "cash",
        "round": round,
        "dealer": 1,
        "nextToAct": next_to_act,
        "players": [
            {
                "seat": 0,
                "address": "0xAA",
                "stack": "1000",
                "holeCards": [],
                "status": "active",
                "legalActions": [{ "action": "check" }, { "action": "bet", "min": "10" }]
            },
            {
                "seat": 1,
                "address": "0xBB",
                "stack": "1000",
                "holeCards": [],
                "status": "active",
                "legalActions": []
            }
        ],
        "board": [],
        "pots": ["30"]
    })
}

/// Let spawned tasks run without moving the paused clock
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
