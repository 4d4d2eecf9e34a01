//! Shared holder of the last-known-good table snapshot.

use super::models::TableSnapshot;
use crate::errors::SyncError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use tokio::sync::watch;

/// Everything consumers observe about the table
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Last accepted snapshot, `None` until the first one arrives
    pub snapshot: Option<Arc<TableSnapshot>>,

    /// Bumped on every accepted replacement; derived state keys off it
    pub version: u64,

    /// True until the first snapshot or failure is recorded
    pub is_loading: bool,

    /// Most recent fetch failure since the last accepted snapshot
    pub error: Option<SyncError>,
}

/// What happened to a candidate snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Accepted and broadcast
    Published,
    /// Nothing consumers care about changed
    Unchanged,
    /// The session already ended
    Discarded,
}

/// Injectable, cheaply cloneable handle to the table state with
/// publish/subscribe semantics.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: watch::Sender<StoreState>,
    closed: AtomicBool,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(StoreState {
            is_loading: true,
            ..StoreState::default()
        });

        Self {
            inner: Arc::new(StoreInner {
                state,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Current snapshot, or `None` if nothing has loaded yet
    pub fn read(&self) -> Option<Arc<TableSnapshot>> {
        self.inner.state.borrow().snapshot.clone()
    }

    /// Full observable state, including loading and error markers
    pub fn state(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.state.borrow().version
    }

    /// Subscribe to every change of [`StoreState`]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.inner.state.subscribe()
    }

    /// Publish `candidate` if it differs materially from the stored
    /// snapshot. An empty store always accepts.
    pub fn publish(&self, candidate: TableSnapshot) -> PublishOutcome {
        if self.is_closed() {
            return PublishOutcome::Discarded;
        }

        let mut outcome = PublishOutcome::Unchanged;
        self.inner.state.send_if_modified(|state| {
            let accept = state
                .snapshot
                .as_ref()
                .is_none_or(|current| current.differs_materially(&candidate));
            if accept {
                accept_into(state, candidate);
                outcome = PublishOutcome::Published;
            }
            accept
        });
        outcome
    }

    /// Overwrite the stored snapshot without change detection
    pub fn replace(&self, snapshot: TableSnapshot) -> PublishOutcome {
        if self.is_closed() {
            return PublishOutcome::Discarded;
        }

        self.inner
            .state
            .send_modify(|state| accept_into(state, snapshot));
        PublishOutcome::Published
    }

    /// Record a failed fetch next to the last-known-good snapshot
    pub fn record_error(&self, error: SyncError) {
        if self.is_closed() {
            return;
        }

        self.inner.state.send_modify(|state| {
            state.error = Some(error);
            state.is_loading = false;
        });
    }

    /// Mark the session as ended; later results are discarded
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

fn accept_into(state: &mut StoreState, snapshot: TableSnapshot) {
    state.snapshot = Some(Arc::new(snapshot));
    state.version += 1;
    state.is_loading = false;
    state.error = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(next_to_act: u8, dealer: u8) -> TableSnapshot {
        TableSnapshot::ingest(
            json!({
                "type": "cash",
                "round": "flop",
                "dealer": dealer,
                "nextToAct": next_to_act,
                "players": [{ "seat": 0, "address": "0xaa" }, { "seat": 1, "address": "0xbb" }]
            }),
            9,
        )
        .unwrap()
    }

    #[test]
    fn test_new_store_is_loading() {
        let store = SnapshotStore::new();
        let state = store.state();
        assert!(state.is_loading);
        assert!(state.snapshot.is_none());
        assert_eq!(state.version, 0);
    }

    #[test]
    fn test_first_publish_always_accepted() {
        let store = SnapshotStore::new();
        assert_eq!(store.publish(snapshot(0, 1)), PublishOutcome::Published);
        assert_eq!(store.version(), 1);
        assert!(!store.state().is_loading);
    }

    #[test]
    fn test_identical_publish_is_noop() {
        let store = SnapshotStore::new();
        let mut updates = store.subscribe();

        store.publish(snapshot(0, 1));
        assert!(updates.has_changed().unwrap());
        updates.borrow_and_update();

        assert_eq!(store.publish(snapshot(0, 1)), PublishOutcome::Unchanged);
        assert!(!updates.has_changed().unwrap());
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_dealer_only_change_is_not_published() {
        let store = SnapshotStore::new();
        store.publish(snapshot(0, 1));
        assert_eq!(store.publish(snapshot(0, 2)), PublishOutcome::Unchanged);
        assert_eq!(store.read().unwrap().dealer_seat, Some(1));
    }

    #[test]
    fn test_replace_bypasses_change_detection() {
        let store = SnapshotStore::new();
        store.publish(snapshot(0, 1));
        assert_eq!(store.replace(snapshot(0, 2)), PublishOutcome::Published);
        assert_eq!(store.version(), 2);
        assert_eq!(store.read().unwrap().dealer_seat, Some(2));
    }

    #[test]
    fn test_error_kept_beside_last_good_snapshot() {
        let store = SnapshotStore::new();
        store.publish(snapshot(0, 1));
        store.record_error(SyncError::Transport("timeout".to_string()));

        let state = store.state();
        assert!(state.snapshot.is_some());
        assert_eq!(
            state.error,
            Some(SyncError::Transport("timeout".to_string()))
        );
        assert_eq!(state.version, 1);

        store.publish(snapshot(1, 1));
        assert!(store.state().error.is_none());
    }

    #[test]
    fn test_closed_store_discards() {
        let store = SnapshotStore::new();
        store.close();
        assert_eq!(store.publish(snapshot(0, 1)), PublishOutcome::Discarded);
        assert_eq!(store.replace(snapshot(0, 1)), PublishOutcome::Discarded);
        assert!(store.read().is_none());
    }
}
