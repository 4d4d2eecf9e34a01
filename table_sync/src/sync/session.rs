//! One observed table: wiring, timers and teardown.

use super::{Poller, Scheduler};
use crate::action::{ActionDispatcher, NonceManager};
use crate::config::SyncConfig;
use crate::derived::DerivedState;
use crate::errors::{SyncError, SyncResult};
use crate::gateway::{ActionSubmitter, TableGateway};
use crate::identity::LocalIdentity;
use crate::rules::TableRules;
use crate::seat_cache::SeatCache;
use crate::snapshot::{PublishOutcome, SnapshotStore, StoreState, TableSnapshot};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Live session for one table
pub struct TableSession {
    table_id: String,
    config: SyncConfig,
    identity: LocalIdentity,
    gateway: Arc<dyn TableGateway>,
    store: SnapshotStore,
    scheduler: Arc<Scheduler>,
    poller: Arc<Poller>,
    nonce: Arc<NonceManager>,
    seat_cache: Arc<SeatCache>,
    dispatcher: ActionDispatcher,
    derived: watch::Receiver<Arc<DerivedState>>,
}

impl TableSession {
    /// Wire up every component and start the timers.
    ///
    /// Must be called from within a Tokio runtime. The poller fires
    /// immediately and then every `poll_interval`; the nonce is refreshed
    /// immediately and then every `nonce_refresh_interval`, but only when
    /// the identity is known.
    pub fn start(
        table_id: impl Into<String>,
        config: SyncConfig,
        gateway: Arc<dyn TableGateway>,
        submitter: Arc<dyn ActionSubmitter>,
        identity: LocalIdentity,
        rules: Arc<dyn TableRules>,
    ) -> Self {
        let table_id = table_id.into();
        let store = SnapshotStore::new();
        let scheduler = Arc::new(Scheduler::new());

        let poller = Arc::new(Poller::new(
            table_id.clone(),
            Arc::clone(&gateway),
            store.clone(),
            config.table_size,
            config.publish_debounce,
        ));
        let nonce = Arc::new(NonceManager::new(Arc::clone(&gateway)));
        let seat_cache = Arc::new(SeatCache::new(
            table_id.clone(),
            Arc::clone(&gateway),
            store.clone(),
            config.seat_ttl,
        ));
        let dispatcher = ActionDispatcher::new(
            table_id.clone(),
            identity.address.clone(),
            submitter,
            Arc::clone(&nonce),
            Arc::clone(&scheduler),
            config.post_action_nonce_delay,
        );

        let (derived_tx, derived) = watch::channel(Arc::new(DerivedState::default()));

        log::info!("Table {}: session starting", table_id);

        scheduler.spawn(derive_on_change(
            store.subscribe(),
            derived_tx,
            identity.clone(),
            rules,
            config.default_table_type.clone(),
            Arc::clone(&seat_cache),
            Arc::clone(&scheduler),
        ));

        let tick_poller = Arc::clone(&poller);
        scheduler.every(config.poll_interval, move || {
            let poller = Arc::clone(&tick_poller);
            async move {
                poller.poll_once().await;
            }
        });

        if let Some(address) = identity.address.clone() {
            let tick_nonce = Arc::clone(&nonce);
            scheduler.every(config.nonce_refresh_interval, move || {
                let nonce = Arc::clone(&tick_nonce);
                let address = address.clone();
                async move {
                    let _ = nonce.refresh(&address).await;
                }
            });
        }

        Self {
            table_id,
            config,
            identity,
            gateway,
            store,
            scheduler,
            poller,
            nonce,
            seat_cache,
            dispatcher,
            derived,
        }
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn identity(&self) -> &LocalIdentity {
        &self.identity
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn poller(&self) -> &Arc<Poller> {
        &self.poller
    }

    pub fn nonce(&self) -> &Arc<NonceManager> {
        &self.nonce
    }

    pub fn seat_cache(&self) -> &Arc<SeatCache> {
        &self.seat_cache
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Receiver that changes whenever derived state is recomputed
    pub fn derived(&self) -> watch::Receiver<Arc<DerivedState>> {
        self.derived.clone()
    }

    /// Latest derived state
    pub fn current(&self) -> Arc<DerivedState> {
        self.derived.borrow().clone()
    }

    /// Cached data for `seat`, refreshed in the background when stale
    pub async fn get_user_by_seat(&self, seat: u8) -> Option<Value> {
        self.seat_cache.get(seat).await
    }

    /// Ask the server to deal and store the returned state as-is, skipping
    /// change detection.
    ///
    /// # Errors
    ///
    /// Transport or shape failures, and `SessionClosed` after teardown.
    /// State is left unchanged in every error case.
    pub async fn deal_table(&self) -> SyncResult<()> {
        log::info!("Table {}: dealing", self.table_id);

        let payload = self
            .gateway
            .request_deal(&self.table_id)
            .await
            .inspect_err(|e| log::error!("Table {}: error dealing cards: {}", self.table_id, e))?;

        let snapshot = TableSnapshot::ingest(payload, self.config.table_size).inspect_err(|e| {
            log::error!("Table {}: unexpected deal response: {}", self.table_id, e)
        })?;

        match self.store.replace(snapshot) {
            PublishOutcome::Discarded => Err(SyncError::SessionClosed),
            _ => Ok(()),
        }
    }

    /// Stop all timers and drop any result that arrives afterwards
    pub fn teardown(&self) {
        if self.scheduler.is_shut_down() {
            return;
        }
        log::info!("Table {}: session ending", self.table_id);
        self.store.close();
        self.scheduler.shutdown();
    }

    pub fn is_active(&self) -> bool {
        !self.scheduler.is_shut_down()
    }
}

impl Drop for TableSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Recompute derived state on every accepted snapshot. When the local
/// identity takes a new seat, that seat's data is fetched right away on a
/// separate task so a slow fetch never holds back the next snapshot.
async fn derive_on_change(
    mut updates: watch::Receiver<StoreState>,
    derived_tx: watch::Sender<Arc<DerivedState>>,
    identity: LocalIdentity,
    rules: Arc<dyn TableRules>,
    default_table_type: String,
    seat_cache: Arc<SeatCache>,
    scheduler: Arc<Scheduler>,
) {
    let mut seen_version = 0;
    let mut local_seat = None;

    loop {
        let state = updates.borrow_and_update().clone();

        if let Some(snapshot) = state.snapshot
            && state.version != seen_version
        {
            seen_version = state.version;

            let derived = DerivedState::compute(
                &snapshot,
                state.version,
                identity.address.as_ref(),
                rules.as_ref(),
                &default_table_type,
            );
            let seat = derived.local_seat;
            derived_tx.send_replace(Arc::new(derived));

            if seat != local_seat {
                local_seat = seat;
                if let Some(seat) = seat {
                    let cache = Arc::clone(&seat_cache);
                    scheduler.spawn(async move {
                        cache.refresh(seat).await;
                    });
                }
            }
        }

        if updates.changed().await.is_err() {
            break;
        }
    }
}
