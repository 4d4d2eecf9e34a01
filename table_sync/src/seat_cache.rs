//! Per-seat auxiliary data with stale-while-revalidate reads.

use crate::gateway::TableGateway;
use crate::snapshot::SnapshotStore;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::{
    sync::RwLock,
    time::{Duration, Instant},
};

/// Cached payload for one seat
#[derive(Debug, Clone, PartialEq)]
pub struct SeatCacheEntry {
    pub data: Value,
    pub last_fetched_at: Instant,
}

impl SeatCacheEntry {
    pub fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.last_fetched_at) <= ttl
    }
}

/// Lazily filled cache keyed by seat index.
///
/// Entries are only created for seats present in the current snapshot,
/// so the map is bounded by the table size.
pub struct SeatCache {
    table_id: String,
    gateway: Arc<dyn TableGateway>,
    store: SnapshotStore,
    ttl: Duration,
    entries: RwLock<HashMap<u8, SeatCacheEntry>>,
    in_flight: Mutex<HashSet<u8>>,
}

impl SeatCache {
    pub fn new(
        table_id: impl Into<String>,
        gateway: Arc<dyn TableGateway>,
        store: SnapshotStore,
        ttl: Duration,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            gateway,
            store,
            ttl,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Return whatever is cached for `seat` without waiting on the network.
    ///
    /// A missing or stale entry for an occupied seat schedules one
    /// background refresh while the session is open; the stale value (or
    /// `None`) is still returned.
    pub async fn get(self: &Arc<Self>, seat: u8) -> Option<Value> {
        let cached = self.entries.read().await.get(&seat).cloned();
        let stale = cached
            .as_ref()
            .is_none_or(|entry| !entry.is_fresh(self.ttl, Instant::now()));

        if stale && !self.store.is_closed() && self.seat_is_occupied(seat) {
            self.spawn_refresh(seat);
        }

        cached.map(|entry| entry.data)
    }

    /// Fetch `seat` and overwrite its entry.
    ///
    /// Returns the new data, or `None` if the seat is empty, the session
    /// ended, or the fetch failed. Failures keep the previous entry.
    pub async fn refresh(&self, seat: u8) -> Option<Value> {
        if self.store.is_closed() || !self.seat_is_occupied(seat) {
            return None;
        }

        let data = match self.gateway.fetch_seat_data(&self.table_id, seat).await {
            Ok(data) => data,
            Err(e) => {
                log::debug!(
                    "Table {}: error fetching data for seat {}: {}",
                    self.table_id,
                    seat,
                    e
                );
                return None;
            }
        };

        // The session may have ended while the fetch was out
        if self.store.is_closed() {
            return None;
        }

        self.entries.write().await.insert(
            seat,
            SeatCacheEntry {
                data: data.clone(),
                last_fetched_at: Instant::now(),
            },
        );
        Some(data)
    }

    /// Cached entry for `seat`, fresh or not
    pub async fn entry(&self, seat: u8) -> Option<SeatCacheEntry> {
        self.entries.read().await.get(&seat).cloned()
    }

    /// All cached payloads by seat
    pub async fn snapshot(&self) -> HashMap<u8, Value> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(seat, entry)| (*seat, entry.data.clone()))
            .collect()
    }

    fn seat_is_occupied(&self, seat: u8) -> bool {
        self.store
            .read()
            .is_some_and(|snapshot| snapshot.has_seat(seat))
    }

    fn spawn_refresh(self: &Arc<Self>, seat: u8) {
        let inserted = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(seat);
        if !inserted {
            return;
        }

        let cache = Arc::clone(self);
        tokio::spawn(async move {
            cache.refresh(seat).await;
            cache
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&seat);
        });
    }
}
