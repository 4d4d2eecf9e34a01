//! Periodic table state fetch with debounce and change detection.

use crate::errors::SyncError;
use crate::gateway::TableGateway;
use crate::snapshot::{PublishOutcome, SnapshotStore, TableSnapshot};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::time::{Duration, Instant};

/// Result of one poll tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Skipped: a snapshot was published too recently
    Debounced,
    /// A new snapshot reached the store
    Published,
    /// Fetched, but nothing material changed
    Unchanged,
    /// Fetched after the session ended
    Discarded,
    /// Transport or shape failure; the store keeps its last good snapshot
    Failed(SyncError),
}

impl From<PublishOutcome> for PollOutcome {
    fn from(outcome: PublishOutcome) -> Self {
        match outcome {
            PublishOutcome::Published => Self::Published,
            PublishOutcome::Unchanged => Self::Unchanged,
            PublishOutcome::Discarded => Self::Discarded,
        }
    }
}

/// Fetches the table state and decides whether to publish it
pub struct Poller {
    table_id: String,
    gateway: Arc<dyn TableGateway>,
    store: SnapshotStore,
    table_size: u8,
    debounce: Duration,
    last_published: Mutex<Option<Instant>>,
}

impl Poller {
    pub fn new(
        table_id: impl Into<String>,
        gateway: Arc<dyn TableGateway>,
        store: SnapshotStore,
        table_size: u8,
        debounce: Duration,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            gateway,
            store,
            table_size,
            debounce,
            last_published: Mutex::new(None),
        }
    }

    /// When this poller last published, `None` before its first publish
    pub fn last_published(&self) -> Option<Instant> {
        *self
            .last_published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one tick: debounce, fetch, normalise, compare, publish.
    ///
    /// Until this poller has published once, every tick fetches and the
    /// first good snapshot is stored unconditionally.
    pub async fn poll_once(&self) -> PollOutcome {
        let now = Instant::now();
        let last_published = self.last_published();

        if let Some(last) = last_published
            && now.duration_since(last) < self.debounce
        {
            log::debug!(
                "Table {}: skipping poll, last update {:?} ago",
                self.table_id,
                now.duration_since(last)
            );
            return PollOutcome::Debounced;
        }

        let payload = match self.gateway.fetch_table_state(&self.table_id).await {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Table {}: error fetching table data: {}", self.table_id, e);
                self.store.record_error(e.clone());
                return PollOutcome::Failed(e);
            }
        };

        let candidate = match TableSnapshot::ingest(payload, self.table_size) {
            Ok(candidate) => candidate,
            Err(e) => {
                log::warn!(
                    "Table {}: unexpected API response structure: {}",
                    self.table_id,
                    e
                );
                return PollOutcome::Failed(e);
            }
        };

        let outcome = if last_published.is_none() {
            self.store.replace(candidate)
        } else {
            self.store.publish(candidate)
        };

        match outcome {
            PublishOutcome::Published => {
                *self
                    .last_published
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(now);
                log::info!(
                    "Table {}: published snapshot version {}",
                    self.table_id,
                    self.store.version()
                );
            }
            PublishOutcome::Unchanged => {
                log::debug!("Table {}: no changes, keeping current state", self.table_id);
            }
            PublishOutcome::Discarded => {
                log::debug!("Table {}: session ended, dropping poll result", self.table_id);
            }
        }

        outcome.into()
    }
}
