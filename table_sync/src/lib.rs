//! # Table Sync
//!
//! Client-side synchronisation and action dispatch for a poker table whose
//! server is authoritative and only reachable by polling.
//!
//! The client never trusts local state: it keeps the last snapshot the
//! server sent, derives turn order, round, pot and legal actions from it,
//! and acts for one seat with nonce-sequenced submissions.
//!
//! ## Architecture
//!
//! - **Snapshot store**: last-known-good snapshot with publish/subscribe
//! - **Poller**: 5 s fetch loop with a 20 s publish debounce and
//!   field-level change detection
//! - **Derived state**: pure functions of the snapshot and local identity
//! - **Seat cache**: per-seat data served stale-while-revalidate (30 s TTL)
//! - **Nonce manager / action dispatcher**: sequence numbers and submissions
//! - **Table session**: owns the timers and tears them down together
//!
//! ## Core Modules
//!
//! - [`snapshot`]: canonical table model and the store
//! - [`sync`]: poller, scheduler and session
//! - [`action`]: nonce tracking and dispatch
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use table_sync::{LocalIdentity, StandardRules, SyncConfig, TableSession};
//! # use table_sync::gateway::{ActionSubmitter, TableGateway};
//! # async fn example(gateway: Arc<dyn TableGateway>, submitter: Arc<dyn ActionSubmitter>) {
//! let session = TableSession::start(
//!     "0xtable",
//!     SyncConfig::default(),
//!     gateway,
//!     submitter,
//!     LocalIdentity::from_address("0xAbC"),
//!     Arc::new(StandardRules::default()),
//! );
//!
//! let mut derived = session.derived();
//! derived.changed().await.unwrap();
//! if derived.borrow().is_player_turn {
//!     session.dispatcher().check().await.unwrap();
//! }
//! session.teardown();
//! # }
//! ```

/// Nonce tracking and nonce-tagged action dispatch.
pub mod action;

/// Timing and table configuration.
pub mod config;

/// Values derived from each accepted snapshot.
pub mod derived;

/// Error taxonomy.
pub mod errors;

/// Collaborator traits for the table server and signing capability.
pub mod gateway;

/// Local identity resolution.
pub mod identity;

/// Pure rule functions over a snapshot.
pub mod rules;

/// Per-seat auxiliary data cache.
pub mod seat_cache;

/// Canonical snapshot model and the shared store.
pub mod snapshot;

/// Poller, scheduler and table session.
pub mod sync;

pub use action::{ActionDispatcher, DispatchOutcome, NonceManager};
pub use config::{DEFAULT_TABLE_SIZE, DEFAULT_TABLE_TYPE, SyncConfig};
pub use derived::DerivedState;
pub use errors::{ConfigError, SyncError, SyncResult};
pub use identity::{KeyDeriver, LocalIdentity};
pub use rules::{NextToActInfo, StandardRules, TableRules};
pub use seat_cache::{SeatCache, SeatCacheEntry};
pub use snapshot::{
    ActionKind, Address, Amount, LegalAction, PlayerRecord, PlayerStatus, PublishOutcome,
    SnapshotStore, StoreState, TableSnapshot,
};
pub use sync::{PollOutcome, Poller, Scheduler, TableSession};
