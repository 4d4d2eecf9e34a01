//! Table snapshots: the canonical model and the shared store.
//!
//! This module implements:
//! - `TableSnapshot`: one authoritative view of the table, normalised at
//!   ingestion (nested or flat payloads, dealer sentinel, board aliases)
//! - `SnapshotStore`: the injectable publish/subscribe holder every consumer
//!   reads from
//!
//! ## Example
//!
//! ```
//! use table_sync::snapshot::{PublishOutcome, SnapshotStore, TableSnapshot};
//! use serde_json::json;
//!
//! let store = SnapshotStore::new();
//! let snapshot = TableSnapshot::ingest(json!({ "data": { "type": "cash", "dealer": 9 } }), 9)
//!     .unwrap();
//! assert_eq!(snapshot.dealer_seat, Some(0));
//! assert_eq!(store.publish(snapshot), PublishOutcome::Published);
//! ```

pub mod models;
pub mod store;

pub use models::{
    ActionKind, Address, Amount, LegalAction, PlayerRecord, PlayerStatus, TableSnapshot,
};
pub use store::{PublishOutcome, SnapshotStore, StoreState};
