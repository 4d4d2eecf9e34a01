//! Collaborator traits for the table server and the signing capability.
//!
//! Implementations live outside this crate (the HTTP client in
//! `table_sync_client`, mocks in tests), so every component takes them as
//! `Arc<dyn ...>`.

use crate::errors::SyncResult;
use crate::snapshot::{ActionKind, Address};
use async_trait::async_trait;
use serde_json::Value;

/// Read side of the table server
#[async_trait]
pub trait TableGateway: Send + Sync {
    /// Raw table state, either `{data: state}` or the flat state object
    async fn fetch_table_state(&self, table_id: &str) -> SyncResult<Value>;

    /// Auxiliary data for one seat
    async fn fetch_seat_data(&self, table_id: &str, seat: u8) -> SyncResult<Value>;

    /// Authoritative nonce for an identity
    async fn fetch_nonce(&self, address: &Address) -> SyncResult<u64>;

    /// Ask the server to deal; returns the resulting raw table state
    async fn request_deal(&self, table_id: &str) -> SyncResult<Value>;
}

/// Signs and submits a player action
#[async_trait]
pub trait ActionSubmitter: Send + Sync {
    /// `amount` is an empty string for actions without one
    async fn submit_action(
        &self,
        table_id: &str,
        action: &ActionKind,
        amount: &str,
        nonce: u64,
    ) -> SyncResult<()>;
}
