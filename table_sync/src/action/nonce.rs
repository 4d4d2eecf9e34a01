//! Sequence number of the acting identity.

use crate::errors::SyncResult;
use crate::gateway::TableGateway;
use crate::snapshot::Address;
use std::sync::{Arc, Mutex, PoisonError};

/// Holds the last nonce fetched from the server
pub struct NonceManager {
    gateway: Arc<dyn TableGateway>,
    value: Mutex<Option<u64>>,
}

impl NonceManager {
    pub fn new(gateway: Arc<dyn TableGateway>) -> Self {
        Self {
            gateway,
            value: Mutex::new(None),
        }
    }

    /// Last fetched nonce, `None` before the first successful refresh
    pub fn current(&self) -> Option<u64> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the authoritative nonce and overwrite the local value
    pub async fn refresh(&self, address: &Address) -> SyncResult<u64> {
        let nonce = self.gateway.fetch_nonce(address).await.inspect_err(|e| {
            log::error!("Error fetching nonce for {}: {}", address, e);
        })?;

        let previous = self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(nonce);

        match previous {
            Some(previous) if nonce < previous => {
                log::warn!(
                    "Nonce for {} went backwards: {} -> {}",
                    address,
                    previous,
                    nonce
                );
            }
            Some(previous) if nonce == previous => {
                log::debug!("Nonce for {} unchanged at {}", address, nonce);
            }
            _ => {
                log::info!("Nonce updated for {}: {:?} -> {}", address, previous, nonce);
            }
        }

        Ok(nonce)
    }
}
