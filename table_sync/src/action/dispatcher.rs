//! Nonce-tagged action submission.

use super::nonce::NonceManager;
use crate::errors::SyncResult;
use crate::gateway::ActionSubmitter;
use crate::snapshot::{ActionKind, Address, Amount};
use crate::sync::Scheduler;
use std::sync::Arc;
use tokio::time::Duration;

/// What a dispatch call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the submission capability with this nonce
    Submitted { nonce: u64 },
    /// Not sent: no nonce known yet, or an amount-requiring action
    /// arrived without an amount
    Skipped,
}

/// Submits actions for the local identity.
///
/// Submission is fire-and-forget beyond the capability's own result: the
/// follow-up nonce refresh is timed, not acknowledged, so callers should
/// wait for their turn to end before acting again.
pub struct ActionDispatcher {
    table_id: String,
    identity: Option<Address>,
    submitter: Arc<dyn ActionSubmitter>,
    nonce: Arc<NonceManager>,
    scheduler: Arc<Scheduler>,
    refresh_delay: Duration,
}

impl ActionDispatcher {
    pub fn new(
        table_id: impl Into<String>,
        identity: Option<Address>,
        submitter: Arc<dyn ActionSubmitter>,
        nonce: Arc<NonceManager>,
        scheduler: Arc<Scheduler>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            identity,
            submitter,
            nonce,
            scheduler,
            refresh_delay,
        }
    }

    /// Submit `action` with `amount` (empty when `None`) under
    /// `nonce_override` or the current nonce, then schedule a nonce refresh.
    /// With neither nonce available nothing is sent and the call reports
    /// `Skipped`.
    ///
    /// # Errors
    ///
    /// `Submission` when the capability rejects the action. Rejections are
    /// not retried.
    pub async fn dispatch(
        &self,
        action: ActionKind,
        amount: Option<String>,
        nonce_override: Option<u64>,
    ) -> SyncResult<DispatchOutcome> {
        let Some(nonce) = nonce_override.or_else(|| self.nonce.current()) else {
            log::debug!(
                "Table {}: {} ignored, nonce not known yet",
                self.table_id,
                action
            );
            return Ok(DispatchOutcome::Skipped);
        };
        let amount = amount.unwrap_or_default();

        log::info!(
            "Table {}: performing {} (amount '{}') with nonce {}",
            self.table_id,
            action,
            amount,
            nonce
        );

        let result = self
            .submitter
            .submit_action(&self.table_id, &action, &amount, nonce)
            .await;
        self.schedule_nonce_refresh();

        match result {
            Ok(()) => Ok(DispatchOutcome::Submitted { nonce }),
            Err(e) => {
                log::error!("Table {}: {} rejected: {}", self.table_id, action, e);
                Err(e)
            }
        }
    }

    pub async fn fold(&self) -> SyncResult<DispatchOutcome> {
        self.submit(ActionKind::Fold, None).await
    }

    pub async fn check(&self) -> SyncResult<DispatchOutcome> {
        self.submit(ActionKind::Check, None).await
    }

    pub async fn call(&self) -> SyncResult<DispatchOutcome> {
        self.submit(ActionKind::Call, None).await
    }

    pub async fn raise(&self, amount: Amount) -> SyncResult<DispatchOutcome> {
        self.submit(ActionKind::Raise, Some(amount)).await
    }

    pub async fn bet(&self, amount: Amount) -> SyncResult<DispatchOutcome> {
        self.submit(ActionKind::Bet, Some(amount)).await
    }

    /// Route `action` to its wrapper. Bets and raises without an amount,
    /// and actions without a wrapper, are ignored.
    pub async fn set_player_action(
        &self,
        action: ActionKind,
        amount: Option<Amount>,
    ) -> SyncResult<DispatchOutcome> {
        match (action, amount) {
            (ActionKind::Fold, _) => self.fold().await,
            (ActionKind::Check, _) => self.check().await,
            (ActionKind::Call, _) => self.call().await,
            (ActionKind::Raise, Some(amount)) => self.raise(amount).await,
            (ActionKind::Bet, Some(amount)) => self.bet(amount).await,
            (action, _) => {
                log::debug!("Table {}: ignoring {} without a route", self.table_id, action);
                Ok(DispatchOutcome::Skipped)
            }
        }
    }

    /// Dispatch under the current nonce
    async fn submit(
        &self,
        action: ActionKind,
        amount: Option<Amount>,
    ) -> SyncResult<DispatchOutcome> {
        self.dispatch(action, amount.map(|a| a.to_string()), None)
            .await
    }

    fn schedule_nonce_refresh(&self) {
        let Some(address) = self.identity.clone() else {
            return;
        };

        let nonce = Arc::clone(&self.nonce);
        self.scheduler.after(self.refresh_delay, async move {
            // Errors are already logged by the manager
            let _ = nonce.refresh(&address).await;
        });
    }
}
