// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-facing relay pipeline.
//!
//! Each custody request moves through `PENDING → SUBMITTED → {CONFIRMED,
//! REJECTED}`. The dispatcher validates input, funnels the transaction
//! through the sequencer, and on confirmation propagates the transition into
//! the mirror with the timestamp captured at confirmation time. A rejection
//! surfaces the ledger's reason verbatim and never touches the mirror.
//!
//! Once enqueued, a transaction is a commitment: it cannot be cancelled and
//! its relay cost is paid whether execution succeeds or reverts.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::Address;

use crate::blockchain::{LedgerAction, LedgerError};
use crate::reconciler::StatusReconciler;
use crate::relay::sequencer::{Confirmation, TxSequencer};
use crate::storage::MirrorDb;

/// Errors surfaced to relay callers.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Input refused before any ledger interaction; no relay cost incurred.
    #[error("{0}")]
    Validation(String),

    /// The ledger rejected the transaction. The reason string comes from the
    /// contract and is passed through verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The transaction's outcome is unknown (network failure or confirmation
    /// timeout). The caller may retry; the mirror was not touched.
    #[error("transaction outcome indeterminate: {0}")]
    Indeterminate(#[source] LedgerError),

    #[error("relay failed: {0}")]
    Internal(String),
}

impl From<LedgerError> for RelayError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected(reason) => RelayError::Rejected(reason),
            err if err.is_indeterminate() => RelayError::Indeterminate(err),
            err => RelayError::Internal(err.to_string()),
        }
    }
}

/// The request-facing relay component.
pub struct RelayDispatcher {
    sequencer: TxSequencer,
    mirror: Arc<MirrorDb>,
    reconciler: Arc<StatusReconciler>,
}

impl RelayDispatcher {
    pub fn new(
        sequencer: TxSequencer,
        mirror: Arc<MirrorDb>,
        reconciler: Arc<StatusReconciler>,
    ) -> Self {
        Self {
            sequencer,
            mirror,
            reconciler,
        }
    }

    /// Flag an asset lost and mirror the confirmed transition.
    pub async fn report_lost(&self, token_id: u64) -> Result<Confirmation, RelayError> {
        self.dispatch(LedgerAction::FlagLost, token_id).await
    }

    /// Flag an asset stolen and mirror the confirmed transition.
    pub async fn report_stolen(&self, token_id: u64) -> Result<Confirmation, RelayError> {
        self.dispatch(LedgerAction::FlagStolen, token_id).await
    }

    /// Flag an asset recovered; the confirmed transition drops it from the
    /// alert feed and clears its last location in the same mirror write.
    pub async fn report_recovered(&self, token_id: u64) -> Result<Confirmation, RelayError> {
        self.dispatch(LedgerAction::FlagRecovered, token_id).await
    }

    /// Transfer custody to a new owner.
    ///
    /// The recipient string is validated as an EVM address before enqueueing
    /// so malformed input never costs relay gas. Whether the transfer is
    /// allowed (the contract blocks transfers of stolen assets) is the
    /// ledger's call; its rejection is surfaced, not second-guessed.
    pub async fn transfer_custody(
        &self,
        token_id: u64,
        new_owner: &str,
    ) -> Result<Confirmation, RelayError> {
        let recipient = Address::from_str(new_owner.trim()).map_err(|_| {
            RelayError::Validation("Invalid recipient address".to_string())
        })?;
        self.dispatch(LedgerAction::Transfer(recipient), token_id)
            .await
    }

    async fn dispatch(
        &self,
        action: LedgerAction,
        token_id: u64,
    ) -> Result<Confirmation, RelayError> {
        tracing::info!(token_id, action = %action, "relay request queued");

        let confirmation = match self.sequencer.enqueue(action.clone(), token_id).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                tracing::warn!(token_id, action = %action, error = %err, "relay request failed");
                return Err(err.into());
            }
        };

        tracing::info!(
            token_id,
            action = %action,
            tx_hash = %confirmation.tx_hash,
            block = confirmation.block_number,
            "relay transaction confirmed"
        );

        if let Some(status) = action.target_status() {
            if let Err(err) =
                self.mirror
                    .apply_status(token_id, status, confirmation.confirmed_at)
            {
                // The ledger has advanced but the mirror has not. Never
                // surfaced as a transaction failure; repaired from ledger
                // truth instead.
                tracing::error!(
                    token_id,
                    %status,
                    error = %err,
                    "mirror update failed after confirmed transaction, scheduling reconciliation"
                );
                self.schedule_repair(token_id);
            }
        }

        Ok(confirmation)
    }

    fn schedule_repair(&self, token_id: u64) {
        let reconciler = Arc::clone(&self.reconciler);
        tokio::spawn(async move {
            if let Err(err) = reconciler.repair(token_id).await {
                tracing::error!(token_id, error = %err, "mirror reconciliation failed");
            }
        });
    }
}
