// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger-fresh status reads and mirror repair.
//!
//! The reconciler bypasses the mirror entirely: callers that need the
//! ledger's current truth (a scan of an asset whose mirror entry may be
//! stale or absent) come through here, as does the repair pass that runs
//! when a mirror write failed after a confirmed transaction.

use std::sync::Arc;

use chrono::Utc;

use crate::blockchain::{Ledger, LedgerError};
use crate::models::AssetStatus;
use crate::storage::{MirrorDb, MirrorError};

/// Outcome of a ledger-fresh status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedStatus {
    /// Whether the asset exists on the ledger. Never conflated with SECURE;
    /// an unregistered id reports the contract's zero-value status alongside
    /// `is_registered: false`.
    pub is_registered: bool,
    /// Current on-ledger custody status.
    pub status: AssetStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

/// Read-path component resolving custody status straight from the ledger.
pub struct StatusReconciler {
    ledger: Arc<dyn Ledger>,
    mirror: Arc<MirrorDb>,
}

impl StatusReconciler {
    pub fn new(ledger: Arc<dyn Ledger>, mirror: Arc<MirrorDb>) -> Self {
        Self { ledger, mirror }
    }

    /// Resolve an asset's status from the ledger, bypassing the mirror.
    ///
    /// A transport failure surfaces as `LedgerError::Rpc` ("could not reach
    /// ledger"), which callers must keep distinct from "not registered".
    pub async fn resolve(&self, token_id: u64) -> Result<ResolvedStatus, LedgerError> {
        let record = self.ledger.read_asset(token_id).await?;
        Ok(ResolvedStatus {
            is_registered: record.is_registered,
            status: record.status,
        })
    }

    /// Re-read the ledger and force the mirror to match it.
    ///
    /// Used after a consistency-critical mirror failure (the ledger advanced
    /// but the local write did not). Returns whether the mirror changed.
    pub async fn repair(&self, token_id: u64) -> Result<bool, ReconcileError> {
        let record = self.ledger.read_asset(token_id).await?;
        if !record.is_registered {
            // Nothing to mirror for an unregistered id.
            return Ok(false);
        }

        let changed = self
            .mirror
            .force_status(token_id, record.status, Utc::now())?;
        if changed {
            tracing::info!(token_id, status = %record.status, "mirror repaired from ledger state");
        }
        Ok(changed)
    }
}
