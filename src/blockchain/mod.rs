// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger integration module for the AssetGuard contract.
//!
//! This module provides functionality for:
//! - Reading the custody record of an asset (`items` getter)
//! - Submitting signed custody transactions from the custodial key
//! - Awaiting confirmation with a bounded wait

use async_trait::async_trait;

pub mod client;
pub mod contract;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use client::{LedgerClient, LedgerError};
pub use types::*;

/// The seam between the relay core and the external ledger.
///
/// The sequencer, dispatcher, and reconciler only speak this trait; the
/// production implementation is [`LedgerClient`], the test suite substitutes
/// a scripted mock.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Fetch the custody record for an asset id, bypassing any local state.
    async fn read_asset(&self, token_id: u64) -> Result<StatusRecord, LedgerError>;

    /// The custodial signer's next available sequence number.
    async fn next_nonce(&self) -> Result<u64, LedgerError>;

    /// Broadcast a custody transaction with an explicit nonce.
    ///
    /// Fire-and-forget at the wire level; a returned handle means the
    /// transaction reached the network. A `Rejected` error here means it was
    /// refused before broadcast and the nonce was not consumed.
    async fn submit(
        &self,
        action: &LedgerAction,
        token_id: u64,
        nonce: u64,
    ) -> Result<PendingHandle, LedgerError>;

    /// Block until the transaction is mined or the wait bound is hit.
    async fn await_confirmation(&self, handle: &PendingHandle) -> Result<Receipt, LedgerError>;

    /// Cheap liveness probe of the RPC endpoint; returns the chain height.
    async fn probe(&self) -> Result<u64, LedgerError>;
}
