// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger-facing types shared by the client, sequencer, and dispatcher.

use alloy::primitives::Address;

use crate::models::AssetStatus;

/// A state-changing call against the AssetGuard contract.
///
/// One tagged type consumed uniformly by the relay pipeline, instead of a
/// near-duplicate code path per action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerAction {
    /// Flag the asset lost (`reportLost`).
    FlagLost,
    /// Flag the asset stolen (`reportStolen`).
    FlagStolen,
    /// Flag the asset recovered (`reportRecovered`).
    FlagRecovered,
    /// Transfer custody to a new owner (`transferAsset`).
    Transfer(Address),
}

impl LedgerAction {
    /// The mirror status a confirmed execution of this action implies.
    ///
    /// `Transfer` changes ownership on the ledger only; ownership is never
    /// duplicated into the mirror, so it implies no mirror status write.
    pub fn target_status(&self) -> Option<AssetStatus> {
        match self {
            LedgerAction::FlagLost => Some(AssetStatus::Lost),
            LedgerAction::FlagStolen => Some(AssetStatus::Stolen),
            LedgerAction::FlagRecovered => Some(AssetStatus::Recovered),
            LedgerAction::Transfer(_) => None,
        }
    }

    /// Contract method name, for logging.
    pub fn method_name(&self) -> &'static str {
        match self {
            LedgerAction::FlagLost => "reportLost",
            LedgerAction::FlagStolen => "reportStolen",
            LedgerAction::FlagRecovered => "reportRecovered",
            LedgerAction::Transfer(_) => "transferAsset",
        }
    }
}

impl std::fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.method_name())
    }
}

/// Result of the contract's read path for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    /// Whether the asset has been minted on the ledger. The `items` getter
    /// never reverts for unknown ids, so this flag is the only registered /
    /// unregistered distinction.
    pub is_registered: bool,
    /// Current on-ledger custody status.
    pub status: AssetStatus,
    /// Serial number recorded at mint time, when present.
    pub serial_number: Option<String>,
}

/// Handle for a transaction that has been broadcast but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingHandle {
    /// Transaction hash as reported by the node at broadcast time.
    pub tx_hash: String,
}

/// A mined transaction receipt, success or revert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Transaction hash.
    pub tx_hash: String,
    /// Block number where the transaction was included.
    pub block_number: u64,
    /// Whether execution succeeded. `false` means mined but reverted; relay
    /// cost was still spent.
    pub success: bool,
}
