// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the custody status enumeration and the request and
//! response data structures used by the REST API. All wire types derive
//! `Serialize`, `Deserialize`, and `ToSchema` for automatic JSON handling
//! and OpenAPI documentation.
//!
//! ## Wire Conventions
//!
//! Every response body carries a `success` flag. Field names are camelCase
//! on the wire (`tokenId`, `txHash`, `isRegistered`), matching the mobile
//! client contract.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Custody Status
// =============================================================================

/// Custody status of a registered asset.
///
/// The canonical value lives on the AssetGuard contract; the mirror store
/// holds the last confirmed copy. The numeric codes match the contract's
/// enum ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetStatus {
    /// Asset is in normal custody.
    Secure,
    /// Asset reported lost by its owner.
    Lost,
    /// Asset reported stolen by its owner.
    Stolen,
    /// Asset recovered after a lost/stolen report; no longer alertable.
    Recovered,
}

impl AssetStatus {
    /// Decode the contract's numeric status code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(AssetStatus::Secure),
            1 => Some(AssetStatus::Lost),
            2 => Some(AssetStatus::Stolen),
            3 => Some(AssetStatus::Recovered),
            _ => None,
        }
    }

    /// The contract's numeric code for this status.
    pub fn code(self) -> u8 {
        match self {
            AssetStatus::Secure => 0,
            AssetStatus::Lost => 1,
            AssetStatus::Stolen => 2,
            AssetStatus::Recovered => 3,
        }
    }

    /// Whether assets in this status appear in the public alert feed.
    pub fn is_alertable(self) -> bool {
        matches!(self, AssetStatus::Lost | AssetStatus::Stolen)
    }

    /// Whether a confirmed transition from `self` to `next` is legal.
    ///
    /// Edge set: `SECURE→{LOST,STOLEN}`, `LOST↔STOLEN`,
    /// `{LOST,STOLEN}→RECOVERED`, `RECOVERED→{LOST,STOLEN}`. Re-applying the
    /// current status is a legal no-op.
    pub fn may_transition_to(self, next: AssetStatus) -> bool {
        use AssetStatus::*;
        if self == next {
            return true;
        }
        match (self, next) {
            (Secure, Lost) | (Secure, Stolen) => true,
            (Lost, Stolen) | (Stolen, Lost) => true,
            (Lost, Recovered) | (Stolen, Recovered) => true,
            // Recovered assets are back in active use and can be re-flagged.
            (Recovered, Lost) | (Recovered, Stolen) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssetStatus::Secure => "SECURE",
            AssetStatus::Lost => "LOST",
            AssetStatus::Stolen => "STOLEN",
            AssetStatus::Recovered => "RECOVERED",
        };
        write!(f, "{label}")
    }
}

// =============================================================================
// Relay Request Models
// =============================================================================

/// Request body for `/report-lost` and `/report-stolen`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Ledger-assigned asset token id.
    pub token_id: Option<i64>,
}

/// Request body for `/transfer`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Ledger-assigned asset token id.
    pub token_id: Option<i64>,
    /// Recipient identity (0x + 40 hex chars).
    pub new_owner: Option<String>,
}

/// Request body for `/ping-location`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PingLocationRequest {
    /// Ledger-assigned asset token id.
    pub token_id: Option<i64>,
    /// Latitude of the sighting.
    pub lat: f64,
    /// Longitude of the sighting.
    pub lon: f64,
}

// =============================================================================
// Response Models
// =============================================================================

/// Response for confirmed relay transactions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub success: bool,
    /// Hash of the confirmed ledger transaction.
    pub tx_hash: String,
}

/// Response for the ledger-fresh status check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    /// Whether the asset exists on the ledger at all. Distinguishes an
    /// unregistered id from a registered SECURE asset.
    pub is_registered: bool,
    /// Current on-ledger custody status.
    pub status: AssetStatus,
}

/// Response for the public alert feed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    pub success: bool,
    pub alerts: Vec<AlertView>,
}

/// Empty acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
}

/// A single derived BOLO alert entry.
///
/// Alert views are computed from the mirror store on every read; they are
/// never stored independently, so a restart cannot desynchronize the feed
/// from confirmed ledger state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    /// Ledger-assigned asset id, stringified for display.
    pub asset_id: String,
    /// Short token tag, e.g. `#7`.
    pub token: String,
    /// Display label, e.g. `STOLEN: Apple iPhone 15`.
    pub display_label: String,
    /// Confirmation time of the alertable status, formatted `HH:MM`.
    /// Locked at confirmation, never recomputed from a live clock.
    pub status_updated_at: String,
    /// Last reported location, or `pending` when no ping has arrived.
    pub last_location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip_contract_enum_order() {
        assert_eq!(AssetStatus::from_code(0), Some(AssetStatus::Secure));
        assert_eq!(AssetStatus::from_code(1), Some(AssetStatus::Lost));
        assert_eq!(AssetStatus::from_code(2), Some(AssetStatus::Stolen));
        assert_eq!(AssetStatus::from_code(3), Some(AssetStatus::Recovered));
        assert_eq!(AssetStatus::from_code(4), None);

        for status in [
            AssetStatus::Secure,
            AssetStatus::Lost,
            AssetStatus::Stolen,
            AssetStatus::Recovered,
        ] {
            assert_eq!(AssetStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&AssetStatus::Stolen).unwrap(),
            r#""STOLEN""#
        );
        assert_eq!(
            serde_json::from_str::<AssetStatus>(r#""RECOVERED""#).unwrap(),
            AssetStatus::Recovered
        );
    }

    #[test]
    fn transition_edges() {
        use AssetStatus::*;

        assert!(Secure.may_transition_to(Lost));
        assert!(Secure.may_transition_to(Stolen));
        assert!(Lost.may_transition_to(Stolen));
        assert!(Stolen.may_transition_to(Lost));
        assert!(Lost.may_transition_to(Recovered));
        assert!(Stolen.may_transition_to(Recovered));
        assert!(Recovered.may_transition_to(Stolen));

        // Re-applying the current status is idempotent, not illegal.
        assert!(Stolen.may_transition_to(Stolen));

        // A secure asset cannot jump straight to recovered, and nothing
        // transitions back to SECURE through the relay.
        assert!(!Secure.may_transition_to(Recovered));
        assert!(!Lost.may_transition_to(Secure));
        assert!(!Recovered.may_transition_to(Secure));
    }

    #[test]
    fn alertable_statuses() {
        assert!(AssetStatus::Lost.is_alertable());
        assert!(AssetStatus::Stolen.is_alertable());
        assert!(!AssetStatus::Secure.is_alertable());
        assert!(!AssetStatus::Recovered.is_alertable());
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let body = serde_json::to_value(TxResponse {
            success: true,
            tx_hash: "0xabc".into(),
        })
        .unwrap();
        assert!(body.get("txHash").is_some());

        let status = serde_json::to_value(StatusResponse {
            success: true,
            is_registered: false,
            status: AssetStatus::Secure,
        })
        .unwrap();
        assert!(status.get("isRegistered").is_some());

        let req: ReportRequest = serde_json::from_str(r#"{"tokenId": 7}"#).unwrap();
        assert_eq!(req.token_id, Some(7));
    }
}
