// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC ledger client for the AssetGuard contract.

use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::contract::IAssetGuard;
use super::types::{LedgerAction, PendingHandle, Receipt, StatusRecord};
use super::Ledger;
use crate::config::Config;
use crate::models::AssetStatus;

/// How often the confirmation wait polls for a receipt.
const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Read-only HTTP provider type (with all fillers).
type ReadProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Signing HTTP provider type (read fillers plus the custodial wallet).
type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Ledger client bound to one AssetGuard deployment and one custodial signer.
pub struct LedgerClient {
    /// Contract instance over the read-only provider.
    read: IAssetGuard::IAssetGuardInstance<ReadProvider>,
    /// Contract instance over the signing provider.
    write: IAssetGuard::IAssetGuardInstance<SignerProvider>,
    /// Address derived from the custodial key.
    signer_address: Address,
    /// Bounded wait for confirmation.
    confirmation_timeout: Duration,
}

impl LedgerClient {
    /// Connect to the configured RPC endpoint with the custodial key.
    pub fn connect(config: &Config) -> Result<Self, LedgerError> {
        let url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::InvalidRpcUrl(e.to_string()))?;

        let signer = Self::create_signer(&config.relayer_key)?;
        let signer_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let read_provider = ProviderBuilder::new().connect_http(url.clone());
        let write_provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            read: IAssetGuard::new(config.contract_address, read_provider),
            write: IAssetGuard::new(config.contract_address, write_provider),
            signer_address,
            confirmation_timeout: config.confirmation_timeout,
        })
    }

    /// Create a signer from a private key (hex string without 0x prefix).
    pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, LedgerError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim().trim_start_matches("0x"))
            .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))?;

        PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| LedgerError::InvalidPrivateKey(e.to_string()))
    }

    /// The custodial signer's address.
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }
}

#[async_trait]
impl Ledger for LedgerClient {
    async fn read_asset(&self, token_id: u64) -> Result<StatusRecord, LedgerError> {
        let item = self
            .read
            .items(U256::from(token_id))
            .call()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        let status = AssetStatus::from_code(item.status).ok_or_else(|| {
            LedgerError::Contract(format!("unknown status code {}", item.status))
        })?;

        Ok(StatusRecord {
            is_registered: item.isMinted,
            status,
            serial_number: if item.serialNumber.is_empty() {
                None
            } else {
                Some(item.serialNumber)
            },
        })
    }

    async fn next_nonce(&self) -> Result<u64, LedgerError> {
        self.write
            .provider()
            .get_transaction_count(self.signer_address)
            .pending()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn submit(
        &self,
        action: &LedgerAction,
        token_id: u64,
        nonce: u64,
    ) -> Result<PendingHandle, LedgerError> {
        let id = U256::from(token_id);

        // Gas estimation runs before broadcast, so business-rule reverts
        // ("Asset is STOLEN", "Not the owner") surface here without spending
        // relay cost or consuming the nonce.
        let pending = match action {
            LedgerAction::FlagLost => self.write.reportLost(id).nonce(nonce).send().await,
            LedgerAction::FlagStolen => self.write.reportStolen(id).nonce(nonce).send().await,
            LedgerAction::FlagRecovered => {
                self.write.reportRecovered(id).nonce(nonce).send().await
            }
            LedgerAction::Transfer(new_owner) => {
                self.write
                    .transferAsset(*new_owner, id)
                    .nonce(nonce)
                    .send()
                    .await
            }
        }
        .map_err(classify_submit_error)?;

        Ok(PendingHandle {
            tx_hash: format!("{:?}", pending.tx_hash()),
        })
    }

    async fn await_confirmation(&self, handle: &PendingHandle) -> Result<Receipt, LedgerError> {
        let hash: TxHash = handle
            .tx_hash
            .parse()
            .map_err(|_| LedgerError::Contract(format!("invalid tx hash {}", handle.tx_hash)))?;

        let deadline = tokio::time::Instant::now() + self.confirmation_timeout;
        loop {
            match self.write.provider().get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    return Ok(Receipt {
                        tx_hash: handle.tx_hash.clone(),
                        block_number: receipt.block_number.unwrap_or(0),
                        success: receipt.status(),
                    });
                }
                Ok(None) => {}
                Err(e) => return Err(LedgerError::Rpc(e.to_string())),
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(LedgerError::Timeout(self.confirmation_timeout));
            }
            tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
        }
    }

    async fn probe(&self) -> Result<u64, LedgerError> {
        self.read
            .provider()
            .get_block_number()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }
}

/// Classify a broadcast-time contract error.
///
/// Reverts detected during gas estimation carry the contract's reason string
/// and mean the transaction was never broadcast. Everything else is a
/// transport failure with unknown outcome.
fn classify_submit_error(e: alloy::contract::Error) -> LedgerError {
    let msg = e.to_string();
    match revert_reason(&msg) {
        Some(reason) => LedgerError::Rejected(reason),
        None => LedgerError::Rpc(msg),
    }
}

/// Extract the contract's revert reason from a node error string.
///
/// Node implementations phrase this differently; the two common shapes are
/// `execution reverted: <reason>` and `reverted with reason string '<reason>'`.
fn revert_reason(msg: &str) -> Option<String> {
    const MARKER: &str = "execution reverted: ";
    if let Some(idx) = msg.find(MARKER) {
        let rest = msg[idx + MARKER.len()..].trim();
        // Cut trailing diagnostics the node may append after the reason.
        let reason = rest.split('\n').next().unwrap_or(rest).trim_end_matches('"');
        if !reason.is_empty() {
            return Some(reason.to_string());
        }
    }

    const QUOTED: &str = "reverted with reason string '";
    if let Some(idx) = msg.find(QUOTED) {
        let rest = &msg[idx + QUOTED.len()..];
        if let Some(end) = rest.find('\'') {
            return Some(rest[..end].to_string());
        }
    }

    if msg.contains("execution reverted") {
        return Some("execution reverted".to_string());
    }

    None
}

/// Errors that can occur during ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Contract error: {0}")]
    Contract(String),

    /// Transport failure. The transaction's outcome, if one was in flight,
    /// is unknown.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The contract rejected the call; the reason string is surfaced to the
    /// caller verbatim.
    #[error("{0}")]
    Rejected(String),

    /// The confirmation wait hit its bound. Outcome unknown.
    #[error("confirmation timed out after {0:?}")]
    Timeout(Duration),
}

impl LedgerError {
    /// Whether the outcome of a submitted transaction is unknown to us.
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, LedgerError::Rpc(_) | LedgerError::Timeout(_))
    }
}
