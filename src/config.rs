// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URL` | JSON-RPC endpoint of the ledger node | `http://127.0.0.1:8545` |
//! | `CONTRACT_ADDRESS` | Deployed AssetGuard contract address | Required |
//! | `RELAYER_PRIVATE_KEY` | Custodial signing key (hex, no 0x prefix) | Required |
//! | `DATA_DIR` | Root directory for the mirror database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `CONFIRMATION_TIMEOUT_SECS` | Bounded wait for ledger confirmation | `120` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

/// Environment variable name for the ledger RPC endpoint.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Environment variable name for the AssetGuard contract address.
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";

/// Environment variable name for the custodial relayer key.
///
/// The key pays relay cost for every custody transaction. It must never be
/// used outside the transaction sequencer.
pub const RELAYER_PRIVATE_KEY_ENV: &str = "RELAYER_PRIVATE_KEY";

/// Environment variable name for the mirror data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the confirmation wait bound, in seconds.
pub const CONFIRMATION_TIMEOUT_ENV: &str = "CONFIRMATION_TIMEOUT_SECS";

/// Default confirmation wait bound.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ledger JSON-RPC endpoint.
    pub rpc_url: String,
    /// Deployed AssetGuard contract address.
    pub contract_address: Address,
    /// Custodial signing key, hex encoded.
    pub relayer_key: String,
    /// Directory holding the mirror database file.
    pub data_dir: PathBuf,
    /// Server bind address.
    pub host: String,
    /// Server bind port.
    pub port: u16,
    /// Bounded wait for ledger confirmation.
    pub confirmation_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url =
            env::var(RPC_URL_ENV).unwrap_or_else(|_| "http://127.0.0.1:8545".to_string());

        let contract_raw = env::var(CONTRACT_ADDRESS_ENV)
            .map_err(|_| ConfigError::Missing(CONTRACT_ADDRESS_ENV))?;
        let contract_address =
            Address::from_str(contract_raw.trim()).map_err(|e| ConfigError::Invalid {
                var: CONTRACT_ADDRESS_ENV,
                reason: e.to_string(),
            })?;

        let relayer_key = env::var(RELAYER_PRIVATE_KEY_ENV)
            .map_err(|_| ConfigError::Missing(RELAYER_PRIVATE_KEY_ENV))?;

        let data_dir = env::var(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: "must be a valid port number".to_string(),
            })?;

        let confirmation_timeout = match env::var(CONFIRMATION_TIMEOUT_ENV) {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: CONFIRMATION_TIMEOUT_ENV,
                    reason: "must be a number of seconds".to_string(),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
        };

        Ok(Self {
            rpc_url,
            contract_address,
            relayer_key,
            data_dir,
            host,
            port,
            confirmation_timeout,
        })
    }

    /// Path of the mirror database file inside the data directory.
    pub fn mirror_db_path(&self) -> PathBuf {
        self.data_dir.join("mirror.redb")
    }
}
