// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AssetGuard Relay - Gasless Custody Relay Service
//!
//! This crate provides the backend for tamper-evident asset custody: it
//! relays status-change transactions to the AssetGuard contract from a
//! single custodial signing key and mirrors confirmed state locally for
//! reads and the public BOLO alert feed.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - AssetGuard contract integration (alloy)
//! - `relay` - Transaction sequencer and request dispatcher
//! - `storage` - Embedded mirror of confirmed custody state (redb)
//! - `reconciler` - Ledger-fresh reads and mirror repair
//! - `alerts` - Derived BOLO alert feed

pub mod alerts;
pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod relay;
pub mod state;
pub mod storage;
