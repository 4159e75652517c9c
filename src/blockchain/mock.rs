// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Scripted in-memory ledger used across the relay test suite.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::client::LedgerError;
use super::types::{LedgerAction, PendingHandle, Receipt, StatusRecord};
use super::Ledger;
use crate::models::AssetStatus;

/// Scripted behavior for one submission, consumed in FIFO order.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Broadcast and mined successfully.
    Confirmed,
    /// Broadcast, then mined successfully after a delay.
    ConfirmedAfter(Duration),
    /// Broadcast, mined, but execution reverted (nonce consumed).
    RevertedOnChain,
    /// Refused before broadcast with this reason (nonce not consumed).
    RejectedAtSubmit(String),
    /// Transport failure at broadcast time.
    UnreachableAtSubmit,
    /// Broadcast succeeded but the receipt poll failed.
    UnreachableAtConfirm,
    /// Broadcast succeeded but the confirmation wait hit its bound.
    TimedOut,
}

/// One recorded `submit` call.
#[derive(Debug, Clone)]
pub struct Submission {
    pub action: LedgerAction,
    pub token_id: u64,
    pub nonce: u64,
}

/// Mock [`Ledger`] with per-submission scripted outcomes.
///
/// Unscripted submissions confirm immediately. The mock tracks nonce
/// queries, recorded submissions, and the maximum number of transactions
/// in flight at once, so tests can assert sequencer discipline.
pub struct MockLedger {
    base_nonce: u64,
    consumed: AtomicU64,
    nonce_fetches: AtomicUsize,
    outcomes: Mutex<VecDeque<MockOutcome>>,
    pending: Mutex<HashMap<String, MockOutcome>>,
    submissions: Mutex<Vec<Submission>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    seq: AtomicU64,
    assets: Mutex<HashMap<u64, StatusRecord>>,
}

impl MockLedger {
    pub fn new(base_nonce: u64) -> Self {
        Self {
            base_nonce,
            consumed: AtomicU64::new(0),
            nonce_fetches: AtomicUsize::new(0),
            outcomes: Mutex::new(VecDeque::new()),
            pending: Mutex::new(HashMap::new()),
            submissions: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            seq: AtomicU64::new(0),
            assets: Mutex::new(HashMap::new()),
        }
    }

    /// Queue the outcome for the next unscripted submission.
    pub fn script(&self, outcome: MockOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Seed the read path for one asset id.
    pub fn set_asset(&self, token_id: u64, record: StatusRecord) {
        self.assets.lock().unwrap().insert(token_id, record);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn nonce_fetches(&self) -> usize {
        self.nonce_fetches.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn enter_flight(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave_flight(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn read_asset(&self, token_id: u64) -> Result<StatusRecord, LedgerError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .get(&token_id)
            .cloned()
            .unwrap_or(StatusRecord {
                is_registered: false,
                status: AssetStatus::Secure,
                serial_number: None,
            }))
    }

    async fn next_nonce(&self) -> Result<u64, LedgerError> {
        self.nonce_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.base_nonce + self.consumed.load(Ordering::SeqCst))
    }

    async fn submit(
        &self,
        action: &LedgerAction,
        token_id: u64,
        nonce: u64,
    ) -> Result<PendingHandle, LedgerError> {
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockOutcome::Confirmed);

        match outcome {
            MockOutcome::RejectedAtSubmit(reason) => Err(LedgerError::Rejected(reason)),
            MockOutcome::UnreachableAtSubmit => {
                Err(LedgerError::Rpc("connection refused".to_string()))
            }
            other => {
                self.submissions.lock().unwrap().push(Submission {
                    action: action.clone(),
                    token_id,
                    nonce,
                });
                self.enter_flight();

                let tx_hash = format!("0xmock{:04}", self.seq.fetch_add(1, Ordering::SeqCst));
                self.pending.lock().unwrap().insert(tx_hash.clone(), other);
                Ok(PendingHandle { tx_hash })
            }
        }
    }

    async fn await_confirmation(&self, handle: &PendingHandle) -> Result<Receipt, LedgerError> {
        let outcome = self
            .pending
            .lock()
            .unwrap()
            .remove(&handle.tx_hash)
            .expect("await_confirmation for unknown handle");

        let result = match outcome {
            MockOutcome::Confirmed => {
                self.consumed.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            MockOutcome::ConfirmedAfter(delay) => {
                tokio::time::sleep(delay).await;
                self.consumed.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            MockOutcome::RevertedOnChain => {
                // Mined, so the nonce is consumed even though execution failed.
                self.consumed.fetch_add(1, Ordering::SeqCst);
                Ok(false)
            }
            MockOutcome::UnreachableAtConfirm => {
                Err(LedgerError::Rpc("receipt poll failed".to_string()))
            }
            MockOutcome::TimedOut => Err(LedgerError::Timeout(Duration::from_secs(1))),
            MockOutcome::RejectedAtSubmit(_) | MockOutcome::UnreachableAtSubmit => {
                unreachable!("submit-time outcomes never reach confirmation")
            }
        };

        self.leave_flight();

        result.map(|success| Receipt {
            tx_hash: handle.tx_hash.clone(),
            block_number: self.consumed.load(Ordering::SeqCst),
            success,
        })
    }

    async fn probe(&self) -> Result<u64, LedgerError> {
        Ok(self.consumed.load(Ordering::SeqCst))
    }
}
