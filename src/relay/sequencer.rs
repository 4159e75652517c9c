// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction sequencer for the custodial signing key.
//!
//! All transactions from one signing key must be strictly ordered or the
//! network drops or mis-sequences them. A single worker task owns the key's
//! sequence number and drains one job at a time to completion (confirm or
//! reject) before starting the next, so at most one transaction is ever in
//! flight.
//!
//! ## Nonce Discipline
//!
//! The next sequence number is fetched from the node once, lazily, then
//! incremented locally (re-querying between a query and a submit races).
//! A rejection before broadcast leaves the nonce free; a mined transaction
//! consumes it even when execution reverted; an indeterminate outcome
//! (timeout, transport failure) discards the cached value so it is
//! re-fetched before the next job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::blockchain::{Ledger, LedgerAction, LedgerError};

/// Queue depth before `enqueue` applies backpressure.
const QUEUE_DEPTH: usize = 64;

/// A confirmed, successfully executed relay transaction.
#[derive(Debug, Clone)]
pub struct Confirmation {
    /// Hash of the mined transaction.
    pub tx_hash: String,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// When the ledger reported the transaction mined. Captured once, here;
    /// this is the timestamp the mirror stores.
    pub confirmed_at: DateTime<Utc>,
}

struct RelayJob {
    action: LedgerAction,
    token_id: u64,
    reply: oneshot::Sender<Result<Confirmation, LedgerError>>,
}

/// Handle to the single sequencer worker.
#[derive(Clone)]
pub struct TxSequencer {
    queue: mpsc::Sender<RelayJob>,
}

impl TxSequencer {
    /// Spawn the worker task. The worker runs until the cancellation token
    /// fires or every handle is dropped.
    pub fn spawn(ledger: Arc<dyn Ledger>, shutdown: CancellationToken) -> Self {
        let (queue, rx) = mpsc::channel(QUEUE_DEPTH);
        tokio::spawn(worker(ledger, rx, shutdown));
        Self { queue }
    }

    /// Queue one custody transaction and wait for its outcome.
    ///
    /// Jobs complete strictly in enqueue order. A rejected job resolves its
    /// own future with the error and never blocks the jobs behind it.
    pub async fn enqueue(
        &self,
        action: LedgerAction,
        token_id: u64,
    ) -> Result<Confirmation, LedgerError> {
        let (reply, outcome) = oneshot::channel();
        self.queue
            .send(RelayJob {
                action,
                token_id,
                reply,
            })
            .await
            .map_err(|_| LedgerError::Rpc("transaction sequencer is not running".to_string()))?;

        outcome
            .await
            .map_err(|_| LedgerError::Rpc("transaction sequencer dropped the request".to_string()))?
    }
}

async fn worker(
    ledger: Arc<dyn Ledger>,
    mut rx: mpsc::Receiver<RelayJob>,
    shutdown: CancellationToken,
) {
    let mut cached_nonce: Option<u64> = None;

    loop {
        let job = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("transaction sequencer shutting down");
                return;
            }
            job = rx.recv() => match job {
                Some(job) => job,
                None => return,
            },
        };

        let outcome = run_job(ledger.as_ref(), &mut cached_nonce, &job.action, job.token_id).await;
        // The requester may have gone away; the transaction itself is already
        // settled either way.
        let _ = job.reply.send(outcome);
    }
}

/// Drive one job through submit and confirmation, maintaining the nonce.
async fn run_job(
    ledger: &dyn Ledger,
    cached_nonce: &mut Option<u64>,
    action: &LedgerAction,
    token_id: u64,
) -> Result<Confirmation, LedgerError> {
    let nonce = match *cached_nonce {
        Some(nonce) => nonce,
        None => {
            let nonce = ledger.next_nonce().await?;
            *cached_nonce = Some(nonce);
            nonce
        }
    };

    let handle = match ledger.submit(action, token_id, nonce).await {
        Ok(handle) => handle,
        Err(err @ LedgerError::Rejected(_)) => {
            // Refused before broadcast; the nonce is still free.
            return Err(err);
        }
        Err(err) => {
            // Broadcast outcome unknown; the nonce may or may not be
            // consumed. Discard the cache and re-query before the next job.
            *cached_nonce = None;
            return Err(err);
        }
    };

    tracing::debug!(
        token_id,
        action = %action,
        tx_hash = %handle.tx_hash,
        nonce,
        "transaction submitted"
    );

    match ledger.await_confirmation(&handle).await {
        Ok(receipt) => {
            // Mined, so the nonce is consumed whether execution succeeded
            // or reverted.
            *cached_nonce = Some(nonce + 1);
            if receipt.success {
                Ok(Confirmation {
                    tx_hash: receipt.tx_hash,
                    block_number: receipt.block_number,
                    confirmed_at: Utc::now(),
                })
            } else {
                Err(LedgerError::Rejected(
                    "execution reverted on-chain".to_string(),
                ))
            }
        }
        Err(err) => {
            *cached_nonce = None;
            Err(err)
        }
    }
}
