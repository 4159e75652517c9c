// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::blockchain::Ledger;
use crate::reconciler::StatusReconciler;
use crate::relay::{RelayDispatcher, TxSequencer};
use crate::storage::MirrorDb;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub mirror: Arc<MirrorDb>,
    pub dispatcher: Arc<RelayDispatcher>,
    pub reconciler: Arc<StatusReconciler>,
}

impl AppState {
    /// Wire the relay pipeline around a ledger and a mirror database.
    ///
    /// Spawns the sequencer worker; it stops when `shutdown` fires.
    pub fn assemble(
        ledger: Arc<dyn Ledger>,
        mirror: Arc<MirrorDb>,
        shutdown: CancellationToken,
    ) -> Self {
        let sequencer = TxSequencer::spawn(Arc::clone(&ledger), shutdown);
        let reconciler = Arc::new(StatusReconciler::new(
            Arc::clone(&ledger),
            Arc::clone(&mirror),
        ));
        let dispatcher = Arc::new(RelayDispatcher::new(
            sequencer,
            Arc::clone(&mirror),
            Arc::clone(&reconciler),
        ));

        Self {
            ledger,
            mirror,
            dispatcher,
            reconciler,
        }
    }
}
