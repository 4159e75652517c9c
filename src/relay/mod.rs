// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay pipeline: request dispatch and custodial transaction sequencing.

pub mod dispatcher;
pub mod sequencer;

pub use dispatcher::{RelayDispatcher, RelayError};
pub use sequencer::{Confirmation, TxSequencer};
