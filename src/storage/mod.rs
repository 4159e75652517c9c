// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Durable local storage.

pub mod mirror;

pub use mirror::{AssetRecord, MirrorDb, MirrorError, MirrorResult};
