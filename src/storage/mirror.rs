// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded mirror of confirmed custody state, backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `assets`: token_id → serialized AssetRecord
//! - `alert_index`: composite key (status|!timestamp|token_id) → token_id
//!
//! The mirror holds the last **confirmed** ledger status per asset. It is
//! written only by the relay dispatcher (after confirmation) and by the
//! reconciler's repair path; it never originates state of its own.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::models::AssetStatus;

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: token_id → serialized AssetRecord (JSON bytes).
const ASSETS: TableDefinition<u64, &[u8]> = TableDefinition::new("assets");

/// Index: composite key → token_id.
/// Key format: `status_code | !timestamp_millis_be | token_id_be` for
/// newest-first range scans per status.
const ALERT_INDEX: TableDefinition<&[u8], u64> = TableDefinition::new("alert_index");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("illegal status transition {from} -> {to} for asset {token_id}")]
    IllegalTransition {
        token_id: u64,
        from: AssetStatus,
        to: AssetStatus,
    },
}

pub type MirrorResult<T> = Result<T, MirrorError>;

// =============================================================================
// Asset Record
// =============================================================================

/// Mirror copy of one asset's last confirmed state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssetRecord {
    /// Ledger-assigned token id. The mirror never mints ids of its own.
    pub token_id: u64,
    /// Serial number from registration. Absent for assets first seen through
    /// a confirmed status transition.
    pub serial_number: Option<String>,
    /// Manufacturer, from registration metadata.
    pub make: Option<String>,
    /// Model, from registration metadata.
    pub model: Option<String>,
    /// Last confirmed custody status.
    pub status: AssetStatus,
    /// Confirmation time of the last status transition. Locked when the
    /// transition confirms; never recomputed at read time.
    pub status_updated_at: DateTime<Utc>,
    /// Last reported location ping. Mirror-only, never written to the ledger.
    pub last_location: Option<String>,
    /// When the mirror first saw this asset.
    pub registered_at: DateTime<Utc>,
}

impl AssetRecord {
    /// Skeleton record for an asset first seen through a confirmed
    /// transition rather than the registration flow.
    fn skeleton(token_id: u64, status: AssetStatus, confirmed_at: DateTime<Utc>) -> Self {
        Self {
            token_id,
            serial_number: None,
            make: None,
            model: None,
            status,
            status_updated_at: confirmed_at,
            last_location: None,
            registered_at: confirmed_at,
        }
    }
}

// =============================================================================
// Index Key Helpers
// =============================================================================

/// Build a composite key for the alert_index table.
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn make_index_key(status: AssetStatus, updated_at: &DateTime<Utc>, token_id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 8 + 8);
    key.push(status.code());
    key.extend_from_slice(&(!(updated_at.timestamp_millis() as u64)).to_be_bytes());
    key.extend_from_slice(&token_id.to_be_bytes());
    key
}

/// Range bounds covering every index entry for one status.
fn status_range(status: AssetStatus) -> (Vec<u8>, Vec<u8>) {
    (vec![status.code()], vec![status.code() + 1])
}

// =============================================================================
// MirrorDb
// =============================================================================

/// Embedded ACID mirror database.
pub struct MirrorDb {
    db: Database,
}

impl MirrorDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> MirrorResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ASSETS)?;
            let _ = write_txn.open_table(ALERT_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Record (or refresh) registration metadata for an asset.
    ///
    /// Called by the minting flow after the ledger assigns the token id.
    /// Creates the record in SECURE status if the mirror has not seen the
    /// asset; otherwise only the metadata fields are touched.
    pub fn upsert_registration(
        &self,
        token_id: u64,
        serial_number: &str,
        make: Option<&str>,
        model: Option<&str>,
    ) -> MirrorResult<AssetRecord> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut assets = write_txn.open_table(ASSETS)?;
            let mut index = write_txn.open_table(ALERT_INDEX)?;

            let mut record = match read_record(&assets, token_id)? {
                Some(existing) => existing,
                None => {
                    let now = Utc::now();
                    let record = AssetRecord::skeleton(token_id, AssetStatus::Secure, now);
                    index.insert(
                        make_index_key(record.status, &record.status_updated_at, token_id)
                            .as_slice(),
                        token_id,
                    )?;
                    record
                }
            };

            record.serial_number = Some(serial_number.to_string());
            record.make = make.map(str::to_string);
            record.model = model.map(str::to_string);

            let json = serde_json::to_vec(&record)?;
            assets.insert(token_id, json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    /// Apply a confirmed status transition.
    ///
    /// Must be called only after the ledger reported the transaction mined
    /// and successful; `confirmed_at` is the timestamp captured at that
    /// moment and is stored as-is. Returns `Ok(true)` when the mirror
    /// changed, `Ok(false)` for idempotent re-application or a confirmation
    /// older than the one already recorded (interleaved writers converge to
    /// the later confirmation).
    pub fn apply_status(
        &self,
        token_id: u64,
        status: AssetStatus,
        confirmed_at: DateTime<Utc>,
    ) -> MirrorResult<bool> {
        self.write_status(token_id, status, confirmed_at, true)
    }

    /// Overwrite an asset's status from ledger truth, skipping the edge and
    /// staleness checks. Reconciler repair path only.
    pub fn force_status(
        &self,
        token_id: u64,
        status: AssetStatus,
        confirmed_at: DateTime<Utc>,
    ) -> MirrorResult<bool> {
        self.write_status(token_id, status, confirmed_at, false)
    }

    fn write_status(
        &self,
        token_id: u64,
        status: AssetStatus,
        confirmed_at: DateTime<Utc>,
        checked: bool,
    ) -> MirrorResult<bool> {
        let write_txn = self.db.begin_write()?;
        let applied = {
            let mut assets = write_txn.open_table(ASSETS)?;
            let mut index = write_txn.open_table(ALERT_INDEX)?;

            let mut record = match read_record(&assets, token_id)? {
                // An asset the mirror has never seen carries no history to
                // protect; accept whatever the ledger confirmed.
                None => AssetRecord::skeleton(token_id, status, confirmed_at),
                Some(existing) => {
                    if checked {
                        if existing.status == status {
                            return Ok(false);
                        }
                        if confirmed_at < existing.status_updated_at {
                            return Ok(false);
                        }
                        if !existing.status.may_transition_to(status) {
                            return Err(MirrorError::IllegalTransition {
                                token_id,
                                from: existing.status,
                                to: status,
                            });
                        }
                    }

                    index.remove(
                        make_index_key(existing.status, &existing.status_updated_at, token_id)
                            .as_slice(),
                    )?;

                    let mut record = existing;
                    record.status = status;
                    record.status_updated_at = confirmed_at;
                    record
                }
            };

            // Location pings are only meaningful while the asset is missing.
            if !status.is_alertable() {
                record.last_location = None;
            }

            index.insert(
                make_index_key(status, &confirmed_at, token_id).as_slice(),
                token_id,
            )?;
            let json = serde_json::to_vec(&record)?;
            assets.insert(token_id, json.as_slice())?;
            true
        };
        write_txn.commit()?;
        Ok(applied)
    }

    /// Attach a location ping to an asset. Returns `Ok(false)` when the
    /// mirror has no record for the id.
    pub fn set_location(&self, token_id: u64, location: &str) -> MirrorResult<bool> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut assets = write_txn.open_table(ASSETS)?;
            match read_record(&assets, token_id)? {
                None => false,
                Some(mut record) => {
                    record.last_location = Some(location.to_string());
                    let json = serde_json::to_vec(&record)?;
                    assets.insert(token_id, json.as_slice())?;
                    true
                }
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }

    /// Look up a single asset record.
    pub fn get(&self, token_id: u64) -> MirrorResult<Option<AssetRecord>> {
        let read_txn = self.db.begin_read()?;
        let assets = read_txn.open_table(ASSETS)?;
        read_record(&assets, token_id)
    }

    /// All assets whose status is in `statuses`, most recently updated first.
    pub fn list_by_status(&self, statuses: &[AssetStatus]) -> MirrorResult<Vec<AssetRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ALERT_INDEX)?;
        let assets = read_txn.open_table(ASSETS)?;

        // Each status range is already newest-first; merge across statuses
        // by confirmation time.
        let mut hits: Vec<AssetRecord> = Vec::new();
        for status in statuses {
            let (lower, upper) = status_range(*status);
            for entry in index.range(lower.as_slice()..upper.as_slice())? {
                let (_, token_id) = entry?;
                if let Some(record) = read_record(&assets, token_id.value())? {
                    // Guard against index entries whose record moved on.
                    if record.status == *status {
                        hits.push(record);
                    }
                }
            }
        }
        hits.sort_by(|a, b| {
            b.status_updated_at
                .cmp(&a.status_updated_at)
                .then(a.token_id.cmp(&b.token_id))
        });
        Ok(hits)
    }
}

fn read_record<T: ReadableTable<u64, &'static [u8]>>(
    assets: &T,
    token_id: u64,
) -> MirrorResult<Option<AssetRecord>> {
    match assets.get(token_id)? {
        Some(value) => {
            let record: AssetRecord = serde_json::from_slice(value.value())?;
            Ok(Some(record))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open_mirror() -> (tempfile::TempDir, MirrorDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = MirrorDb::open(&dir.path().join("mirror.redb")).unwrap();
        (dir, db)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn registration_creates_secure_record() {
        let (_dir, db) = open_mirror();
        let record = db
            .upsert_registration(7, "SN-12345", Some("Apple"), Some("iPhone 15"))
            .unwrap();

        assert_eq!(record.status, AssetStatus::Secure);
        assert_eq!(record.serial_number.as_deref(), Some("SN-12345"));

        let fetched = db.get(7).unwrap().unwrap();
        assert_eq!(fetched, record);
    }

    #[test]
    fn registration_preserves_status_of_known_asset() {
        let (_dir, db) = open_mirror();
        db.apply_status(3, AssetStatus::Stolen, at(10)).unwrap();

        let record = db.upsert_registration(3, "SN-3", None, None).unwrap();
        assert_eq!(record.status, AssetStatus::Stolen);
        assert_eq!(record.status_updated_at, at(10));
    }

    #[test]
    fn apply_status_creates_skeleton_for_unseen_asset() {
        let (_dir, db) = open_mirror();
        assert!(db.apply_status(9, AssetStatus::Lost, at(0)).unwrap());

        let record = db.get(9).unwrap().unwrap();
        assert_eq!(record.status, AssetStatus::Lost);
        assert_eq!(record.status_updated_at, at(0));
        assert_eq!(record.serial_number, None);
    }

    #[test]
    fn confirmation_timestamp_is_locked_not_recomputed() {
        let (_dir, db) = open_mirror();
        db.apply_status(1, AssetStatus::Stolen, at(42)).unwrap();

        // Reads long after the write still see the confirmation time.
        let record = db.get(1).unwrap().unwrap();
        assert_eq!(record.status_updated_at, at(42));
    }

    #[test]
    fn same_status_reapplication_is_a_noop() {
        let (_dir, db) = open_mirror();
        db.apply_status(1, AssetStatus::Stolen, at(10)).unwrap();
        assert!(!db.apply_status(1, AssetStatus::Stolen, at(50)).unwrap());

        let record = db.get(1).unwrap().unwrap();
        assert_eq!(record.status, AssetStatus::Stolen);
        // The original confirmation time stays locked.
        assert_eq!(record.status_updated_at, at(10));
    }

    #[test]
    fn stale_confirmation_does_not_overwrite_newer_state() {
        let (_dir, db) = open_mirror();
        db.apply_status(1, AssetStatus::Stolen, at(20)).unwrap();
        // A transition that confirmed earlier arrives late.
        assert!(!db.apply_status(1, AssetStatus::Lost, at(5)).unwrap());

        assert_eq!(db.get(1).unwrap().unwrap().status, AssetStatus::Stolen);
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let (_dir, db) = open_mirror();
        db.upsert_registration(1, "SN-1", None, None).unwrap();

        let err = db
            .apply_status(1, AssetStatus::Recovered, at(10))
            .unwrap_err();
        assert!(matches!(
            err,
            MirrorError::IllegalTransition {
                from: AssetStatus::Secure,
                to: AssetStatus::Recovered,
                ..
            }
        ));
        assert_eq!(db.get(1).unwrap().unwrap().status, AssetStatus::Secure);
    }

    #[test]
    fn force_status_bypasses_edge_check() {
        let (_dir, db) = open_mirror();
        db.upsert_registration(1, "SN-1", None, None).unwrap();

        assert!(db.force_status(1, AssetStatus::Recovered, at(10)).unwrap());
        assert_eq!(db.get(1).unwrap().unwrap().status, AssetStatus::Recovered);
    }

    #[test]
    fn recovery_clears_last_location() {
        let (_dir, db) = open_mirror();
        db.apply_status(7, AssetStatus::Stolen, at(0)).unwrap();
        assert!(db.set_location(7, "40.7128, -74.0060").unwrap());
        assert_eq!(
            db.get(7).unwrap().unwrap().last_location.as_deref(),
            Some("40.7128, -74.0060")
        );

        db.apply_status(7, AssetStatus::Recovered, at(10)).unwrap();
        let record = db.get(7).unwrap().unwrap();
        assert_eq!(record.status, AssetStatus::Recovered);
        assert_eq!(record.last_location, None);
    }

    #[test]
    fn set_location_for_unknown_asset_reports_false() {
        let (_dir, db) = open_mirror();
        assert!(!db.set_location(99, "0.0000, 0.0000").unwrap());
    }

    #[test]
    fn list_by_status_filters_and_orders_newest_first() {
        let (_dir, db) = open_mirror();
        db.apply_status(1, AssetStatus::Lost, at(10)).unwrap();
        db.apply_status(2, AssetStatus::Stolen, at(30)).unwrap();
        db.apply_status(3, AssetStatus::Stolen, at(20)).unwrap();
        db.apply_status(4, AssetStatus::Lost, at(40)).unwrap();
        db.upsert_registration(5, "SN-5", None, None).unwrap(); // secure, excluded

        let listed = db
            .list_by_status(&[AssetStatus::Lost, AssetStatus::Stolen])
            .unwrap();
        let ids: Vec<u64> = listed.iter().map(|r| r.token_id).collect();
        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn status_change_moves_asset_between_index_ranges() {
        let (_dir, db) = open_mirror();
        db.apply_status(1, AssetStatus::Stolen, at(0)).unwrap();
        db.apply_status(1, AssetStatus::Recovered, at(10)).unwrap();

        assert!(db
            .list_by_status(&[AssetStatus::Lost, AssetStatus::Stolen])
            .unwrap()
            .is_empty());
        assert_eq!(
            db.list_by_status(&[AssetStatus::Recovered]).unwrap().len(),
            1
        );
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.redb");
        {
            let db = MirrorDb::open(&path).unwrap();
            db.apply_status(11, AssetStatus::Lost, at(7)).unwrap();
        }
        let db = MirrorDb::open(&path).unwrap();
        let record = db.get(11).unwrap().unwrap();
        assert_eq!(record.status, AssetStatus::Lost);
        assert_eq!(record.status_updated_at, at(7));
    }
}
