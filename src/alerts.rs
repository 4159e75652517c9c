// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public BOLO alert feed.
//!
//! The feed is derived from the mirror on every read; nothing here is stored
//! independently, so a restart cannot desynchronize it from confirmed ledger
//! state. An asset leaves the feed in the same mirror write that confirms
//! its recovery.

use crate::models::{AlertView, AssetStatus};
use crate::storage::{AssetRecord, MirrorDb, MirrorResult};

/// Fallback display name when registration metadata never reached the mirror.
const FALLBACK_DEVICE_NAME: &str = "Protected Asset";

/// Compute the current alert feed, most recently updated first.
///
/// Only LOST and STOLEN assets appear.
pub fn current_alerts(mirror: &MirrorDb) -> MirrorResult<Vec<AlertView>> {
    let missing = mirror.list_by_status(&[AssetStatus::Lost, AssetStatus::Stolen])?;
    Ok(missing.iter().map(alert_view).collect())
}

fn alert_view(record: &AssetRecord) -> AlertView {
    let device = match (&record.make, &record.model) {
        (Some(make), Some(model)) => format!("{make} {model}"),
        _ => FALLBACK_DEVICE_NAME.to_string(),
    };

    AlertView {
        asset_id: record.token_id.to_string(),
        token: format!("#{}", record.token_id),
        display_label: format!("{}: {}", record.status, device),
        // The confirmation time locked in the mirror, never a live clock.
        status_updated_at: record.status_updated_at.format("%H:%M").to_string(),
        last_location: record
            .last_location
            .clone()
            .unwrap_or_else(|| "pending".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn open_mirror() -> (tempfile::TempDir, MirrorDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = MirrorDb::open(&dir.path().join("mirror.redb")).unwrap();
        (dir, db)
    }

    fn at(secs: i64) -> DateTime<Utc> {
        // 2023-11-14 22:13:20 UTC
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn feed_contains_only_lost_and_stolen_assets() {
        let (_dir, db) = open_mirror();
        db.upsert_registration(1, "SN-1", None, None).unwrap();
        db.apply_status(2, AssetStatus::Lost, at(0)).unwrap();
        db.apply_status(3, AssetStatus::Stolen, at(1)).unwrap();
        db.apply_status(4, AssetStatus::Stolen, at(2)).unwrap();
        db.apply_status(4, AssetStatus::Recovered, at(3)).unwrap();

        let feed = current_alerts(&db).unwrap();
        let ids: Vec<&str> = feed.iter().map(|a| a.asset_id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2"]);
    }

    #[test]
    fn labels_use_registration_metadata_with_fallback() {
        let (_dir, db) = open_mirror();
        db.upsert_registration(1, "SN-1", Some("Apple"), Some("iPhone 15"))
            .unwrap();
        db.apply_status(1, AssetStatus::Stolen, at(0)).unwrap();
        db.apply_status(2, AssetStatus::Lost, at(1)).unwrap();

        let feed = current_alerts(&db).unwrap();
        assert_eq!(feed[0].display_label, "LOST: Protected Asset");
        assert_eq!(feed[1].display_label, "STOLEN: Apple iPhone 15");
        assert_eq!(feed[1].token, "#1");
    }

    #[test]
    fn time_is_the_locked_confirmation_time() {
        let (_dir, db) = open_mirror();
        db.apply_status(1, AssetStatus::Stolen, at(0)).unwrap();

        let feed = current_alerts(&db).unwrap();
        assert_eq!(feed[0].status_updated_at, "22:13");
    }

    #[test]
    fn location_defaults_to_pending_until_a_ping_arrives() {
        let (_dir, db) = open_mirror();
        db.apply_status(7, AssetStatus::Stolen, at(0)).unwrap();

        let feed = current_alerts(&db).unwrap();
        assert_eq!(feed[0].last_location, "pending");

        db.set_location(7, "40.7128, -74.0060").unwrap();
        let feed = current_alerts(&db).unwrap();
        assert_eq!(feed[0].last_location, "40.7128, -74.0060");
    }
}
