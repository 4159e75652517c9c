// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Service health probes.
//!
//! Three endpoints with distinct contracts: `/health/live` succeeds whenever
//! the process can answer at all; `/health/ready` additionally exercises the
//! two dependencies every request path needs, the mirror database and the
//! ledger RPC endpoint; `/health` serves the same report for the mobile
//! client's startup check.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Result of one dependency probe round.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// `ok` when every probe passed, `degraded` otherwise.
    pub status: String,
    /// Mirror database probe (`ok` / `failed`).
    pub mirror: String,
    /// Ledger RPC probe (`ok` / `unreachable`).
    pub ledger: String,
    /// Chain height observed by the ledger probe, when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl HealthReport {
    fn healthy(&self) -> bool {
        self.status == "ok"
    }
}

/// Minimal body for the liveness probe.
#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
}

/// Probe both dependencies and fold the results into one report.
async fn run_probes(state: &AppState) -> HealthReport {
    // Any lookup opens a read transaction against the store, which is all
    // the probe needs to establish the database is usable.
    let mirror = if state.mirror.get(0).is_ok() {
        "ok"
    } else {
        "failed"
    };

    let (ledger, block_number) = match state.ledger.probe().await {
        Ok(height) => ("ok", Some(height)),
        Err(_) => ("unreachable", None),
    };

    let degraded = mirror != "ok" || ledger != "ok";
    HealthReport {
        status: if degraded { "degraded" } else { "ok" }.to_string(),
        mirror: mirror.to_string(),
        ledger: ledger.to_string(),
        block_number,
    }
}

fn respond(report: HealthReport) -> (StatusCode, Json<HealthReport>) {
    let code = if report.healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(report))
}

/// Combined health report over both dependencies.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Mirror and ledger both reachable", body = HealthReport),
        (status = 503, description = "A dependency probe failed", body = HealthReport)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    respond(run_probes(&state).await)
}

/// Liveness probe.
///
/// Succeeds whenever the process can answer; dependency state is
/// deliberately ignored so a ledger outage never restarts the service.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is running", body = LivenessResponse)
    )
)]
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe for orchestrators.
///
/// Reports ready only while the mirror and the ledger RPC endpoint both
/// respond, so traffic is routed elsewhere during an outage.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service can take traffic", body = HealthReport),
        (status = 503, description = "A dependency probe failed", body = HealthReport)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    respond(run_probes(&state).await)
}
