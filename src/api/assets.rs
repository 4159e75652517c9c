// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read endpoints and location pings: ledger-fresh status checks, the public
//! alert feed, and samaritan GPS pings.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    alerts,
    error::ApiError,
    models::{AckResponse, AlertsResponse, PingLocationRequest, StatusResponse},
    state::AppState,
};

/// Format a GPS coordinate pair the way the mirror stores it.
fn format_location(lat: f64, lon: f64) -> String {
    format!("{lat:.4}, {lon:.4}")
}

/// Check an asset's custody status straight from the ledger.
///
/// Bypasses the mirror for callers that need ledger-fresh truth, e.g. a scan
/// of an asset whose mirror entry may be stale or absent. An unregistered id
/// is reported via `isRegistered: false`, never conflated with SECURE.
#[utoipa::path(
    get,
    path = "/status/{id}",
    tag = "Assets",
    params(
        ("id" = i64, Path, description = "Asset token id")
    ),
    responses(
        (status = 200, description = "Ledger-fresh status", body = StatusResponse),
        (status = 400, description = "Invalid token id"),
        (status = 500, description = "Ledger unreachable")
    )
)]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StatusResponse>, ApiError> {
    if id < 0 {
        return Err(ApiError::bad_request(
            "Token ID must be a non-negative integer",
        ));
    }

    let resolved = state
        .reconciler
        .resolve(id as u64)
        .await
        .map_err(|e| ApiError::internal(format!("Could not reach ledger: {e}")))?;

    Ok(Json(StatusResponse {
        success: true,
        is_registered: resolved.is_registered,
        status: resolved.status,
    }))
}

/// Fetch the current BOLO alert feed.
///
/// Derived from the mirror on every call; LOST and STOLEN assets only,
/// most recently updated first.
#[utoipa::path(
    get,
    path = "/alerts",
    tag = "Assets",
    responses(
        (status = 200, description = "Current alert feed", body = AlertsResponse),
        (status = 500, description = "Mirror store failure")
    )
)]
pub async fn alerts(State(state): State<AppState>) -> Result<Json<AlertsResponse>, ApiError> {
    let alerts = alerts::current_alerts(&state.mirror)
        .map_err(|e| ApiError::internal(format!("Failed to fetch alerts: {e}")))?;

    Ok(Json(AlertsResponse {
        success: true,
        alerts,
    }))
}

/// Attach a GPS ping to an asset.
///
/// Location pings live only in the mirror; they are never written to the
/// ledger. A ping for an asset the mirror has not seen is acknowledged and
/// dropped.
#[utoipa::path(
    post,
    path = "/ping-location",
    tag = "Assets",
    request_body = PingLocationRequest,
    responses(
        (status = 200, description = "Ping recorded", body = AckResponse),
        (status = 400, description = "Missing or invalid token id"),
        (status = 500, description = "Mirror store failure")
    )
)]
pub async fn ping_location(
    State(state): State<AppState>,
    Json(request): Json<PingLocationRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let token_id = match request.token_id {
        None => return Err(ApiError::bad_request("Token ID is required")),
        Some(id) if id < 0 => {
            return Err(ApiError::bad_request(
                "Token ID must be a non-negative integer",
            ))
        }
        Some(id) => id as u64,
    };

    let location = format_location(request.lat, request.lon);
    let recorded = state
        .mirror
        .set_location(token_id, &location)
        .map_err(|e| ApiError::internal(format!("Failed to save location: {e}")))?;

    if !recorded {
        tracing::debug!(token_id, "location ping for asset unknown to the mirror");
    }

    Ok(Json(AckResponse { success: true }))
}
