// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relay endpoints: gasless custody transactions paid by the custodial key.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{ReportRequest, TransferRequest, TxResponse},
    state::AppState,
};

/// Validate a wire token id before any ledger interaction.
fn require_token_id(token_id: Option<i64>) -> Result<u64, ApiError> {
    match token_id {
        None => Err(ApiError::bad_request("Token ID is required")),
        Some(id) if id < 0 => Err(ApiError::bad_request(
            "Token ID must be a non-negative integer",
        )),
        Some(id) => Ok(id as u64),
    }
}

/// Report an asset lost.
///
/// Submits `reportLost` from the custodial key and mirrors the confirmed
/// transition.
#[utoipa::path(
    post,
    path = "/report-lost",
    tag = "Relay",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Transaction confirmed", body = TxResponse),
        (status = 400, description = "Missing or invalid token id"),
        (status = 500, description = "Ledger rejection or network error")
    )
)]
pub async fn report_lost(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let token_id = require_token_id(request.token_id)?;
    let confirmation = state.dispatcher.report_lost(token_id).await?;

    Ok(Json(TxResponse {
        success: true,
        tx_hash: confirmation.tx_hash,
    }))
}

/// Report an asset stolen.
#[utoipa::path(
    post,
    path = "/report-stolen",
    tag = "Relay",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Transaction confirmed", body = TxResponse),
        (status = 400, description = "Missing or invalid token id"),
        (status = 500, description = "Ledger rejection or network error")
    )
)]
pub async fn report_stolen(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let token_id = require_token_id(request.token_id)?;
    let confirmation = state.dispatcher.report_stolen(token_id).await?;

    Ok(Json(TxResponse {
        success: true,
        tx_hash: confirmation.tx_hash,
    }))
}

/// Mark an asset recovered.
///
/// The confirmed transition removes the asset from the alert feed and clears
/// its last reported location in the same mirror write.
#[utoipa::path(
    post,
    path = "/recover/{id}",
    tag = "Relay",
    params(
        ("id" = i64, Path, description = "Asset token id")
    ),
    responses(
        (status = 200, description = "Transaction confirmed", body = TxResponse),
        (status = 400, description = "Invalid token id"),
        (status = 500, description = "Ledger rejection or network error")
    )
)]
pub async fn recover(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TxResponse>, ApiError> {
    let token_id = require_token_id(Some(id))?;
    let confirmation = state.dispatcher.report_recovered(token_id).await?;

    Ok(Json(TxResponse {
        success: true,
        tx_hash: confirmation.tx_hash,
    }))
}

/// Transfer custody of an asset to a new owner.
///
/// The contract refuses transfers of stolen assets; that rejection reason is
/// forwarded to the caller verbatim.
#[utoipa::path(
    post,
    path = "/transfer",
    tag = "Relay",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transaction confirmed", body = TxResponse),
        (status = 400, description = "Missing token id or malformed address"),
        (status = 500, description = "Ledger rejection (reason forwarded) or network error")
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TxResponse>, ApiError> {
    let token_id = require_token_id(request.token_id)?;
    let new_owner = request
        .new_owner
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("New owner address is required"))?;

    let confirmation = state.dispatcher.transfer_custody(token_id, new_owner).await?;

    Ok(Json(TxResponse {
        success: true,
        tx_hash: confirmation.tx_hash,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_validation() {
        assert!(require_token_id(None).is_err());
        assert!(require_token_id(Some(-1)).is_err());
        assert_eq!(require_token_id(Some(0)).unwrap(), 0);
        assert_eq!(require_token_id(Some(7)).unwrap(), 7);
    }
}
