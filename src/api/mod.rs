// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AckResponse, AlertView, AlertsResponse, AssetStatus, PingLocationRequest, ReportRequest,
        StatusResponse, TransferRequest, TxResponse,
    },
    state::AppState,
};

pub mod assets;
pub mod health;
pub mod relay;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/report-lost", post(relay::report_lost))
        .route("/report-stolen", post(relay::report_stolen))
        .route("/recover/{id}", post(relay::recover))
        .route("/transfer", post(relay::transfer))
        .route("/status/{id}", get(assets::status))
        .route("/alerts", get(assets::alerts))
        .route("/ping-location", post(assets::ping_location))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        relay::report_lost,
        relay::report_stolen,
        relay::recover,
        relay::transfer,
        assets::status,
        assets::alerts,
        assets::ping_location,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AssetStatus,
            AlertView,
            ReportRequest,
            TransferRequest,
            PingLocationRequest,
            TxResponse,
            StatusResponse,
            AlertsResponse,
            AckResponse
        )
    ),
    tags(
        (name = "Relay", description = "Gasless custody transactions"),
        (name = "Assets", description = "Status checks, alerts, and location pings"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;
