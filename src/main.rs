// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use assetguard_server::api::router;
use assetguard_server::blockchain::{Ledger, LedgerClient};
use assetguard_server::config::Config;
use assetguard_server::state::AppState;
use assetguard_server::storage::MirrorDb;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("Failed to load configuration");

    // The mirror database and the ledger client are the two long-lived
    // resources; everything else hangs off AppState.
    let mirror =
        Arc::new(MirrorDb::open(&config.mirror_db_path()).expect("Failed to open mirror database"));
    let ledger: Arc<dyn Ledger> =
        Arc::new(LedgerClient::connect(&config).expect("Failed to create ledger client"));

    let shutdown = CancellationToken::new();
    let state = AppState::assemble(ledger, mirror, shutdown.clone());
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!(
        %addr,
        contract = %config.contract_address,
        rpc = %config.rpc_url,
        "AssetGuard relay server listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await
        .expect("Server failed");
}
