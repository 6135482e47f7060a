// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use ledger_gateway::{
    api::router,
    config::{AppConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    ledger::{ConnectionManager, Credentials, Gateway, HttpConnector},
    state::AppState,
    workflow::RecordService,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    init_tracing();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let credentials = Credentials::load(&config.identity).expect("Failed to load ledger credentials");

    let connector = HttpConnector::new(config.peer.clone(), &credentials);
    let connections = Arc::new(ConnectionManager::new(Arc::new(connector), config.backoff));

    // Connect eagerly so misconfiguration shows up in the startup logs; calls
    // reconnect lazily either way.
    if let Err(e) = connections.acquire().await {
        warn!(error = %e, endpoint = %config.peer.endpoint, "Peer gateway not reachable at startup");
    }

    let gateway = Gateway::new(credentials.identity.clone(), connections, config.gateway.clone());
    let state = AppState::new(RecordService::new(gateway)).with_call_timeout(config.call_timeout);
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(
        %addr,
        channel = %config.gateway.channel,
        chaincode = %config.gateway.chaincode,
        "Ledger gateway listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
