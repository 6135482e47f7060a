// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    models::{Grade, Prize, RecordKind, RecordStatus, Student},
    state::AppState,
};

pub mod dispatch;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/ledger/{function}", post(dispatch::invoke))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(dispatch::invoke, health::liveness, health::readiness),
    components(
        schemas(
            dispatch::InvokeRequest,
            dispatch::LedgerResponse,
            ErrorBody,
            Student,
            Grade,
            Prize,
            RecordStatus,
            RecordKind,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Ledger", description = "Student, grade and prize approval workflow"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
