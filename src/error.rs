// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::ledger::{GatewayError, ValidationError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: Option<&'static str>,
    pub transaction_id: Option<String>,
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// HTTP status code, repeated for clients that only see the body.
    pub code: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    /// Set when the failure happened after a transaction id was assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_code: None,
            transaction_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_code(mut self, error_code: &'static str) -> Self {
        self.error_code = Some(error_code);
        self
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        let status = match &err {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Identity(_) | GatewayError::Encode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GatewayError::Endorsement { .. } | GatewayError::Commit { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GatewayError::LedgerConflict { .. } => StatusCode::CONFLICT,
            GatewayError::Ordering { .. }
            | GatewayError::Evaluate(_)
            | GatewayError::Decode(_) => StatusCode::BAD_GATEWAY,
            GatewayError::CommitUnknown { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        if status.is_server_error() {
            warn!(error_code = err.error_code(), error = %err, "Ledger call failed");
        }

        Self {
            status,
            error_code: Some(err.error_code()),
            transaction_id: err.transaction_id().map(str::to_string),
            message: err.to_string(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        GatewayError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            code: self.status.as_u16(),
            error: self.message,
            error_code: self.error_code.map(str::to_string),
            transaction_id: self.transaction_id,
        });
        (self.status, body).into_response()
    }
}
