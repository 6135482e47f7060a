// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Table-driven ledger endpoint.
//!
//! `POST /v1/ledger/{function}` serves all nine chaincode functions. The JSON
//! body is mapped onto the function's positional arguments by parameter name
//! (strings or numbers), in table order. Validate-style calls may add
//! `currentStatus` so the workflow check can fail fast.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::{
    contract::Function,
    error::{ApiError, ErrorBody},
    ledger::ValidationError,
    models::RecordStatus,
    state::AppState,
    workflow::DispatchResult,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InvokeRequest {
    /// Assumed current status for validate-style calls (default `Pending`).
    #[serde(default, rename = "currentStatus")]
    pub current_status: Option<String>,
    /// Function parameters by name, e.g. `school`, `studentId`.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerResponse {
    pub code: u16,
    pub message: String,
    /// Decoded record for queries; chaincode return value (or null) for submits.
    #[schema(value_type = Object)]
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/v1/ledger/{function}",
    params(
        ("function" = String, Path, description = "Chaincode function, e.g. addStudent or queryGrade")
    ),
    tag = "Ledger",
    request_body = InvokeRequest,
    responses(
        (status = 200, description = "Committed or found", body = LedgerResponse),
        (status = 400, description = "Invalid arguments or illegal transition", body = ErrorBody),
        (status = 404, description = "Unknown function or no decided record", body = ErrorBody),
        (status = 409, description = "Concurrent write on the same record", body = ErrorBody),
        (status = 503, description = "Peer gateway unreachable", body = ErrorBody),
        (status = 504, description = "Commit outcome unknown; query before retrying", body = ErrorBody)
    )
)]
pub async fn invoke(
    State(state): State<AppState>,
    Path(function): Path<String>,
    body: Result<Json<InvokeRequest>, JsonRejection>,
) -> Result<Json<LedgerResponse>, ApiError> {
    let function: Function = function
        .parse()
        .map_err(|e: ValidationError| ApiError::not_found(e.to_string()).with_code("unknown_function"))?;
    let Json(body) =
        body.map_err(|e| ApiError::bad_request(e.body_text()).with_code("invalid_body"))?;

    let assumed = match body.current_status.as_deref() {
        Some(status) => status.parse::<RecordStatus>()?,
        None => RecordStatus::Pending,
    };
    let args = positional_args(function, &body.args)?;

    match state
        .service
        .dispatch(function, &args, assumed, state.deadline())
        .await?
    {
        DispatchResult::Submitted(receipt) => Ok(Json(LedgerResponse {
            code: 200,
            message: format!("{function} success"),
            result: payload_value(&receipt.payload),
            transaction_id: Some(receipt.transaction_id),
            block_number: receipt.block_number,
        })),
        DispatchResult::Queried(Some(record)) => {
            let result = serde_json::to_value(&record).map_err(|e| {
                ApiError::new(axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            })?;
            Ok(Json(LedgerResponse {
                code: 200,
                message: format!("{function} success"),
                result,
                transaction_id: None,
                block_number: None,
            }))
        }
        DispatchResult::Queried(None) => Err(ApiError::not_found(format!(
            "No approved or rejected {} record matches the key",
            function.record_kind()
        ))
        .with_code("not_found")),
    }
}

/// Arguments in table order; numbers are passed through as written.
fn positional_args(function: Function, body: &Map<String, Value>) -> Result<Vec<String>, ApiError> {
    function
        .spec()
        .params
        .iter()
        .map(|param| match body.get(param.name) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(Value::Number(value)) => Ok(value.to_string()),
            Some(other) => Err(ApiError::bad_request(format!(
                "Field `{}` must be a string or a number, got {other}",
                param.name
            ))
            .with_code("validation_error")),
            None => Err(ValidationError::EmptyField(param.name).into()),
        })
        .collect()
}

fn payload_value(payload: &[u8]) -> Value {
    if payload.is_empty() {
        Value::Null
    } else {
        Value::String(String::from_utf8_lossy(payload).into_owned())
    }
}
