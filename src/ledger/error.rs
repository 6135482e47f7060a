// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Errors that can occur while talking to the ledger.
//!
//! Every failure is returned to the caller tagged with its kind. The kinds
//! differ in what the caller may do next:
//!
//! | Kind | Nature | Caller action |
//! |------|--------|---------------|
//! | `Identity` | fatal, startup only | fix credentials |
//! | `Connection` | transient | retry later |
//! | `Validation` | bad input, nothing sent | fix the request |
//! | `Endorsement` / `Ordering` | definite, nothing written | re-evaluate, then resubmit |
//! | `LedgerConflict` / `Commit` | definite, rejected at commit | re-evaluate, then resubmit |
//! | `CommitUnknown` | ambiguous | re-query with Evaluate, never resubmit blindly |
//! | `Decode` | malformed payload | report |

use std::path::PathBuf;

use crate::contract::CallKind;
use crate::models::{RecordKind, RecordStatus};

/// Errors loading or using the signing identity.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Member org id must not be empty")]
    MissingMspId,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No key file found in {0}")]
    EmptyKeyDirectory(PathBuf),

    #[error("Invalid PEM in {path}: {message}")]
    InvalidPem { path: PathBuf, message: String },

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Signing failed")]
    Signing,
}

/// Errors establishing the transport connection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Invalid peer endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("TLS configuration failed: {0}")]
    Tls(String),

    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    #[error("Gave up connecting after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

impl ConnectionError {
    /// Whether another connection attempt could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConnectionError::Unreachable(_))
    }
}

/// Caller input rejected before any network call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{function}` expects {expected} arguments, got {actual}")]
    Arity {
        function: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{function}` cannot be called as {requested:?}")]
    WrongCallKind {
        function: &'static str,
        requested: CallKind,
    },

    #[error("Field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("Field `{field}` is not a valid number: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Field `{0}` must be positive")]
    NotPositive(&'static str),

    #[error("Invalid status `{0}` (expected Pending, Approved or Rejected)")]
    InvalidStatus(String),

    #[error("Illegal {kind} transition {from} -> {to}")]
    IllegalTransition {
        kind: RecordKind,
        from: RecordStatus,
        to: RecordStatus,
    },
}

/// A response payload that could not be decoded.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Malformed {kind} payload: {message}")]
pub struct DecodeError {
    pub kind: RecordKind,
    pub message: String,
}

/// Errors returned by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to encode transaction: {0}")]
    Encode(String),

    #[error("Endorsement of {transaction_id} failed: {message}")]
    Endorsement {
        transaction_id: String,
        message: String,
    },

    #[error("Ordering service rejected {transaction_id}: {message}")]
    Ordering {
        transaction_id: String,
        message: String,
    },

    #[error("Ledger conflict committing {transaction_id}: {code}")]
    LedgerConflict {
        transaction_id: String,
        code: String,
    },

    #[error("Commit of {transaction_id} failed with status {code}")]
    Commit {
        transaction_id: String,
        code: String,
    },

    #[error(
        "Commit status of {transaction_id} is unknown ({reason}); re-query ledger state before resubmitting"
    )]
    CommitUnknown {
        transaction_id: String,
        reason: String,
    },

    #[error("Evaluate failed: {0}")]
    Evaluate(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl GatewayError {
    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Identity(_) => "identity_error",
            GatewayError::Connection(_) => "connection_error",
            GatewayError::Validation(_) => "validation_error",
            GatewayError::Encode(_) => "encode_error",
            GatewayError::Endorsement { .. } => "endorsement_error",
            GatewayError::Ordering { .. } => "ordering_error",
            GatewayError::LedgerConflict { .. } => "ledger_conflict",
            GatewayError::Commit { .. } => "commit_error",
            GatewayError::CommitUnknown { .. } => "commit_unknown",
            GatewayError::Evaluate(_) => "evaluate_error",
            GatewayError::Decode(_) => "decode_error",
        }
    }

    /// Whether the same call may simply be issued again.
    ///
    /// Definite ledger outcomes and ambiguous commits are never retryable
    /// without the caller first re-evaluating ledger state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Connection(_) | GatewayError::Evaluate(_))
    }

    /// Transaction id, when the failure happened after one was assigned.
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            GatewayError::Endorsement { transaction_id, .. }
            | GatewayError::Ordering { transaction_id, .. }
            | GatewayError::LedgerConflict { transaction_id, .. }
            | GatewayError::Commit { transaction_id, .. }
            | GatewayError::CommitUnknown { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }
}
