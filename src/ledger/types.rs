// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger transaction types and wire envelopes.

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Serialize};

use super::error::{GatewayError, ValidationError};
use crate::contract::Function;

// =============================================================================
// Requests and Responses
// =============================================================================

/// A single chaincode invocation, ready to be signed.
///
/// Immutable once built; the argument count always matches the target
/// function's arity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    chaincode_id: String,
    function: Function,
    args: Vec<Vec<u8>>,
}

impl TransactionRequest {
    /// Build a request, rejecting argument lists of the wrong length.
    pub fn new(
        chaincode_id: impl Into<String>,
        function: Function,
        args: Vec<Vec<u8>>,
    ) -> Result<Self, ValidationError> {
        if args.len() != function.arity() {
            return Err(ValidationError::Arity {
                function: function.name(),
                expected: function.arity(),
                actual: args.len(),
            });
        }
        Ok(Self {
            chaincode_id: chaincode_id.into(),
            function,
            args,
        })
    }

    pub fn chaincode_id(&self) -> &str {
        &self.chaincode_id
    }

    pub fn function(&self) -> Function {
        self.function
    }

    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }
}

/// Final state of a Submit protocol run.
#[derive(Debug)]
pub enum Outcome {
    /// Committed to the ledger.
    Committed,
    /// Definitely not applied.
    Failed(GatewayError),
    /// May or may not have been applied. Resolve with an Evaluate.
    Unknown(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Committed => "committed",
            Outcome::Failed(_) => "failed",
            Outcome::Unknown(_) => "unknown",
        }
    }
}

/// Result of one completed Submit protocol run.
#[derive(Debug)]
pub struct TransactionResponse {
    /// Chaincode return value captured at endorsement (empty if never endorsed).
    pub payload: Vec<u8>,
    pub transaction_id: String,
    pub outcome: Outcome,
    /// Block holding the transaction, when the commit status reported one.
    pub block_number: Option<u64>,
}

/// Proof of a committed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: String,
    pub payload: Vec<u8>,
    pub block_number: Option<u64>,
}

impl TransactionResponse {
    /// Collapse the outcome into a receipt or a tagged error.
    pub fn into_receipt(self) -> Result<Receipt, GatewayError> {
        match self.outcome {
            Outcome::Committed => Ok(Receipt {
                transaction_id: self.transaction_id,
                payload: self.payload,
                block_number: self.block_number,
            }),
            Outcome::Failed(err) => Err(err),
            Outcome::Unknown(reason) => Err(GatewayError::CommitUnknown {
                transaction_id: self.transaction_id,
                reason,
            }),
        }
    }
}

// =============================================================================
// Wire Envelopes
// =============================================================================

/// Identity of the transaction creator as sent on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub msp_id: String,
    /// PEM-encoded X.509 certificate.
    pub id_bytes: String,
}

/// Unsigned chaincode proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub channel: String,
    pub chaincode: String,
    pub function: String,
    /// Base64 of each positional argument.
    pub args: Vec<String>,
    pub transaction_id: String,
    pub creator: SerializedIdentity,
    /// Base64 nonce.
    pub nonce: String,
    /// RFC 3339 creation time.
    pub timestamp: String,
}

impl Proposal {
    /// Decode the positional arguments back to byte strings.
    pub fn decoded_args(&self) -> Result<Vec<Vec<u8>>, WireError> {
        self.args.iter().map(|a| b64_decode(a)).collect()
    }
}

/// Proposal bytes plus the creator's signature over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedProposal {
    pub transaction_id: String,
    /// Base64 of the JSON-serialized [`Proposal`].
    pub proposal_bytes: String,
    /// Base64 DER ECDSA signature.
    pub signature: String,
}

impl SignedProposal {
    /// Parse the embedded proposal.
    pub fn proposal(&self) -> Result<Proposal, WireError> {
        let bytes = b64_decode(&self.proposal_bytes)?;
        serde_json::from_slice(&bytes).map_err(|e| WireError(e.to_string()))
    }
}

/// Endorsed transaction returned by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endorsement {
    /// Chaincode return value.
    pub result: Vec<u8>,
    /// Transaction envelope payload that must be signed before ordering.
    pub prepared_transaction: Vec<u8>,
}

/// Prepared transaction plus the creator's signature, handed to ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub transaction_id: String,
    /// Base64 prepared transaction.
    pub payload: String,
    /// Base64 DER ECDSA signature.
    pub signature: String,
}

/// Request for the commit status of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatusRequest {
    pub channel: String,
    pub transaction_id: String,
    pub identity: SerializedIdentity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCommitStatusRequest {
    pub transaction_id: String,
    /// Base64 of the JSON-serialized [`CommitStatusRequest`].
    pub request: String,
    pub signature: String,
}

/// Validation code assigned to a transaction at commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxValidationCode {
    Valid,
    MvccReadConflict,
    PhantomReadConflict,
    Other(String),
}

impl TxValidationCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "VALID" => TxValidationCode::Valid,
            "MVCC_READ_CONFLICT" => TxValidationCode::MvccReadConflict,
            "PHANTOM_READ_CONFLICT" => TxValidationCode::PhantomReadConflict,
            other => TxValidationCode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TxValidationCode::Valid => "VALID",
            TxValidationCode::MvccReadConflict => "MVCC_READ_CONFLICT",
            TxValidationCode::PhantomReadConflict => "PHANTOM_READ_CONFLICT",
            TxValidationCode::Other(code) => code,
        }
    }

    /// Concurrent write on the same key detected by the ledger.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            TxValidationCode::MvccReadConflict | TxValidationCode::PhantomReadConflict
        )
    }
}

/// Commit status reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitStatus {
    pub code: TxValidationCode,
    pub block_number: u64,
}

/// Malformed wire data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed wire data: {0}")]
pub struct WireError(pub String);

pub fn b64_encode(bytes: &[u8]) -> String {
    Base64::encode_string(bytes)
}

pub fn b64_decode(value: &str) -> Result<Vec<u8>, WireError> {
    Base64::decode_vec(value).map_err(|e| WireError(e.to_string()))
}
