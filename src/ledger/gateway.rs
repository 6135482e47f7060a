// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction gateway: the endorse / order / commit protocol engine.
//!
//! ## Submit
//!
//! ```text
//! Idle -> Endorsing -> Ordering -> CommitWaiting -> Committed
//!             |            |             |
//!             v            v             +--> Failed (conflict / commit code)
//!          Failed       Failed           +--> Unknown (timeout, lost answer)
//!                          |
//!                          +--> Unknown (envelope may have reached ordering)
//! ```
//!
//! - Nothing is written unless ordering accepted the envelope, so every
//!   failure before that point is a definite `Failed`.
//! - Once the envelope may have reached ordering, a timeout or transport
//!   failure is reported as `Unknown`. The gateway never retries or re-queries
//!   on its own; the caller resolves the ambiguity with an Evaluate.
//!
//! ## Evaluate
//!
//! A single read-only round trip. A transport failure marks the connection
//! broken and the read is retried once on a fresh connection; a second
//! transport failure is a connection error.
//!
//! A transport failure while endorsing is also a connection error: nothing
//! reached ordering and no peer decided anything.
//!
//! Each phase runs under `min(phase timeout, time left until the caller
//! deadline)`.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use super::channel::ChannelError;
use super::connection::{Connection, ConnectionManager};
use super::error::{ConnectionError, GatewayError, ValidationError};
use super::identity::{transaction_id, Identity};
use super::types::{
    b64_encode, CommitStatusRequest, Outcome, Proposal, SignedCommitStatusRequest,
    SignedEnvelope, SignedProposal, TransactionRequest, TransactionResponse,
};
use crate::contract::CallKind;

/// Nonce length used for transaction ids.
const NONCE_LEN: usize = 24;

/// Per-phase time budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub evaluate: Duration,
    pub endorse: Duration,
    pub submit: Duration,
    pub commit: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            evaluate: Duration::from_secs(5),
            endorse: Duration::from_secs(15),
            submit: Duration::from_secs(5),
            commit: Duration::from_secs(60),
        }
    }
}

/// Network coordinates and budgets of the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub channel: String,
    pub chaincode: String,
    pub timeouts: Timeouts,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            channel: "mychannel".to_string(),
            chaincode: "basic".to_string(),
            timeouts: Timeouts::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Endorsing,
    Ordering,
    CommitWaiting,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Endorsing => "endorsing",
            Phase::Ordering => "ordering",
            Phase::CommitWaiting => "commit_waiting",
        })
    }
}

/// Time left for a phase, or `None` if the caller deadline has passed.
fn phase_budget(limit: Duration, deadline: Option<Instant>) -> Option<Duration> {
    match deadline {
        None => Some(limit),
        Some(deadline) => {
            let now = Instant::now();
            (deadline > now).then(|| limit.min(deadline - now))
        }
    }
}

/// Gateway owning the identity and the shared connection.
pub struct Gateway {
    identity: Arc<Identity>,
    connections: Arc<ConnectionManager>,
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(
        identity: Arc<Identity>,
        connections: Arc<ConnectionManager>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            identity,
            connections,
            config,
        }
    }

    pub fn chaincode(&self) -> &str {
        &self.config.chaincode
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    /// Run a read-only query and return the raw payload.
    pub async fn evaluate(
        &self,
        request: &TransactionRequest,
        deadline: Option<Instant>,
    ) -> Result<Vec<u8>, GatewayError> {
        ensure_kind(request, CallKind::Evaluate)?;

        let budget = phase_budget(self.config.timeouts.evaluate, deadline)
            .ok_or_else(|| GatewayError::Evaluate("deadline exceeded".to_string()))?;
        let evaluate_deadline = Instant::now() + budget;
        let proposal = self.signed_proposal(request)?;
        let function = request.function().name();

        let mut reconnected = false;
        loop {
            let connection = self.connections.acquire().await?;
            let remaining = evaluate_deadline.saturating_duration_since(Instant::now());

            match timeout(remaining, connection.evaluate(&proposal)).await {
                Ok(Ok(payload)) => {
                    debug!(function, bytes = payload.len(), "Evaluate succeeded");
                    return Ok(payload);
                }
                Ok(Err(ChannelError::Transport(message))) => {
                    self.connections.mark_broken(&connection).await;
                    if reconnected {
                        return Err(ConnectionError::Unreachable(message).into());
                    }
                    warn!(function, error = %message, "Evaluate transport failure, retrying on a fresh connection");
                    reconnected = true;
                }
                Ok(Err(e)) => return Err(GatewayError::Evaluate(e.to_string())),
                Err(_) => {
                    return Err(GatewayError::Evaluate(format!(
                        "no response within {budget:?}"
                    )))
                }
            }
        }
    }

    /// Drive one transaction through endorse, order and commit.
    ///
    /// `Err` is returned only when the protocol never started (bad request,
    /// no connection, signing failure). Every started run yields exactly one
    /// [`TransactionResponse`] with its outcome set.
    pub async fn submit(
        &self,
        request: &TransactionRequest,
        deadline: Option<Instant>,
    ) -> Result<TransactionResponse, GatewayError> {
        ensure_kind(request, CallKind::Submit)?;

        let connection = self.connections.acquire().await?;
        let proposal = self.signed_proposal(request)?;
        let run = SubmitRun {
            gateway: self,
            connection,
            function: request.function().name(),
            transaction_id: proposal.transaction_id.clone(),
            deadline,
        };

        info!(
            function = run.function,
            transaction_id = %run.transaction_id,
            "Submitting transaction"
        );

        let response = run.execute(&proposal).await;
        match &response.outcome {
            Outcome::Committed => info!(
                function = run.function,
                transaction_id = %response.transaction_id,
                block = ?response.block_number,
                "Transaction committed"
            ),
            Outcome::Failed(e) => warn!(
                function = run.function,
                transaction_id = %response.transaction_id,
                error = %e,
                "Transaction failed"
            ),
            Outcome::Unknown(reason) => warn!(
                function = run.function,
                transaction_id = %response.transaction_id,
                reason = %reason,
                "Transaction outcome unknown; caller must re-query"
            ),
        }
        Ok(response)
    }

    fn signed_proposal(&self, request: &TransactionRequest) -> Result<SignedProposal, GatewayError> {
        let mut nonce = [0u8; NONCE_LEN];
        self.identity.fill_random(&mut nonce)?;
        let transaction_id = transaction_id(&nonce, &self.identity.creator_bytes());

        let proposal = Proposal {
            channel: self.config.channel.clone(),
            chaincode: request.chaincode_id().to_string(),
            function: request.function().name().to_string(),
            args: request.args().iter().map(|a| b64_encode(a)).collect(),
            transaction_id: transaction_id.clone(),
            creator: self.identity.serialized(),
            nonce: b64_encode(&nonce),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let bytes = serde_json::to_vec(&proposal).map_err(|e| GatewayError::Encode(e.to_string()))?;
        let signature = self.identity.sign(&bytes)?;

        Ok(SignedProposal {
            transaction_id,
            proposal_bytes: b64_encode(&bytes),
            signature: b64_encode(&signature),
        })
    }

    fn signed_commit_request(
        &self,
        transaction_id: &str,
    ) -> Result<SignedCommitStatusRequest, GatewayError> {
        let request = CommitStatusRequest {
            channel: self.config.channel.clone(),
            transaction_id: transaction_id.to_string(),
            identity: self.identity.serialized(),
        };
        let bytes = serde_json::to_vec(&request).map_err(|e| GatewayError::Encode(e.to_string()))?;
        let signature = self.identity.sign(&bytes)?;
        Ok(SignedCommitStatusRequest {
            transaction_id: transaction_id.to_string(),
            request: b64_encode(&bytes),
            signature: b64_encode(&signature),
        })
    }
}

fn ensure_kind(request: &TransactionRequest, kind: CallKind) -> Result<(), ValidationError> {
    let function = request.function();
    if function.kind() != kind {
        return Err(ValidationError::WrongCallKind {
            function: function.name(),
            requested: kind,
        });
    }
    Ok(())
}

/// State of one Submit protocol run.
struct SubmitRun<'a> {
    gateway: &'a Gateway,
    connection: Connection,
    function: &'static str,
    transaction_id: String,
    deadline: Option<Instant>,
}

impl SubmitRun<'_> {
    async fn execute(&self, proposal: &SignedProposal) -> TransactionResponse {
        let timeouts = self.gateway.config.timeouts;

        // Endorsing: nothing leaves this process for ordering yet.
        let Some(budget) = phase_budget(timeouts.endorse, self.deadline) else {
            return self.failed(Vec::new(), self.endorsement_error("deadline exceeded before endorsement"));
        };
        debug!(transaction_id = %self.transaction_id, phase = %Phase::Endorsing, ?budget, "Entering phase");
        let endorsement = match timeout(budget, self.connection.endorse(proposal)).await {
            Ok(Ok(endorsement)) => endorsement,
            // Lost in transit: the peer never decided, so this is not an
            // endorsement outcome.
            Ok(Err(ChannelError::Transport(message))) => {
                self.gateway.connections.mark_broken(&self.connection).await;
                return self.failed(Vec::new(), ConnectionError::Unreachable(message).into());
            }
            Ok(Err(e)) => return self.failed(Vec::new(), self.endorsement_error(&e.to_string())),
            Err(_) => {
                return self.failed(
                    Vec::new(),
                    self.endorsement_error(&format!("no endorsement within {budget:?}")),
                )
            }
        };
        let payload = endorsement.result;

        let signature = match self.gateway.identity.sign(&endorsement.prepared_transaction) {
            Ok(signature) => signature,
            Err(e) => return self.failed(payload, e.into()),
        };
        let envelope = SignedEnvelope {
            transaction_id: self.transaction_id.clone(),
            payload: b64_encode(&endorsement.prepared_transaction),
            signature: b64_encode(&signature),
        };

        // Ordering: a rejection is definite, anything else may have landed.
        let Some(budget) = phase_budget(timeouts.submit, self.deadline) else {
            return self.failed(payload, self.ordering_error("deadline exceeded before ordering"));
        };
        debug!(transaction_id = %self.transaction_id, phase = %Phase::Ordering, ?budget, "Entering phase");
        match timeout(budget, self.connection.submit(&envelope)).await {
            Ok(Ok(())) => {}
            Ok(Err(ChannelError::Rejected(message))) => {
                return self.failed(payload, self.ordering_error(&message));
            }
            Ok(Err(e)) => {
                self.note_transport(&e).await;
                return self.unknown(payload, Phase::Ordering, e.to_string());
            }
            Err(_) => {
                return self.unknown(
                    payload,
                    Phase::Ordering,
                    format!("no ordering acknowledgement within {budget:?}"),
                )
            }
        }

        // CommitWaiting: only a definite status settles the outcome.
        let Some(budget) = phase_budget(timeouts.commit, self.deadline) else {
            return self.unknown(payload, Phase::CommitWaiting, "deadline exceeded".to_string());
        };
        let request = match self.gateway.signed_commit_request(&self.transaction_id) {
            Ok(request) => request,
            Err(e) => return self.unknown(payload, Phase::CommitWaiting, e.to_string()),
        };
        debug!(transaction_id = %self.transaction_id, phase = %Phase::CommitWaiting, ?budget, "Entering phase");
        match timeout(budget, self.connection.commit_status(&request)).await {
            Ok(Ok(status)) if status.code == super::types::TxValidationCode::Valid => {
                self.respond(payload, Outcome::Committed, Some(status.block_number))
            }
            Ok(Ok(status)) => {
                let code = status.code.as_str().to_string();
                let error = if status.code.is_conflict() {
                    GatewayError::LedgerConflict {
                        transaction_id: self.transaction_id.clone(),
                        code,
                    }
                } else {
                    GatewayError::Commit {
                        transaction_id: self.transaction_id.clone(),
                        code,
                    }
                };
                self.respond(payload, Outcome::Failed(error), Some(status.block_number))
            }
            Ok(Err(e)) => {
                self.note_transport(&e).await;
                self.unknown(payload, Phase::CommitWaiting, e.to_string())
            }
            Err(_) => self.unknown(
                payload,
                Phase::CommitWaiting,
                format!("no commit status within {budget:?}"),
            ),
        }
    }

    async fn note_transport(&self, error: &ChannelError) {
        if matches!(error, ChannelError::Transport(_)) {
            self.gateway.connections.mark_broken(&self.connection).await;
        }
    }

    fn endorsement_error(&self, message: &str) -> GatewayError {
        GatewayError::Endorsement {
            transaction_id: self.transaction_id.clone(),
            message: message.to_string(),
        }
    }

    fn ordering_error(&self, message: &str) -> GatewayError {
        GatewayError::Ordering {
            transaction_id: self.transaction_id.clone(),
            message: message.to_string(),
        }
    }

    fn failed(&self, payload: Vec<u8>, error: GatewayError) -> TransactionResponse {
        self.respond(payload, Outcome::Failed(error), None)
    }

    fn unknown(&self, payload: Vec<u8>, phase: Phase, reason: String) -> TransactionResponse {
        self.respond(payload, Outcome::Unknown(format!("{phase}: {reason}")), None)
    }

    fn respond(
        &self,
        payload: Vec<u8>,
        outcome: Outcome,
        block_number: Option<u64>,
    ) -> TransactionResponse {
        TransactionResponse {
            payload,
            transaction_id: self.transaction_id.clone(),
            outcome,
            block_number,
        }
    }
}
