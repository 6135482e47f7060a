// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transport channel to the peer gateway.
//!
//! [`LedgerChannel`] is the seam between the protocol engine and the wire.
//! The production implementation, [`HttpChannel`], speaks signed JSON
//! envelopes over mutually-authenticated HTTPS:
//!
//! | Verb | Path | Body | Response |
//! |------|------|------|----------|
//! | evaluate | `/gateway/v1/evaluate` | `SignedProposal` | `{ result }` |
//! | endorse | `/gateway/v1/endorse` | `SignedProposal` | `{ result, prepared_transaction }` |
//! | submit | `/gateway/v1/submit` | `SignedEnvelope` | `{}` |
//! | commit status | `/gateway/v1/commit-status` | `SignedCommitStatusRequest` | `{ status, block_number }` |
//!
//! 4xx responses are semantic rejections carrying `{ error }`. A 5xx may come
//! from a proxy in front of the peer and says nothing about whether the
//! request landed, so it is treated as a transport failure.
//!
//! [`HttpConnector`] only hands out a channel after a TLS session with the
//! peer has actually been established.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use super::error::ConnectionError;
use super::identity::Credentials;
use super::types::{
    b64_decode, CommitStatus, Endorsement, SignedCommitStatusRequest, SignedEnvelope,
    SignedProposal, TxValidationCode,
};

/// Errors reported by a channel call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The request may not have reached the peer, or the answer was lost.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The peer answered with a definite rejection.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The peer answered with something we could not parse.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// The four verbs of the peer gateway.
#[async_trait]
pub trait LedgerChannel: Send + Sync {
    /// Read-only execution on one peer.
    async fn evaluate(&self, proposal: &SignedProposal) -> Result<Vec<u8>, ChannelError>;

    /// Collect endorsements and return the prepared transaction.
    async fn endorse(&self, proposal: &SignedProposal) -> Result<Endorsement, ChannelError>;

    /// Hand a signed transaction to the ordering service.
    async fn submit(&self, envelope: &SignedEnvelope) -> Result<(), ChannelError>;

    /// Wait for the commit status of an ordered transaction.
    async fn commit_status(
        &self,
        request: &SignedCommitStatusRequest,
    ) -> Result<CommitStatus, ChannelError>;
}

/// Builds fresh channels for the connection manager.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn LedgerChannel>, ConnectionError>;
}

// =============================================================================
// HTTP Channel
// =============================================================================

#[derive(Debug, Deserialize)]
struct ResultBody {
    result: String,
}

#[derive(Debug, Deserialize)]
struct EndorseBody {
    result: String,
    prepared_transaction: String,
}

#[derive(Debug, Deserialize)]
struct CommitStatusBody {
    status: String,
    block_number: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// JSON-over-HTTPS channel to one peer gateway endpoint.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    base_url: Url,
    http: Client,
}

impl HttpChannel {
    pub fn new(base_url: Url, http: Client) -> Self {
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Open a session with the peer. Any HTTP answer proves the endpoint is
    /// live; the pooled connection is then reused by the verbs.
    pub async fn handshake(&self, limit: Duration) -> Result<(), ChannelError> {
        self.http
            .head(self.base_url.clone())
            .timeout(limit)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ChannelError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ChannelError::Transport(format!("invalid URL: {e}")))?;

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("HTTP {status}"),
            };
            if status.is_server_error() {
                return Err(ChannelError::Transport(format!("HTTP {status}: {message}")));
            }
            return Err(ChannelError::Rejected(message));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ChannelError::InvalidResponse(e.to_string()))
    }
}

fn decode_field(value: &str, field: &str) -> Result<Vec<u8>, ChannelError> {
    b64_decode(value).map_err(|e| ChannelError::InvalidResponse(format!("{field}: {e}")))
}

#[async_trait]
impl LedgerChannel for HttpChannel {
    async fn evaluate(&self, proposal: &SignedProposal) -> Result<Vec<u8>, ChannelError> {
        let body: ResultBody = self.post("gateway/v1/evaluate", proposal).await?;
        decode_field(&body.result, "result")
    }

    async fn endorse(&self, proposal: &SignedProposal) -> Result<Endorsement, ChannelError> {
        let body: EndorseBody = self.post("gateway/v1/endorse", proposal).await?;
        Ok(Endorsement {
            result: decode_field(&body.result, "result")?,
            prepared_transaction: decode_field(&body.prepared_transaction, "prepared_transaction")?,
        })
    }

    async fn submit(&self, envelope: &SignedEnvelope) -> Result<(), ChannelError> {
        let _: serde_json::Value = self.post("gateway/v1/submit", envelope).await?;
        Ok(())
    }

    async fn commit_status(
        &self,
        request: &SignedCommitStatusRequest,
    ) -> Result<CommitStatus, ChannelError> {
        let body: CommitStatusBody = self.post("gateway/v1/commit-status", request).await?;
        Ok(CommitStatus {
            code: TxValidationCode::parse(&body.status),
            block_number: body.block_number,
        })
    }
}

// =============================================================================
// HTTP Connector
// =============================================================================

/// Peer endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConfig {
    /// `host:port` of the peer gateway, e.g. `localhost:7051`.
    pub endpoint: String,
    /// TLS server name to expect instead of the endpoint host,
    /// e.g. `peer0.org1.example.com`.
    pub server_name: Option<String>,
    pub connect_timeout: Duration,
}

/// Builds mutually-authenticated [`HttpChannel`]s.
pub struct HttpConnector {
    peer: PeerConfig,
    client_identity_pem: Vec<u8>,
    trust_anchor_pem: String,
}

impl HttpConnector {
    pub fn new(peer: PeerConfig, credentials: &Credentials) -> Self {
        Self {
            peer,
            client_identity_pem: credentials.identity.tls_identity_pem(),
            trust_anchor_pem: credentials.trust_anchor.pem().to_string(),
        }
    }

    /// Split the configured endpoint into host and port.
    fn endpoint_parts(&self) -> Result<(String, u16), ConnectionError> {
        let endpoint = &self.peer.endpoint;
        if !endpoint.contains(':') {
            return Err(ConnectionError::InvalidEndpoint(format!("{endpoint}: missing port")));
        }
        let url = Url::parse(&format!("https://{endpoint}"))
            .map_err(|e| ConnectionError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let host = url
            .host_str()
            .ok_or_else(|| ConnectionError::InvalidEndpoint(endpoint.clone()))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| ConnectionError::InvalidEndpoint(format!("{endpoint}: missing port")))?;
        Ok((host, port))
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self) -> Result<Arc<dyn LedgerChannel>, ConnectionError> {
        let (host, port) = self.endpoint_parts()?;

        let identity = reqwest::Identity::from_pem(&self.client_identity_pem)
            .map_err(|e| ConnectionError::Tls(format!("client identity: {e}")))?;
        let anchor = Certificate::from_pem(self.trust_anchor_pem.as_bytes())
            .map_err(|e| ConnectionError::Tls(format!("trust anchor: {e}")))?;

        let mut builder = Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false)
            .add_root_certificate(anchor)
            .identity(identity)
            .connect_timeout(self.peer.connect_timeout);

        let url_host = match &self.peer.server_name {
            Some(name) => {
                // Dial the configured endpoint but verify the peer's own name.
                let addr = tokio::net::lookup_host((host.as_str(), port))
                    .await
                    .map_err(|e| ConnectionError::Unreachable(format!("{host}:{port}: {e}")))?
                    .next()
                    .ok_or_else(|| {
                        ConnectionError::Unreachable(format!("{host}:{port}: no address"))
                    })?;
                builder = builder.resolve(name, addr);
                name.clone()
            }
            None => host,
        };

        let http = builder
            .build()
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;
        let base_url = Url::parse(&format!("https://{url_host}:{port}/"))
            .map_err(|e| ConnectionError::InvalidEndpoint(e.to_string()))?;

        let channel = HttpChannel::new(base_url, http);
        channel
            .handshake(self.peer.connect_timeout)
            .await
            .map_err(|e| ConnectionError::Unreachable(format!("{}: {e}", self.peer.endpoint)))?;

        tracing::debug!(peer = %channel.base_url(), "Opened peer gateway session");
        Ok(Arc::new(channel))
    }
}
