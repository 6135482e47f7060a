// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Integration
//!
//! Everything between a typed chaincode call and the peer gateway.
//!
//! ## Modules
//!
//! - `identity` - Signing identity and transport trust anchor
//! - `channel` - Transport seam and the mTLS HTTP channel
//! - `connection` - Shared connection with lazy reconnect
//! - `gateway` - Submit / Evaluate protocol engine
//! - `types` - Requests, responses and wire envelopes
//! - `error` - Error taxonomy

pub mod channel;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod types;

pub use channel::{ChannelError, Connector, HttpConnector, LedgerChannel, PeerConfig};
pub use connection::{BackoffPolicy, Connection, ConnectionManager, ConnectionState};
pub use error::{
    ConnectionError, DecodeError, GatewayError, IdentityError, ValidationError,
};
pub use gateway::{Gateway, GatewayConfig, Timeouts};
pub use identity::{Credentials, Identity, IdentityConfig, TrustAnchor};
pub use types::{Outcome, Receipt, TransactionRequest, TransactionResponse};
