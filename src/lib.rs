// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger Gateway - Academic Records over a Permissioned Ledger
//!
//! Submits and evaluates chaincode transactions for student identities,
//! grades and prizes, and exposes the Pending -> Approved/Rejected approval
//! workflow over HTTP.
//!
//! ## Modules
//!
//! - `ledger` - Identity, connection and the endorse/order/commit gateway
//! - `contract` - The chaincode function table
//! - `codec` - Typed calls to positional arguments and back
//! - `workflow` - Transition rules and the record service
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod ledger;
pub mod models;
pub mod state;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
