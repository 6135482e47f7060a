// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Connection manager.
//!
//! Owns the single long-lived channel to the peer gateway. All concurrent
//! gateway calls share it; it is only replaced after a call reports a
//! transport failure. Reconnection happens lazily on the next
//! [`ConnectionManager::acquire`], with bounded exponential backoff.
//!
//! Acquirers that arrive while a reconnect is in progress wait behind it and
//! then reuse its result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::channel::{Connector, LedgerChannel};
use super::error::ConnectionError;

/// A live, shared channel handle.
pub type Connection = Arc<dyn LedgerChannel>;

/// Default number of connection attempts per acquire.
const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// Default delay before the second attempt.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Upper bound on a single backoff delay.
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Owner of the shared channel.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    backoff: BackoffPolicy,
    current: RwLock<Option<Connection>>,
    connects: AtomicU64,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>, backoff: BackoffPolicy) -> Self {
        Self {
            connector,
            backoff,
            current: RwLock::new(None),
            connects: AtomicU64::new(0),
        }
    }

    /// Return the shared channel, connecting first if necessary.
    pub async fn acquire(&self) -> Result<Connection, ConnectionError> {
        if let Some(connection) = self.current.read().await.as_ref() {
            return Ok(connection.clone());
        }

        let mut slot = self.current.write().await;
        // Another caller may have reconnected while we waited for the lock.
        if let Some(connection) = slot.as_ref() {
            return Ok(connection.clone());
        }

        let max_attempts = self.backoff.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.connector.connect().await {
                Ok(connection) => {
                    let total = self.connects.fetch_add(1, Ordering::Relaxed) + 1;
                    info!(attempt, connects = total, "Connected to peer gateway");
                    *slot = Some(connection.clone());
                    return Ok(connection);
                }
                Err(e) if !e.is_transient() => {
                    warn!(attempt, error = %e, "Peer gateway connection is misconfigured");
                    return Err(e);
                }
                Err(e) => {
                    warn!(attempt, max_attempts, error = %e, "Peer gateway connection attempt failed");
                    last_error = Some(e);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff.delay_for(attempt)).await;
                    }
                }
            }
        }

        Err(ConnectionError::Exhausted {
            attempts: max_attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempt made".to_string()),
        })
    }

    /// Drop `connection` if it is still the current one.
    ///
    /// A stale handle (already replaced by a reconnect) is ignored so that one
    /// slow caller cannot tear down a fresh connection.
    pub async fn mark_broken(&self, connection: &Connection) {
        let mut slot = self.current.write().await;
        if slot
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, connection))
        {
            warn!("Peer gateway connection marked broken; will reconnect on next call");
            *slot = None;
        }
    }

    pub async fn state(&self) -> ConnectionState {
        if self.current.read().await.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Number of successful connects since startup.
    pub fn connect_count(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }
}
