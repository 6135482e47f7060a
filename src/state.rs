// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::workflow::RecordService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecordService>,
    /// Overall deadline for one HTTP-originated ledger call.
    pub call_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(service: RecordService) -> Self {
        Self {
            service: Arc::new(service),
            call_timeout: None,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Deadline for a call starting now.
    pub fn deadline(&self) -> Option<Instant> {
        self.call_timeout.map(|timeout| Instant::now() + timeout)
    }
}
