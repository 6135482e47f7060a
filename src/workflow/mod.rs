// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Approval workflow for student, grade and prize records.

pub mod service;
pub mod validator;

pub use service::{Approval, DispatchResult, RecordService};
pub use validator::{check_transition, validate_call};
