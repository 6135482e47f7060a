// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Result Codec
//!
//! Typed calls become ordered byte-string arguments; response payloads become
//! typed records.
//!
//! Numbers are rendered with Rust's own formatting, which never depends on
//! the host locale: integers as plain decimal digits, scores with exactly six
//! fractional digits (`95.500000`).
//!
//! An empty (or all-whitespace) payload means "no record" and decodes to
//! `None`. Anything else that does not parse is a [`DecodeError`].

use serde::de::DeserializeOwned;

use crate::ledger::{DecodeError, TransactionRequest, ValidationError};
use crate::models::{Grade, LedgerCall, Prize, Record, RecordKind, Student};

/// Fixed decimal rendering of a score.
pub fn format_score(score: f64) -> String {
    format!("{score:.6}")
}

/// Positional string arguments in the function table's parameter order.
pub fn positional(call: &LedgerCall) -> Vec<String> {
    match call {
        LedgerCall::AddStudent(s) => vec![
            s.school.clone(),
            s.major.clone(),
            s.student_id.to_string(),
            s.name.clone(),
        ],
        LedgerCall::ValidateStudent(key, status) => vec![
            key.school.clone(),
            key.student_id.to_string(),
            status.to_string(),
        ],
        LedgerCall::QueryStudent(key) => vec![key.school.clone(), key.student_id.to_string()],
        LedgerCall::AddGrade(g) => vec![
            g.course_name.clone(),
            g.course_id.clone(),
            g.teacher.clone(),
            g.school.clone(),
            g.student_id.to_string(),
            g.year.to_string(),
            format_score(g.score),
            g.semester.to_string(),
        ],
        LedgerCall::ValidateGrade(key, status) => vec![
            key.school.clone(),
            key.student_id.to_string(),
            key.course_id.clone(),
            key.year.to_string(),
            key.semester.to_string(),
            status.to_string(),
        ],
        LedgerCall::QueryGrade(key) => vec![
            key.school.clone(),
            key.student_id.to_string(),
            key.course_id.clone(),
            key.year.to_string(),
            key.semester.to_string(),
        ],
        LedgerCall::AddPrice(p) => vec![
            p.school.clone(),
            p.student_id.to_string(),
            p.prize_name.clone(),
            p.prize_id.clone(),
            p.year.to_string(),
            p.level.clone(),
            p.institution.clone(),
        ],
        LedgerCall::ValidatePrice(key, status) => vec![key.prize_id.clone(), status.to_string()],
        LedgerCall::QueryPrice(key) => vec![key.prize_id.clone()],
    }
}

/// Encode a typed call into a transaction request for `chaincode`.
pub fn encode(chaincode: &str, call: &LedgerCall) -> Result<TransactionRequest, ValidationError> {
    let args = positional(call)
        .into_iter()
        .map(String::into_bytes)
        .collect();
    TransactionRequest::new(chaincode, call.function(), args)
}

/// Decode a payload into `R`; empty payloads mean "not found".
pub fn decode<R: DeserializeOwned>(
    kind: RecordKind,
    payload: &[u8],
) -> Result<Option<R>, DecodeError> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(payload)
        .map(Some)
        .map_err(|e| DecodeError {
            kind,
            message: e.to_string(),
        })
}

/// Decode a payload into the record type of `kind`.
pub fn decode_record(kind: RecordKind, payload: &[u8]) -> Result<Option<Record>, DecodeError> {
    Ok(match kind {
        RecordKind::StudentIdentity => decode::<Student>(kind, payload)?.map(Record::Student),
        RecordKind::Grade => decode::<Grade>(kind, payload)?.map(Record::Grade),
        RecordKind::Prize => decode::<Prize>(kind, payload)?.map(Record::Prize),
    })
}
