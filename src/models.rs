// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Record Models
//!
//! Domain types for the three record kinds whose authoritative state lives on
//! the ledger: student identity attestations, grade records and prize (award)
//! records.
//!
//! ## Model Categories
//!
//! - **Status**: the approval workflow state shared by every record kind
//! - **Records**: ledger documents as returned by the query functions
//! - **Call arguments**: typed argument sets for each chaincode function
//!
//! The JSON field names of the record documents follow the chaincode's own
//! serialization (`courseId`, `studentId`, ...), not Rust naming.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::Function;
use crate::ledger::ValidationError;

// =============================================================================
// Workflow Status
// =============================================================================

/// Approval state of a record.
///
/// Every record is created `Pending`; a validator moves it to exactly one of
/// `Approved` or `Rejected`, after which it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RecordStatus {
    Pending,
    Approved,
    Rejected,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "Pending",
            RecordStatus::Approved => "Approved",
            RecordStatus::Rejected => "Rejected",
        }
    }

    /// Whether the status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Pending)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RecordStatus::Pending),
            "approved" => Ok(RecordStatus::Approved),
            "rejected" => Ok(RecordStatus::Rejected),
            _ => Err(ValidationError::InvalidStatus(value.to_string())),
        }
    }
}

/// The three record kinds the workflow knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    StudentIdentity,
    Grade,
    Prize,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::StudentIdentity => "student identity",
            RecordKind::Grade => "grade",
            RecordKind::Prize => "prize",
        })
    }
}

// =============================================================================
// Ledger Records
// =============================================================================

/// A student identity attestation as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Student {
    pub school: String,
    pub major: String,
    pub id: u64,
    pub name: String,
    /// Unique id of the identity that created the record.
    #[serde(default)]
    pub owner: String,
    pub status: RecordStatus,
}

/// A grade record as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    #[serde(rename = "course")]
    pub course_name: String,
    #[serde(rename = "courseId")]
    pub course_id: String,
    pub teacher: String,
    pub school: String,
    #[serde(rename = "studentId")]
    pub student_id: u64,
    pub year: u32,
    pub semester: u32,
    pub score: f64,
    #[serde(default)]
    pub owner: String,
    pub status: RecordStatus,
}

/// A prize (award) record as stored on the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Prize {
    pub school: String,
    pub student_id: u64,
    pub prize_name: String,
    pub prize_id: String,
    pub year: u32,
    pub level: String,
    pub institution: String,
    #[serde(default)]
    pub owner: String,
    pub status: RecordStatus,
}

/// Any ledger record, serialized without a discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Student(Student),
    Grade(Grade),
    Prize(Prize),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Student(_) => RecordKind::StudentIdentity,
            Record::Grade(_) => RecordKind::Grade,
            Record::Prize(_) => RecordKind::Prize,
        }
    }

    pub fn status(&self) -> RecordStatus {
        match self {
            Record::Student(s) => s.status,
            Record::Grade(g) => g.status,
            Record::Prize(p) => p.status,
        }
    }

    pub fn set_status(&mut self, status: RecordStatus) {
        match self {
            Record::Student(s) => s.status = status,
            Record::Grade(g) => g.status = status,
            Record::Prize(p) => p.status = status,
        }
    }
}

// =============================================================================
// Call Arguments
// =============================================================================

/// Arguments of `addStudent`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub school: String,
    pub major: String,
    pub student_id: u64,
    pub name: String,
}

/// Natural key of a student identity: school + student id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StudentKey {
    pub school: String,
    pub student_id: u64,
}

/// Arguments of `addGrade`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGrade {
    pub course_name: String,
    pub course_id: String,
    pub teacher: String,
    pub school: String,
    pub student_id: u64,
    pub year: u32,
    pub score: f64,
    pub semester: u32,
}

/// Natural key of a grade: school + student id + course id + year + semester.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GradeKey {
    pub school: String,
    pub student_id: u64,
    pub course_id: String,
    pub year: u32,
    pub semester: u32,
}

/// Arguments of `addPrice`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrize {
    pub school: String,
    pub student_id: u64,
    pub prize_name: String,
    pub prize_id: String,
    pub year: u32,
    pub level: String,
    pub institution: String,
}

/// Natural key of a prize record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrizeKey {
    pub prize_id: String,
}

/// A fully typed chaincode invocation.
///
/// One variant per entry of the function table; the variant fixes both the
/// argument set and whether the call is a Submit or an Evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCall {
    AddStudent(NewStudent),
    ValidateStudent(StudentKey, RecordStatus),
    QueryStudent(StudentKey),
    AddGrade(NewGrade),
    ValidateGrade(GradeKey, RecordStatus),
    QueryGrade(GradeKey),
    AddPrice(NewPrize),
    ValidatePrice(PrizeKey, RecordStatus),
    QueryPrice(PrizeKey),
}

impl LedgerCall {
    pub fn function(&self) -> Function {
        match self {
            LedgerCall::AddStudent(_) => Function::AddStudent,
            LedgerCall::ValidateStudent(..) => Function::ValidateStudent,
            LedgerCall::QueryStudent(_) => Function::QueryStudent,
            LedgerCall::AddGrade(_) => Function::AddGrade,
            LedgerCall::ValidateGrade(..) => Function::ValidateGrade,
            LedgerCall::QueryGrade(_) => Function::QueryGrade,
            LedgerCall::AddPrice(_) => Function::AddPrice,
            LedgerCall::ValidatePrice(..) => Function::ValidatePrice,
            LedgerCall::QueryPrice(_) => Function::QueryPrice,
        }
    }

    /// Requested status for validate-style calls.
    pub fn requested_status(&self) -> Option<RecordStatus> {
        match self {
            LedgerCall::ValidateStudent(_, status)
            | LedgerCall::ValidateGrade(_, status)
            | LedgerCall::ValidatePrice(_, status) => Some(*status),
            _ => None,
        }
    }
}
