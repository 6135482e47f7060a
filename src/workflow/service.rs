// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Record service.
//!
//! Typed add / validate / query operations for the three record kinds. Every
//! call runs the same pipeline:
//!
//! ```text
//! validator -> codec::encode -> Gateway::{submit, evaluate} -> codec::decode
//! ```
//!
//! The service keeps no copy of record state. The ledger is the only source
//! of truth, so an ambiguous submit (`commit_unknown`) is resolved by querying
//! again, never by resubmitting.

use tokio::time::Instant;
use tracing::info;

use crate::codec;
use crate::contract::{CallKind, Function};
use crate::ledger::{Gateway, GatewayError, Receipt};
use crate::models::{
    Grade, GradeKey, LedgerCall, NewGrade, NewPrize, NewStudent, Prize, PrizeKey, Record,
    RecordKind, RecordStatus, Student, StudentKey,
};

use super::validator::{check_transition, validate_call};

/// A validate-style request: the status the caller believes the record has,
/// and the status it asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    pub assumed_current: RecordStatus,
    pub requested: RecordStatus,
}

impl Approval {
    /// Decide a record assumed to be `Pending`.
    pub fn new(requested: RecordStatus) -> Self {
        Self {
            assumed_current: RecordStatus::Pending,
            requested,
        }
    }

    pub fn assuming(mut self, current: RecordStatus) -> Self {
        self.assumed_current = current;
        self
    }
}

/// Result of a table-dispatched call.
#[derive(Debug)]
pub enum DispatchResult {
    Submitted(Receipt),
    Queried(Option<Record>),
}

pub struct RecordService {
    gateway: Gateway,
}

impl RecordService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // -------------------------------------------------------------------------
    // Students
    // -------------------------------------------------------------------------

    pub async fn add_student(
        &self,
        student: NewStudent,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        self.submit(LedgerCall::AddStudent(student), RecordStatus::Pending, deadline)
            .await
    }

    pub async fn validate_student(
        &self,
        key: StudentKey,
        approval: Approval,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        let call = LedgerCall::ValidateStudent(key, approval.requested);
        self.submit(call, approval.assumed_current, deadline).await
    }

    /// `None` until the record has been decided.
    pub async fn query_student(
        &self,
        key: StudentKey,
        deadline: Option<Instant>,
    ) -> Result<Option<Student>, GatewayError> {
        let payload = self.evaluate(&LedgerCall::QueryStudent(key), deadline).await?;
        Ok(codec::decode(RecordKind::StudentIdentity, &payload)?)
    }

    // -------------------------------------------------------------------------
    // Grades
    // -------------------------------------------------------------------------

    pub async fn add_grade(
        &self,
        grade: NewGrade,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        self.submit(LedgerCall::AddGrade(grade), RecordStatus::Pending, deadline)
            .await
    }

    pub async fn validate_grade(
        &self,
        key: GradeKey,
        approval: Approval,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        let call = LedgerCall::ValidateGrade(key, approval.requested);
        self.submit(call, approval.assumed_current, deadline).await
    }

    pub async fn query_grade(
        &self,
        key: GradeKey,
        deadline: Option<Instant>,
    ) -> Result<Option<Grade>, GatewayError> {
        let payload = self.evaluate(&LedgerCall::QueryGrade(key), deadline).await?;
        Ok(codec::decode(RecordKind::Grade, &payload)?)
    }

    // -------------------------------------------------------------------------
    // Prizes
    // -------------------------------------------------------------------------

    pub async fn add_price(
        &self,
        prize: NewPrize,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        self.submit(LedgerCall::AddPrice(prize), RecordStatus::Pending, deadline)
            .await
    }

    pub async fn validate_price(
        &self,
        key: PrizeKey,
        approval: Approval,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        let call = LedgerCall::ValidatePrice(key, approval.requested);
        self.submit(call, approval.assumed_current, deadline).await
    }

    pub async fn query_price(
        &self,
        key: PrizeKey,
        deadline: Option<Instant>,
    ) -> Result<Option<Prize>, GatewayError> {
        let payload = self.evaluate(&LedgerCall::QueryPrice(key), deadline).await?;
        Ok(codec::decode(RecordKind::Prize, &payload)?)
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    /// Run any table function from positional string arguments.
    ///
    /// `assumed` is only consulted for validate-style functions.
    pub async fn dispatch(
        &self,
        function: Function,
        args: &[String],
        assumed: RecordStatus,
        deadline: Option<Instant>,
    ) -> Result<DispatchResult, GatewayError> {
        let call = LedgerCall::from_positional(function, args)?;
        match function.kind() {
            CallKind::Submit => self
                .submit(call, assumed, deadline)
                .await
                .map(DispatchResult::Submitted),
            CallKind::Evaluate => {
                let payload = self.evaluate(&call, deadline).await?;
                let record = codec::decode_record(function.record_kind(), &payload)?;
                Ok(DispatchResult::Queried(record))
            }
        }
    }

    async fn submit(
        &self,
        call: LedgerCall,
        assumed: RecordStatus,
        deadline: Option<Instant>,
    ) -> Result<Receipt, GatewayError> {
        validate_call(&call)?;
        let function = call.function();
        let requested = call.requested_status();
        if let Some(requested) = requested {
            check_transition(function.record_kind(), assumed, requested)?;
        }

        let request = codec::encode(self.gateway.chaincode(), &call)?;
        let receipt = self.gateway.submit(&request, deadline).await?.into_receipt()?;

        if let Some(status) = requested {
            info!(
                function = %function,
                status = %status,
                transaction_id = %receipt.transaction_id,
                "Recorded {} decision",
                function.record_kind()
            );
        }
        Ok(receipt)
    }

    async fn evaluate(
        &self,
        call: &LedgerCall,
        deadline: Option<Instant>,
    ) -> Result<Vec<u8>, GatewayError> {
        validate_call(call)?;
        let request = codec::encode(self.gateway.chaincode(), call)?;
        self.gateway.evaluate(&request, deadline).await
    }
}
